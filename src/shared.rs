use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::account::repository::AccountRepository;
use crate::auth::{password::CredentialHasher, token::TokenConfig};
use crate::user::repository::UserRepository;

/// Shared application state passed explicitly to every handler.
///
/// Repository handles are the only route to storage; the token and hashing
/// configuration are fixed at startup and never mutated.
#[derive(Clone)]
pub struct AppState {
    pub user_repository: Arc<dyn UserRepository + Send + Sync>,
    pub account_repository: Arc<dyn AccountRepository + Send + Sync>,
    pub token_config: TokenConfig,
    pub hasher: CredentialHasher,
}

impl AppState {
    pub fn new(
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        account_repository: Arc<dyn AccountRepository + Send + Sync>,
        token_config: TokenConfig,
        hasher: CredentialHasher,
    ) -> Self {
        Self {
            user_repository,
            account_repository,
            token_config,
            hasher,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Username already registered")]
    DuplicateUsername,

    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Account number already exists")]
    DuplicateAccountNumber,

    #[error("Account not found")]
    AccountNotFound,

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::DuplicateUsername | AppError::DuplicateAccountNumber => {
                StatusCode::BAD_REQUEST
            }
            AppError::InvalidCredentials
            | AppError::Unauthenticated(_)
            | AppError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            AppError::AccountNotFound => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::DatabaseError(_) | AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Token failure reasons and storage details stay in the logs.
        let error_message = match &self {
            AppError::Unauthenticated(_) | AppError::InvalidToken(_) => {
                "Could not validate credentials".to_string()
            }
            AppError::Validation(msg) => msg.clone(),
            AppError::DatabaseError(msg) => {
                error!(error = %msg, "Database error while handling request");
                "Database error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": error_message
        }));

        match self {
            AppError::Unauthenticated(_) | AppError::InvalidToken(_) => {
                (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
            }
            _ => (status, body).into_response(),
        }
    }
}

#[cfg(test)]
pub mod test_utils {
    use super::*;
    use crate::account::repository::InMemoryAccountRepository;
    use crate::user::repository::InMemoryUserRepository;
    use secrecy::SecretString;

    pub const TEST_SECRET: &str = "test-signing-secret";

    /// Token config with a fixed secret so tests never depend on the environment
    pub fn test_token_config() -> TokenConfig {
        TokenConfig::new(
            SecretString::from(TEST_SECRET.to_string()),
            chrono::Duration::minutes(30),
        )
    }

    /// Minimum-cost hasher; production cost makes handler tests crawl
    pub fn test_hasher() -> CredentialHasher {
        CredentialHasher::with_cost(8, 1, 1).unwrap()
    }

    /// Builder for creating AppState with overrides for testing
    pub struct AppStateBuilder {
        token_config: Option<TokenConfig>,
    }

    impl AppStateBuilder {
        pub fn new() -> Self {
            Self { token_config: None }
        }

        pub fn with_token_config(mut self, token_config: TokenConfig) -> Self {
            self.token_config = Some(token_config);
            self
        }

        pub fn build(self) -> AppState {
            AppState {
                user_repository: Arc::new(InMemoryUserRepository::new()),
                account_repository: Arc::new(InMemoryAccountRepository::new()),
                token_config: self.token_config.unwrap_or_else(test_token_config),
                hasher: test_hasher(),
            }
        }
    }

    impl Default for AppStateBuilder {
        fn default() -> Self {
            Self::new()
        }
    }
}

use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{password::CredentialHasher, token::TokenConfig};
use crate::{
    shared::{AppError, AppState},
    user::{models::UserModel, repository::UserRepository},
};

/// Registration, login and token-to-user resolution
pub struct AuthService {
    repository: Arc<dyn UserRepository + Send + Sync>,
    token_config: TokenConfig,
    hasher: CredentialHasher,
}

impl AuthService {
    pub fn new(
        repository: Arc<dyn UserRepository + Send + Sync>,
        token_config: TokenConfig,
        hasher: CredentialHasher,
    ) -> Self {
        Self {
            repository,
            token_config,
            hasher,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            Arc::clone(&state.user_repository),
            state.token_config.clone(),
            state.hasher.clone(),
        )
    }

    /// Registers a new user with a hashed password
    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &str) -> Result<UserModel, AppError> {
        if username.trim().is_empty() {
            return Err(AppError::Validation("username must not be blank".to_string()));
        }
        if password.is_empty() {
            return Err(AppError::Validation("password must not be blank".to_string()));
        }

        // Best-effort pre-check; the store's uniqueness constraint is the final word.
        if self.repository.get_user_by_username(username).await?.is_some() {
            warn!(username = %username, "Registration rejected: username taken");
            return Err(AppError::DuplicateUsername);
        }

        let hashed_password = self.hasher.hash_blocking(password.to_string()).await?;
        let user = self
            .repository
            .create_user(username, &hashed_password)
            .await?;

        info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Checks credentials and issues an access token for the user
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AppError> {
        let user = match self.repository.get_user_by_username(username).await? {
            Some(user) => user,
            None => {
                warn!(username = %username, "Login failed: unknown username");
                return Err(AppError::InvalidCredentials);
            }
        };

        if !self
            .hasher
            .verify_blocking(password.to_string(), user.hashed_password.clone())
            .await
        {
            warn!(username = %username, "Login failed: wrong password");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.token_config.issue_access_token(&user.username)?;
        info!(username = %user.username, "Access token issued");
        Ok(token)
    }

    /// Maps a bearer token to the stored user it names.
    ///
    /// Both the token and the user's current existence are checked, so a token
    /// for a deleted user stops working before it expires.
    #[instrument(skip(self, token))]
    pub async fn resolve(&self, token: &str) -> Result<UserModel, AppError> {
        let username = self.token_config.verify(token).map_err(|e| {
            warn!(error = %e, "Token verification failed");
            AppError::Unauthenticated(e.to_string())
        })?;

        match self.repository.get_user_by_username(&username).await? {
            Some(user) => Ok(user),
            None => {
                warn!(username = %username, "Token subject does not match a stored user");
                Err(AppError::Unauthenticated("unknown subject".to_string()))
            }
        }
    }
}

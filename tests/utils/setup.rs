use axum::Router;
use chrono::Duration;
use secrecy::SecretString;
use std::sync::Arc;

use bankapi::{
    account::repository::InMemoryAccountRepository, create_router,
    user::repository::InMemoryUserRepository, AppState, CredentialHasher, TokenConfig,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub const TEST_SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub router: Router,
    pub token_config: TokenConfig,
}

pub struct TestAppBuilder {
    users: Vec<(String, String)>,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self { users: vec![] }
    }

    /// Registers a user through the HTTP API once the app is built
    pub fn with_user(mut self, username: &str, password: &str) -> Self {
        self.users.push((username.to_string(), password.to_string()));
        self
    }

    pub async fn build(self) -> TestApp {
        let token_config = TokenConfig::new(
            SecretString::from(TEST_SECRET.to_string()),
            Duration::minutes(30),
        );

        let state = AppState::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryAccountRepository::new()),
            token_config.clone(),
            // Minimum Argon2 cost keeps the suite fast
            CredentialHasher::with_cost(8, 1, 1).unwrap(),
        );

        let app = TestApp {
            router: create_router(state),
            token_config,
        };

        for (username, password) in &self.users {
            let (status, _) = app.register(username, password).await;
            assert!(status.is_success(), "failed to register {}", username);
        }

        app
    }
}

use async_trait::async_trait;
use secrecy::SecretString;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::UserModel;
use crate::db::is_unique_violation;
use crate::shared::AppError;

/// Trait for user repository operations
#[async_trait]
pub trait UserRepository {
    /// Inserts a user; fails with `DuplicateUsername` if the name is taken
    async fn create_user(
        &self,
        username: &str,
        hashed_password: &str,
    ) -> Result<UserModel, AppError>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError>;
}

struct UserTable {
    next_id: i64,
    by_username: HashMap<String, UserModel>,
}

/// In-memory implementation of UserRepository for development and testing
///
/// Data is lost when the application restarts. The uniqueness check and the
/// insert happen under one lock, mirroring the unique index in Postgres.
pub struct InMemoryUserRepository {
    users: Mutex<UserTable>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(UserTable {
                next_id: 1,
                by_username: HashMap::new(),
            }),
        }
    }

    #[cfg(test)]
    pub fn user_count(&self) -> usize {
        self.users
            .lock()
            .map(|table| table.by_username.len())
            .unwrap_or(0)
    }

    /// Stands in for out-of-band account deletion
    #[cfg(test)]
    pub fn remove_user(&self, username: &str) -> Option<UserModel> {
        self.users
            .lock()
            .ok()
            .and_then(|mut table| table.by_username.remove(username))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, hashed_password))]
    async fn create_user(
        &self,
        username: &str,
        hashed_password: &str,
    ) -> Result<UserModel, AppError> {
        debug!(username = %username, "Creating user in memory");

        let mut table = self.users.lock().map_err(|_| AppError::Internal)?;
        if table.by_username.contains_key(username) {
            warn!(username = %username, "Username already exists in memory");
            return Err(AppError::DuplicateUsername);
        }

        let user = UserModel {
            id: table.next_id,
            username: username.to_string(),
            hashed_password: SecretString::from(hashed_password.to_string()),
        };
        table.next_id += 1;
        table.by_username.insert(user.username.clone(), user.clone());

        debug!(user_id = user.id, "User created successfully in memory");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn get_user_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError> {
        debug!(username = %username, "Fetching user from memory");

        let table = self.users.lock().map_err(|_| AppError::Internal)?;
        Ok(table.by_username.get(username).cloned())
    }
}

/// PostgreSQL implementation of user repository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, hashed_password))]
    async fn create_user(
        &self,
        username: &str,
        hashed_password: &str,
    ) -> Result<UserModel, AppError> {
        debug!(username = %username, "Creating user in database");

        let user = sqlx::query_as::<_, UserModel>(
            "INSERT INTO users (username, hashed_password) VALUES ($1, $2) RETURNING id, username, hashed_password",
        )
        .bind(username)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                warn!(username = %username, "Username already exists in database");
                return AppError::DuplicateUsername;
            }
            warn!(error = %e, "Failed to create user in database");
            AppError::DatabaseError(e.to_string())
        })?;

        debug!(user_id = user.id, "User created successfully in database");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn get_user_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError> {
        debug!(username = %username, "Fetching user from database");

        sqlx::query_as::<_, UserModel>(
            "SELECT id, username, hashed_password FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, username = %username, "Failed to fetch user from database");
            AppError::DatabaseError(e.to_string())
        })
    }
}

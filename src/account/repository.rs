use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::AccountModel;
use crate::db::is_unique_violation;
use crate::shared::AppError;

/// Trait for account repository operations
#[async_trait]
pub trait AccountRepository {
    /// Inserts an account; fails with `DuplicateAccountNumber` if the number exists
    async fn create_account(
        &self,
        account_number: &str,
        balance: f64,
        owner_id: i64,
    ) -> Result<AccountModel, AppError>;
    async fn account_number_exists(&self, account_number: &str) -> Result<bool, AppError>;
    /// Looks an account up by number, restricted to the given owner
    async fn get_owned_account(
        &self,
        account_number: &str,
        owner_id: i64,
    ) -> Result<Option<AccountModel>, AppError>;
}

struct AccountTable {
    next_id: i64,
    by_number: HashMap<String, AccountModel>,
}

/// In-memory implementation of AccountRepository for development and testing
pub struct InMemoryAccountRepository {
    accounts: Mutex<AccountTable>,
}

impl Default for InMemoryAccountRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(AccountTable {
                next_id: 1,
                by_number: HashMap::new(),
            }),
        }
    }

    #[cfg(test)]
    pub fn account_count(&self) -> usize {
        self.accounts
            .lock()
            .map(|table| table.by_number.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    #[instrument(skip(self))]
    async fn create_account(
        &self,
        account_number: &str,
        balance: f64,
        owner_id: i64,
    ) -> Result<AccountModel, AppError> {
        debug!("Creating account in memory");

        let mut table = self.accounts.lock().map_err(|_| AppError::Internal)?;
        if table.by_number.contains_key(account_number) {
            warn!(account_number = %account_number, "Account number already exists in memory");
            return Err(AppError::DuplicateAccountNumber);
        }

        let account = AccountModel {
            id: table.next_id,
            account_number: account_number.to_string(),
            balance,
            owner_id,
        };
        table.next_id += 1;
        table
            .by_number
            .insert(account.account_number.clone(), account.clone());

        debug!(account_id = account.id, "Account created successfully in memory");
        Ok(account)
    }

    #[instrument(skip(self))]
    async fn account_number_exists(&self, account_number: &str) -> Result<bool, AppError> {
        let table = self.accounts.lock().map_err(|_| AppError::Internal)?;
        Ok(table.by_number.contains_key(account_number))
    }

    #[instrument(skip(self))]
    async fn get_owned_account(
        &self,
        account_number: &str,
        owner_id: i64,
    ) -> Result<Option<AccountModel>, AppError> {
        debug!("Fetching owned account from memory");

        let table = self.accounts.lock().map_err(|_| AppError::Internal)?;
        Ok(table
            .by_number
            .get(account_number)
            .filter(|account| account.owner_id == owner_id)
            .cloned())
    }
}

/// PostgreSQL implementation of account repository
pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    #[instrument(skip(self))]
    async fn create_account(
        &self,
        account_number: &str,
        balance: f64,
        owner_id: i64,
    ) -> Result<AccountModel, AppError> {
        debug!("Creating account in database");

        let account = sqlx::query_as::<_, AccountModel>(
            "INSERT INTO accounts (account_number, balance, owner_id) VALUES ($1, $2, $3) RETURNING id, account_number, balance, owner_id",
        )
        .bind(account_number)
        .bind(balance)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                warn!(account_number = %account_number, "Account number already exists in database");
                return AppError::DuplicateAccountNumber;
            }
            warn!(error = %e, "Failed to create account in database");
            AppError::DatabaseError(e.to_string())
        })?;

        debug!(account_id = account.id, "Account created successfully in database");
        Ok(account)
    }

    #[instrument(skip(self))]
    async fn account_number_exists(&self, account_number: &str) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM accounts WHERE account_number = $1)",
        )
        .bind(account_number)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to check account number in database");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn get_owned_account(
        &self,
        account_number: &str,
        owner_id: i64,
    ) -> Result<Option<AccountModel>, AppError> {
        debug!("Fetching owned account from database");

        sqlx::query_as::<_, AccountModel>(
            "SELECT id, account_number, balance, owner_id FROM accounts WHERE account_number = $1 AND owner_id = $2",
        )
        .bind(account_number)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch account from database");
            AppError::DatabaseError(e.to_string())
        })
    }
}

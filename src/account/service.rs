use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{models::AccountModel, repository::AccountRepository};
use crate::{shared::AppError, user::models::UserModel};

/// Owner-scoped account creation and lookup
pub struct AccountService {
    repository: Arc<dyn AccountRepository + Send + Sync>,
}

impl AccountService {
    pub fn new(repository: Arc<dyn AccountRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Creates an account owned by `owner`; account numbers are global
    #[instrument(skip(self, owner), fields(owner_id = owner.id))]
    pub async fn create_account(
        &self,
        account_number: &str,
        balance: f64,
        owner: &UserModel,
    ) -> Result<AccountModel, AppError> {
        if account_number.trim().is_empty() {
            return Err(AppError::Validation(
                "account_number must not be blank".to_string(),
            ));
        }

        if self.repository.account_number_exists(account_number).await? {
            warn!(account_number = %account_number, "Account creation rejected: number taken");
            return Err(AppError::DuplicateAccountNumber);
        }

        let account = self
            .repository
            .create_account(account_number, balance, owner.id)
            .await?;

        info!(account_id = account.id, account_number = %account.account_number, "Account created");
        Ok(account)
    }

    /// Returns the account only if `owner` owns it.
    ///
    /// Someone else's account yields the same `AccountNotFound` as a missing
    /// one, so callers learn nothing about accounts they do not own.
    #[instrument(skip(self, owner), fields(owner_id = owner.id))]
    pub async fn get_balance(
        &self,
        account_number: &str,
        owner: &UserModel,
    ) -> Result<AccountModel, AppError> {
        self.repository
            .get_owned_account(account_number, owner.id)
            .await?
            .ok_or_else(|| {
                warn!(account_number = %account_number, "Owned account not found");
                AppError::AccountNotFound
            })
    }
}

use serde::{Deserialize, Serialize};

use super::models::AccountModel;

/// Request payload for creating an account
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub account_number: String,
    pub balance: f64,
}

/// Response for account creation
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct CreateAccountResponse {
    pub msg: String,
    pub account_number: String,
}

impl From<AccountModel> for CreateAccountResponse {
    fn from(account: AccountModel) -> Self {
        Self {
            msg: "Account created".to_string(),
            account_number: account.account_number,
        }
    }
}

/// Request payload for a balance lookup
#[derive(Debug, Deserialize)]
pub struct BalanceRequest {
    pub account_number: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct BalanceResponse {
    pub account_number: String,
    pub balance: f64,
}

impl From<AccountModel> for BalanceResponse {
    fn from(account: AccountModel) -> Self {
        Self {
            account_number: account.account_number,
            balance: account.balance,
        }
    }
}

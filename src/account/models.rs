use sqlx::FromRow;

/// Database model for the accounts table
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct AccountModel {
    pub id: i64,
    pub account_number: String, // Globally unique, not per owner
    pub balance: f64,
    pub owner_id: i64,
}

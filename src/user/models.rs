use secrecy::SecretString;
use sqlx::FromRow;

/// Database model for the users table
#[derive(Debug, Clone, FromRow)]
pub struct UserModel {
    pub id: i64,
    pub username: String,
    #[sqlx(try_from = "String")]
    pub hashed_password: SecretString, // Argon2id PHC string
}

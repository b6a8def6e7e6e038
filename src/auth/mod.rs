// Public API - what other modules can use
pub use handlers::{login, register};
pub use middleware::require_user;
pub use password::CredentialHasher;
pub use service::AuthService;
pub use token::TokenConfig;
pub use types::AccessClaims;

// Internal modules
mod handlers;
mod middleware;
pub mod password;
pub mod service;
pub mod token;
pub mod types;

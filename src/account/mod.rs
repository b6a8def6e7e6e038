// Public API - what other modules can use
pub use handlers::{create_account, get_balance};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
mod types;

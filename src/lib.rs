// Library crate for the bank account backend
// This file exposes the public API for the binary and integration tests

pub mod account;
pub mod auth;
pub mod config;
pub mod db;
pub mod shared;
pub mod user;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

// Re-export commonly used types for easier access in tests
pub use auth::{CredentialHasher, TokenConfig};
pub use config::AppConfig;
pub use shared::{AppError, AppState};

/// Builds the HTTP router; account routes sit behind bearer authentication
pub fn create_router(app_state: AppState) -> Router {
    let protected = Router::new()
        .route("/create-account", post(account::create_account))
        .route("/balance", post(account::get_balance))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth::require_user,
        ));

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/register", post(auth::register))
        .route("/token", post(auth::login))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

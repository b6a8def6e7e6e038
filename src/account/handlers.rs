use axum::{extract::State, Extension, Json};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::AccountService,
    types::{BalanceRequest, BalanceResponse, CreateAccountRequest, CreateAccountResponse},
};
use crate::shared::{AppError, AppState};
use crate::user::models::UserModel;

/// HTTP handler for creating an account owned by the caller
///
/// POST /create-account (bearer auth)
#[instrument(name = "create_account", skip(state, user), fields(user_id = user.id))]
pub async fn create_account(
    State(state): State<AppState>,
    Extension(user): Extension<UserModel>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<Json<CreateAccountResponse>, AppError> {
    let service = AccountService::new(Arc::clone(&state.account_repository));
    let account = service
        .create_account(&request.account_number, request.balance, &user)
        .await?;

    info!(account_number = %account.account_number, "Account created successfully");
    Ok(Json(account.into()))
}

/// HTTP handler for an owner-scoped balance lookup
///
/// POST /balance (bearer auth)
#[instrument(name = "get_balance", skip(state, user), fields(user_id = user.id))]
pub async fn get_balance(
    State(state): State<AppState>,
    Extension(user): Extension<UserModel>,
    Json(request): Json<BalanceRequest>,
) -> Result<Json<BalanceResponse>, AppError> {
    let service = AccountService::new(Arc::clone(&state.account_repository));
    let account = service.get_balance(&request.account_number, &user).await?;

    Ok(Json(account.into()))
}

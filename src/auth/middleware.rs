use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::{debug, instrument, warn};

use super::service::AuthService;
use crate::shared::{AppError, AppState};

/// Bearer authentication middleware - resolves the token to a stored user and
/// adds the `UserModel` to the request.
/// Usage: .layer(middleware::from_fn_with_state(app_state.clone(), auth::require_user))
/// Handlers can then extract Extension(user): Extension<UserModel>.
#[instrument(skip(state, req, next), fields(uri = %req.uri()))]
pub async fn require_user(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let raw_header = req.headers().get(header::AUTHORIZATION).ok_or_else(|| {
        warn!("Missing Authorization header in request");
        AppError::Unauthenticated("missing authorization header".to_string())
    })?;

    let auth_header = raw_header.to_str().map_err(|_| {
        warn!("Authorization header contains non-ASCII bytes");
        AppError::Unauthenticated("unreadable authorization header".to_string())
    })?;

    let token = bearer_token(auth_header).ok_or_else(|| {
        warn!("Invalid Authorization header format (expected Bearer token)");
        AppError::Unauthenticated("invalid authorization header format".to_string())
    })?;

    let user = AuthService::from_state(&state).resolve(token).await?;

    debug!(user_id = user.id, username = %user.username, "Request authenticated");
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Extracts the credential from `Bearer <token>`; the scheme is case-insensitive
fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

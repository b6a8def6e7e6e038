use axum::{extract::State, Form, Json};
use tracing::{info, instrument};

use super::{
    service::AuthService,
    types::{LoginForm, RegisterRequest, TokenResponse, UserResponse},
};
use crate::shared::{AppError, AppState};

/// HTTP handler for registering a user
///
/// POST /register
/// Returns the new user's id and username
#[instrument(name = "register", skip_all, fields(username = %request.username))]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let service = AuthService::from_state(&state);
    let user = service
        .register(&request.username, &request.password)
        .await?;

    Ok(Json(user.into()))
}

/// HTTP handler for password login
///
/// POST /token (application/x-www-form-urlencoded)
/// Returns a bearer access token
#[instrument(name = "login", skip_all, fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, AppError> {
    let service = AuthService::from_state(&state);
    let access_token = service.login(&form.username, &form.password).await?;

    info!("Login succeeded");
    Ok(Json(TokenResponse::bearer(access_token)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::{test_token_config, AppStateBuilder};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::post,
        Router,
    };
    use tower::ServiceExt; // for `oneshot`

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/register", post(register))
            .route("/token", post(login))
            .with_state(state)
    }

    fn register_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/register")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn login_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/token")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_register_handler() {
        let app = app(AppStateBuilder::new().build());

        let response = app
            .oneshot(register_request(r#"{"username": "alice", "password": "pw1"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let user: UserResponse = serde_json::from_value(json_body(response).await).unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.id, 1);
    }

    #[tokio::test]
    async fn test_register_duplicate_is_bad_request() {
        let app = app(AppStateBuilder::new().build());
        let body = r#"{"username": "alice", "password": "pw1"}"#;

        app.clone().oneshot(register_request(body)).await.unwrap();
        let response = app.oneshot(register_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["error"],
            "Username already registered"
        );
    }

    #[tokio::test]
    async fn test_register_missing_field_is_rejected() {
        let app = app(AppStateBuilder::new().build());

        let response = app
            .oneshot(register_request(r#"{"username": "alice"}"#))
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_login_handler() {
        let app = app(AppStateBuilder::new().build());
        app.clone()
            .oneshot(register_request(r#"{"username": "alice", "password": "pw1"}"#))
            .await
            .unwrap();

        let response = app
            .oneshot(login_request("username=alice&password=pw1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let token: TokenResponse = serde_json::from_value(json_body(response).await).unwrap();
        assert_eq!(token.token_type, "bearer");
        assert_eq!(
            test_token_config().verify(&token.access_token).unwrap(),
            "alice"
        );
    }

    #[tokio::test]
    async fn test_login_bad_credentials() {
        let app = app(AppStateBuilder::new().build());
        app.clone()
            .oneshot(register_request(r#"{"username": "alice", "password": "pw1"}"#))
            .await
            .unwrap();

        let response = app
            .oneshot(login_request("username=alice&password=wrong"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            json_body(response).await["error"],
            "Incorrect username or password"
        );
    }
}

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use super::setup::TestApp;

async fn into_parts(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, value)
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn register(&self, username: &str, password: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/register")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({ "username": username, "password": password }).to_string(),
            ))
            .unwrap();
        into_parts(self.send(request).await).await
    }

    pub async fn login(&self, username: &str, password: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/token")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(format!(
                "username={}&password={}",
                username, password
            )))
            .unwrap();
        into_parts(self.send(request).await).await
    }

    /// Logs in and returns the access token, panicking on failure
    pub async fn token_for(&self, username: &str, password: &str) -> String {
        let (status, body) = self.login(username, password).await;
        assert_eq!(status, StatusCode::OK);
        body["access_token"].as_str().unwrap().to_string()
    }

    pub async fn create_account(
        &self,
        token: Option<&str>,
        account_number: &str,
        balance: f64,
    ) -> (StatusCode, Value) {
        let body = json!({ "account_number": account_number, "balance": balance });
        self.authed_post("/create-account", token, body).await
    }

    pub async fn balance(&self, token: Option<&str>, account_number: &str) -> (StatusCode, Value) {
        let body = json!({ "account_number": account_number });
        self.authed_post("/balance", token, body).await
    }

    async fn authed_post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();
        into_parts(self.send(request).await).await
    }
}

#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;
use warden::api::AppState;
use warden::config::{Config, SecurityConfig};
use warden::db::Store;
use warden::state::SharedState;

pub const ADMIN_EMAIL: &str = "admin@admin.com";
pub const ADMIN_PASSWORD: &str = "Password123";

pub fn test_config() -> Config {
    let mut config = Config::default();
    let path = std::env::temp_dir().join(format!("warden-test-{}.db", Uuid::new_v4()));
    config.general.database_url = format!("sqlite:{}", path.display());
    config.auth.jwt_secret = "integration-test-secret".to_string();
    // Keep hashing fast in tests
    config.security = SecurityConfig {
        argon2_memory_cost_kib: 1024,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
    };
    config
}

pub async fn open_store(config: &Config) -> Store {
    Store::from_config(&config.general, &config.security)
        .await
        .expect("Failed to open store")
}

/// Builds the router over a fresh, bootstrapped database.
pub async fn spawn_app() -> (Router, Arc<AppState>) {
    spawn_app_with(test_config()).await
}

pub async fn spawn_app_with(config: Config) -> (Router, Arc<AppState>) {
    let store = open_store(&config).await;
    warden::bootstrap(&store, &config).await;

    let shared = Arc::new(SharedState::with_store(config, store));
    let state = warden::api::create_app_state(shared, None);
    (warden::api::router(state.clone()), state)
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header("Content-Type", mime::APPLICATION_JSON.as_ref())
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };

    (status, json)
}

pub async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["token"].as_str().unwrap().to_string()
}

pub async fn admin_token(app: &Router) -> String {
    login(app, ADMIN_EMAIL, ADMIN_PASSWORD).await
}

pub async fn role_id(app: &Router, token: &str, name: &str) -> i64 {
    let (status, roles) = send(app, "GET", "/api/roles", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    roles
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["name"] == name)
        .and_then(|r| r["id"].as_i64())
        .unwrap()
}

pub fn role_names(person: &Value) -> Vec<String> {
    person["roles"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap().to_string())
        .collect()
}

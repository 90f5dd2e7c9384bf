#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::test;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use taskgate::auth::{LoginResponse, TokenService, MIN_BCRYPT_COST};
use taskgate::state::AppState;
use taskgate::store::MemoryStore;

pub const SECRET: &[u8] = b"integration-test-secret";

/// Application state over a fresh in-memory store.
pub fn test_state() -> AppState {
    let store = Arc::new(MemoryStore::new());
    AppState::new(
        store.clone(),
        store,
        TokenService::new(SECRET, chrono::Duration::hours(24)),
        Duration::from_secs(5),
        MIN_BCRYPT_COST,
    )
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

/// Sends a request and returns the status with the JSON body (`Null` when empty).
pub async fn send(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    req: actix_http::Request,
) -> (StatusCode, Value) {
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let bytes = test::read_body(resp).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            panic!("non-JSON body ({}): {}", e, String::from_utf8_lossy(&bytes))
        })
    };
    (status, body)
}

/// Registers a user and logs in, returning the login response.
pub async fn register_and_login(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    username: &str,
    password: &str,
) -> LoginResponse {
    let credentials = json!({ "username": username, "password": password });

    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(&credentials)
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "register {}: {}", username, body);

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(&credentials)
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK, "login {}: {}", username, body);
    serde_json::from_value(body).expect("login response")
}

pub fn task_body() -> Value {
    json!({
        "title": "t",
        "description": "d",
        "due_date": "2025-01-01T00:00:00Z",
        "status": "open"
    })
}

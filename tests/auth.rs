mod common;

use actix_web::http::{header, StatusCode};
use actix_web::{test, App};
use pretty_assertions::assert_eq;
use serde_json::json;

use common::{bearer, register_and_login, send, task_body, test_state};
use taskgate::auth::TokenService;
use taskgate::models::{RecordId, Role};

#[test_log::test(actix_rt::test)]
async fn test_register_and_login_flow() {
    let state = test_state();
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let alice = register_and_login(&app, "alice", "password123").await;
    assert_eq!(alice.user.username, "alice");
    assert_eq!(alice.user.role, Role::Admin);
    assert!(!alice.token.is_empty());

    let bob = register_and_login(&app, "bob", "password123").await;
    assert_eq!(bob.user.role, Role::User);
    assert_ne!(bob.user.id, alice.user.id);

    // Same username again.
    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(json!({"username": "alice", "password": "other-password"}))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "username already exists");
}

#[actix_rt::test]
async fn test_login_response_shape() {
    let state = test_state();
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
    register_and_login(&app, "alice", "password123").await;

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({"username": "alice", "password": "password123"}))
        .to_request();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["role"], "admin");
    assert_eq!(body["user"]["id"].as_str().map(str::len), Some(24));
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("password_hash").is_none());
}

#[actix_rt::test]
async fn test_bad_credentials_look_the_same() {
    let state = test_state();
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
    register_and_login(&app, "alice", "password123").await;

    let mut bodies = Vec::new();
    for (username, password) in [("alice", "password124"), ("nobody", "password123")] {
        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(json!({"username": username, "password": password}))
            .to_request();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        bodies.push(body);
    }
    assert_eq!(bodies[0], bodies[1]);
    assert_eq!(bodies[0], json!({"error": "invalid credentials"}));
}

#[actix_rt::test]
async fn test_invalid_registration_inputs() {
    let state = test_state();
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let cases = vec![
        (json!({"username": "", "password": "password123"}), "username can not be empty"),
        (json!({"username": "carol", "password": ""}), "password can not be empty"),
        (json!({"username": "", "password": ""}), "username can not be empty"),
        (json!({}), "username can not be empty"),
        (json!({"username": "carol", "password": "1234567"}), "password must be 8+ characters"),
    ];
    for (payload, message) in cases {
        let req = test::TestRequest::post()
            .uri("/register")
            .set_json(&payload)
            .to_request();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", payload);
        assert_eq!(body["error"], message);
    }

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({"username": "carol"}))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_auth_header_handling() {
    let state = test_state();
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
    let alice = register_and_login(&app, "alice", "password123").await;

    let req = test::TestRequest::get().uri("/tasks").to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "authorization header required");

    // Token without the scheme.
    let req = test::TestRequest::get()
        .uri("/tasks")
        .insert_header((header::AUTHORIZATION, alice.token.clone()))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/tasks")
        .insert_header(bearer("not.a.token"))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid token");

    // Signed with another secret.
    let forged = TokenService::new(b"someone-elses-secret", chrono::Duration::hours(24))
        .issue(&alice.user.id, "alice", Role::Admin)
        .unwrap();
    let req = test::TestRequest::post()
        .uri("/tasks")
        .insert_header(bearer(&forged))
        .set_json(task_body())
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/tasks")
        .insert_header((header::AUTHORIZATION, format!("bearer {}", alice.token)))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_rt::test]
async fn test_expired_token_rejected() {
    let state = test_state();
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
    let alice = register_and_login(&app, "alice", "password123").await;

    let stale = TokenService::new(common::SECRET, chrono::Duration::hours(24))
        .issue_at(
            &alice.user.id,
            "alice",
            Role::Admin,
            chrono::Utc::now() - chrono::Duration::hours(24),
        )
        .unwrap();

    let req = test::TestRequest::get()
        .uri("/tasks")
        .insert_header(bearer(&stale))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid token");
}

#[test_log::test(actix_rt::test)]
async fn test_promote_flow() {
    let state = test_state();
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
    let alice = register_and_login(&app, "alice", "password123").await;
    let bob = register_and_login(&app, "bob", "password123").await;

    // A plain user can neither create tasks nor promote.
    let req = test::TestRequest::post()
        .uri("/tasks")
        .insert_header(bearer(&bob.token))
        .set_json(task_body())
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "admin access required");

    let req = test::TestRequest::put()
        .uri(&format!("/promote/{}", bob.user.id))
        .insert_header(bearer(&bob.token))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = test::TestRequest::put()
        .uri("/promote/not-an-id")
        .insert_header(bearer(&alice.token))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid user ID format");

    let req = test::TestRequest::put()
        .uri(&format!("/promote/{}", RecordId::generate()))
        .insert_header(bearer(&alice.token))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "user not found");

    let req = test::TestRequest::put()
        .uri(&format!("/promote/{}", bob.user.id))
        .insert_header(bearer(&alice.token))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "user promoted to admin successfully"}));

    // Bob's old token still carries the old role; a fresh login picks up admin.
    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({"username": "bob", "password": "password123"}))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["user"]["role"], "admin");
    let token = body["token"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/tasks")
        .insert_header(bearer(&token))
        .set_json(task_body())
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[actix_rt::test]
async fn test_health_is_public() {
    let state = test_state();
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

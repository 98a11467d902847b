//! Session binding layer exercised through the full router.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use session_api::{create_router, AppState, SharedSessionManager};
use session_core::SessionConfig;
use session_infrastructure::build_manager;
use std::sync::Arc;
use tower::ServiceExt;

fn app_with(config: SessionConfig) -> (Router, SharedSessionManager) {
    let manager: SharedSessionManager = Arc::new(build_manager(config, None).unwrap());
    (create_router(AppState::new(manager.clone())), manager)
}

fn app() -> (Router, SharedSessionManager) {
    app_with(SessionConfig::default())
}

fn request(method: &str, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = cookie {
        builder = builder.header(header::COOKIE, format!("session_id={}", id));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn set_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .map(|v| v.to_str().unwrap().to_string())
}

fn cookie_id(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.trim().strip_prefix("session_id="))
        .unwrap()
        .to_string()
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn first_request_receives_session_cookie() {
    let (app, manager) = app();

    let response = app
        .oneshot(request("GET", "/api/session/status", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = set_cookie(&response).expect("session cookie");
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("Max-Age=86400"));
    assert!(cookie.contains("SameSite=Lax"));

    let id = cookie_id(&cookie);
    assert!(manager.session_exists(&id).await.unwrap());

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["session_exists"], json!(true));
    assert_eq!(body["data"]["session_id"], json!(id));
}

#[tokio::test]
async fn replayed_cookie_sees_data_from_earlier_request() {
    let (app, _manager) = app();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/session/data",
            None,
            Some(json!({"key": "user", "value": "alice"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let id = cookie_id(&set_cookie(&response).unwrap());

    let response = app
        .oneshot(request("GET", "/api/session/data/user", Some(&id), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(cookie_id(&set_cookie(&response).unwrap()), id);
    let body = body_json(response).await;
    assert_eq!(body["data"]["value"], json!("alice"));
}

#[tokio::test]
async fn unknown_cookie_is_replaced() {
    let (app, manager) = app();

    let response = app
        .oneshot(request("GET", "/api/session", Some("not-a-session"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let id = cookie_id(&set_cookie(&response).unwrap());
    assert_ne!(id, "not-a-session");
    assert!(manager.session_exists(&id).await.unwrap());
}

#[tokio::test]
async fn disabled_sessions_issue_no_cookie() {
    let (app, _manager) = app_with(SessionConfig {
        enabled: false,
        ..SessionConfig::default()
    });

    let response = app
        .oneshot(request("GET", "/api/session", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(set_cookie(&response).is_none());
}

#[tokio::test]
async fn unavailable_backend_serves_request_without_session() {
    let (app, manager) = app();
    manager.close().await.unwrap();

    let response = app
        .oneshot(request("GET", "/api/session/status", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookie(&response).is_none());
    let body = body_json(response).await;
    assert_eq!(body["data"]["session_exists"], json!(false));
}

#[tokio::test]
async fn malformed_body_gets_json_error_envelope() {
    let (app, _manager) = app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/session/data")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"key\": \"user\""))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"]["code"], json!("BAD_REQUEST"));
}

#[tokio::test]
async fn destroy_clears_cookie_and_store() {
    let (app, manager) = app();
    let id = manager.create_session().await.unwrap().id().to_string();

    let response = app
        .oneshot(request("DELETE", "/api/session", Some(&id), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = set_cookie(&response).unwrap();
    assert!(cookie.starts_with("session_id=;"));
    assert!(cookie.contains("Max-Age=0"));
    assert!(!manager.session_exists(&id).await.unwrap());
}

#[tokio::test]
async fn empty_key_is_bad_request() {
    let (app, _manager) = app();

    let response = app
        .oneshot(request(
            "POST",
            "/api/session/data",
            None,
            Some(json!({"key": "", "value": 1})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"]["code"], json!("BAD_REQUEST"));
}

#[tokio::test]
async fn missing_key_is_not_found() {
    let (app, _manager) = app();

    let response = app
        .oneshot(request("GET", "/api/session/data/absent", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn removed_key_is_gone_on_next_request() {
    let (app, manager) = app();
    let id = manager.create_session().await.unwrap().id().to_string();
    manager
        .set_session_data(&id, "theme", json!("dark"))
        .await
        .unwrap();

    let response = app
        .oneshot(request("DELETE", "/api/session/data/theme", Some(&id), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["removed"], json!(true));
    assert!(manager.get_session_data(&id, "theme").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn refresh_extends_stored_expiry() {
    let (app, manager) = app();
    let session = manager.create_session().await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    let response = app
        .oneshot(request("POST", "/api/session/refresh", Some(session.id()), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let stored = manager.get_session(session.id()).await.unwrap();
    assert!(stored.expires_at() > session.expires_at());
    assert_eq!(stored.created_at(), session.created_at());
}

#[tokio::test]
async fn health_is_outside_the_session_layer() {
    let (app, _manager) = app();

    let response = app
        .oneshot(request("GET", "/health", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookie(&response).is_none());
    let body = body_json(response).await;
    assert_eq!(body["data"]["session_store"], json!("memory"));
}

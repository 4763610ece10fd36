//! Router-level tests over in-memory storage and scripted inference services

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use common::{wheat_input, Behaviour, FailingReports, FakeServices};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use crop_advisory_backend::repository::MemoryUserRepository;
use crop_advisory_backend::{config::Config, create_app, AppState};

fn test_config() -> Config {
    let mut config = Config::defaults().unwrap();
    config.auth.bcrypt_cost = 4;
    config.services.geocoding_url = "http://127.0.0.1:9".to_string();
    config.services.expert_chat_url = "http://127.0.0.1:9".to_string();
    config
}

fn app_with(services: FakeServices) -> Router {
    let state = AppState::in_memory(test_config()).with_advisory(Arc::new(services));
    create_app(state)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn register(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({"name": "Gurpreet Singh", "email": email, "password": "secret1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["access_token"].as_str().unwrap().to_string()
}

async fn onboard(app: &Router, token: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/onboarding",
        Some(token),
        Some(serde_json::to_value(wheat_input()).unwrap()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["report_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_is_public() {
    let app = app_with(FakeServices::healthy());
    let (status, body) = send(&app, Method::GET, "/api/v1/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "connected");
}

#[tokio::test]
async fn test_register_login_me() {
    let app = app_with(FakeServices::healthy());
    let token = register(&app, "Farmer@Example.com").await;

    let (status, me) = send(&app, Method::GET, "/api/v1/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "farmer@example.com");
    assert_eq!(me["location"]["city"], "Unknown");
    assert!(me.get("password_hash").is_none());

    let (status, login) = send(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({"email": "farmer@example.com", "password": "secret1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["token_type"], "Bearer");

    let (status, err) = send(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({"email": "farmer@example.com", "password": "wrong-one"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(err["error"]["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = app_with(FakeServices::healthy());
    register(&app, "a@b.co").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({"name": "Other", "email": "A@B.co", "password": "secret1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_protected_routes_need_a_token() {
    let app = app_with(FakeServices::healthy());

    let (status, body) = send(&app, Method::GET, "/api/v1/reports", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let (status, body) = send(&app, Method::GET, "/api/v1/reports", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_onboarding_to_report_views() {
    let app = app_with(FakeServices::healthy());
    let token = register(&app, "farmer@example.com").await;
    let report_id = onboard(&app, &token).await;

    let (status, list) = send(&app, Method::GET, "/api/v1/reports", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["reports"].as_array().unwrap().len(), 1);

    let uri = format!("/api/v1/reports/{}", report_id);
    let (status, report) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["status"], "ready");
    assert_eq!(report["title"], "Wheat • Ludhiana");
    assert_eq!(report["raw"]["predict_input"]["sw_date"], "2024-11-15");

    let (status, summary) = send(
        &app,
        Method::GET,
        &format!("{}/summary", uri),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["season_risk"], json!({"score": 13, "level": "low"}));
    assert_eq!(summary["stage_risks"][0]["risk_score"], 19);
    assert_eq!(summary["stage_risks"][0]["contributors"][0]["factor"], "Rainfall");
}

#[tokio::test]
async fn test_reports_are_private() {
    let app = app_with(FakeServices::healthy());
    let owner = register(&app, "owner@example.com").await;
    let stranger = register(&app, "stranger@example.com").await;
    let report_id = onboard(&app, &owner).await;
    let uri = format!("/api/v1/reports/{}", report_id);

    let (status, _) = send(&app, Method::GET, &uri, Some(&stranger), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("{}/status", uri),
        Some(&stranger),
        Some(json!({"status": "error"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = send(&app, Method::GET, "/api/v1/reports", Some(&stranger), None).await;
    assert!(list["reports"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_status_update_and_filters() {
    let app = app_with(FakeServices::healthy());
    let token = register(&app, "farmer@example.com").await;
    let report_id = onboard(&app, &token).await;
    let status_uri = format!("/api/v1/reports/{}/status", report_id);

    let (status, body) = send(
        &app,
        Method::PUT,
        &status_uri,
        Some(&token),
        Some(json!({"status": "archived"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "status");

    let (status, body) = send(
        &app,
        Method::PUT,
        &status_uri,
        Some(&token),
        Some(json!({"status": "error"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "error");

    let (_, ready) = send(
        &app,
        Method::GET,
        "/api/v1/reports?status=ready",
        Some(&token),
        None,
    )
    .await;
    assert!(ready["reports"].as_array().unwrap().is_empty());

    let (_, wheat) = send(
        &app,
        Method::GET,
        "/api/v1/reports?crop=WHEAT&status=error",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(wheat["reports"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_onboarding_validation_error() {
    let app = app_with(FakeServices::healthy());
    let token = register(&app, "farmer@example.com").await;
    let mut input = serde_json::to_value(wheat_input()).unwrap();
    input["district"] = json!("  ");

    let (status, body) = send(&app, Method::POST, "/api/v1/onboarding", Some(&token), Some(input)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["field"], "district");
    assert_eq!(body["error"]["stage"], "validation");
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    let app = app_with(FakeServices {
        predict: Behaviour::Status(500),
        ..FakeServices::healthy()
    });
    let token = register(&app, "farmer@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/onboarding",
        Some(&token),
        Some(serde_json::to_value(wheat_input()).unwrap()),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "PREDICT_ERROR");
    assert_eq!(body["error"]["stage"], "predict");
    assert_eq!(body["error"]["message"], "Predict API failed (500) - boom");

    let (_, list) = send(&app, Method::GET, "/api/v1/reports", Some(&token), None).await;
    assert!(list["reports"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_storage_failure_is_internal_error() {
    let state = AppState::new(
        test_config(),
        Arc::new(FailingReports),
        Arc::new(MemoryUserRepository::new()),
    )
    .with_advisory(Arc::new(FakeServices::healthy()));
    let app = create_app(state);
    let token = register(&app, "farmer@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/onboarding",
        Some(&token),
        Some(serde_json::to_value(wheat_input()).unwrap()),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "PERSIST_ERROR");
    assert_eq!(body["error"]["stage"], "persist");
}

#[tokio::test]
async fn test_background_job_reports_progress_to_owner_only() {
    let app = app_with(FakeServices::healthy());
    let owner = register(&app, "owner@example.com").await;
    let stranger = register(&app, "stranger@example.com").await;

    let (status, started) = send(
        &app,
        Method::POST,
        "/api/v1/onboarding/jobs",
        Some(&owner),
        Some(serde_json::to_value(wheat_input()).unwrap()),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let job_uri = format!(
        "/api/v1/onboarding/jobs/{}",
        started["job_id"].as_str().unwrap()
    );

    let mut snapshot = Value::Null;
    for _ in 0..100 {
        let (status, body) = send(&app, Method::GET, &job_uri, Some(&owner), None).await;
        assert_eq!(status, StatusCode::OK);
        if body["state"] != "running" {
            snapshot = body;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(snapshot["state"], "done");
    assert_eq!(snapshot["percent"], 100);
    assert_eq!(snapshot["message"], "Finalizing report...");
    let report_id = snapshot["report_id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/v1/reports/{}", report_id),
        Some(&owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::GET, &job_uri, Some(&stranger), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_chat_rejects_blank_message() {
    let app = app_with(FakeServices::healthy());
    let token = register(&app, "farmer@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/chat",
        Some(&token),
        Some(json!({"message": "   "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "message");
}

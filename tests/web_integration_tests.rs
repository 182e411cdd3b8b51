//! Router-level tests of the HTTP contract.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{unique_email, TestApp, TestAppBuilder};

async fn send(app: &TestApp, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.router().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn onboard(app: &TestApp, email: &str, crop: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/onboarding/setup",
        Some(json!({
            "user_email": email,
            "crop": crop,
            "sowing_date": "2025-06-01",
            "state": "Punjab",
            "district": "Ludhiana",
            "village": "Dehlon",
            "preferred_language": "English"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body
}

#[tokio::test]
async fn test_health_and_welcome() {
    let app = TestAppBuilder::new().build();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "memory");

    let (status, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Welcome to CropMind API");
}

#[tokio::test]
async fn test_onboarding_then_status() {
    let app = TestAppBuilder::new().build();
    let email = unique_email("web");
    let onboarded = onboard(&app, &email, "rice").await;
    assert_eq!(onboarded["message"], "Onboarding successful");
    assert_eq!(onboarded["current_stage"], "Nursery");

    let (status, body) = send(&app, Method::GET, &format!("/lifecycle/status?email={email}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["crop"], "Rice");
    assert_eq!(body["sowing_date"], "2025-06-01");
    assert_eq!(body["day_count"], 30);
    assert_eq!(body["timeline"][0]["status"], "current");
    assert_eq!(body["timeline"][0]["date"], "In Progress");
    assert_eq!(body["timeline"][1]["status"], "upcoming");
    assert!(body["ai_summary"].is_null());
    assert_eq!(body["history"], json!([]));
}

#[tokio::test]
async fn test_toggle_and_advance_endpoints() {
    let app = TestAppBuilder::new().build();
    let email = unique_email("web");
    onboard(&app, &email, "wheat").await;

    let (status, task) = send(
        &app,
        Method::POST,
        &format!("/lifecycle/tasks/1/toggle?email={email}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["id"], 1);
    assert_eq!(task["is_completed"], true);

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/lifecycle/tasks/404/toggle?email={email}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "invalid_transition");

    let (status, view) = send(&app, Method::POST, &format!("/lifecycle/advance?email={email}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["current_stage"], "Sowing");
    assert_eq!(view["timeline"][0]["status"], "completed");

    let (status, alerts) = send(&app, Method::GET, &format!("/alerts/?email={email}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(alerts[0]["type"], "Stage");
    assert_eq!(alerts[0]["severity"], "Info");
}

#[tokio::test]
async fn test_error_taxonomy_over_http() {
    let app = TestAppBuilder::new().build();

    let (status, body) = send(&app, Method::GET, "/lifecycle/status?email=ghost@farm.test", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, _) = send(&app, Method::GET, "/lifecycle/status", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        "/onboarding/setup",
        Some(json!({
            "user_email": "new@farm.test",
            "crop": "",
            "sowing_date": "2025-06-01",
            "state": "Punjab",
            "district": "Ludhiana",
            "village": "Dehlon"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, body) = send(&app, Method::GET, "/dashboard/summary?email=ghost@farm.test", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{body}");

    let (status, alerts) = send(&app, Method::GET, "/alerts/?email=ghost@farm.test", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(alerts, json!([]));
}

#[tokio::test]
async fn test_header_identity() {
    let app = TestAppBuilder::new().build();
    let email = unique_email("header");
    onboard(&app, &email, "cotton").await;

    let request = Request::builder()
        .uri("/dashboard/user-info")
        .header("x-farmer-email", &email)
        .body(Body::empty())
        .unwrap();
    let response = app.router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let info: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(info["name"], "Farmer");
    assert_eq!(info["crop_type"], "cotton");
    assert_eq!(info["has_farm_profile"], true);
}

#[tokio::test]
async fn test_profile_read_and_update() {
    let app = TestAppBuilder::new().build();
    let email = unique_email("profile");
    onboard(&app, &email, "wheat").await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/user/profile",
        Some(json!({
            "email": email,
            "name": "Gurpreet",
            "village": "Sahnewal",
            "preferred_language": "Punjabi"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Profile updated successfully");

    let (status, profile) = send(&app, Method::GET, &format!("/user/profile?email={email}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["name"], "Gurpreet");
    assert_eq!(profile["village"], "Sahnewal");
    assert_eq!(profile["crop"], "wheat");
    assert_eq!(profile["sowing_date"], "2025-06-01");
    assert_eq!(profile["preferred_language"], "Punjabi");
}

#[tokio::test]
async fn test_chat_falls_back_with_200() {
    let app = TestAppBuilder::new().build();
    let email = unique_email("chat");
    onboard(&app, &email, "wheat").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/chat/query",
        Some(json!({"user_email": email, "question": "When should I irrigate?"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stage"], "Planning");
    assert_eq!(body["actionable_steps"], json!([]));
    assert!(body["answer"].as_str().unwrap().len() > 0);

    let (status, _) = send(
        &app,
        Method::POST,
        "/chat/query",
        Some(json!({"user_email": "ghost@farm.test", "question": "Hello?"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_complete_and_disenroll() {
    let app = TestAppBuilder::new().build();
    let email = unique_email("done");
    onboard(&app, &email, "wheat").await;

    let (status, _) = send(&app, Method::POST, &format!("/lifecycle/complete?email={email}"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, Method::DELETE, &format!("/lifecycle?email={email}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Lifecycle archived");

    let (status, _) = send(&app, Method::GET, &format!("/lifecycle/status?email={email}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

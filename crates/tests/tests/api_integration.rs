use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use bosun_api::build_app;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn chat(app: &Router, message: &str) -> Value {
    let request = Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "message": message }).to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn health_reports_metrics() {
    let app = build_app().await.expect("app should build");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["status"], "ok");
    assert!(parsed["metrics"]["commands_total"].is_u64());
}

#[tokio::test]
async fn chat_rejects_non_post_with_400() {
    let app = build_app().await.expect("app should build");

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/chat")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_body_still_answers_200() {
    let app = build_app().await.expect("app should build");

    let request = Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["status"], "error");
}

#[tokio::test]
async fn remember_and_recall_share_state_across_requests() {
    let app = build_app().await.expect("app should build");

    let saved = chat(&app, "remember color is blue").await;
    assert_eq!(saved["status"], "success");
    assert_eq!(saved["response"], "Saved: color equals blue");

    let recalled = chat(&app, "what is color").await;
    assert_eq!(recalled["status"], "success");
    assert_eq!(recalled["response"], "color is blue.");
}

#[tokio::test]
async fn arithmetic_command_computes_locally() {
    let app = build_app().await.expect("app should build");

    let reply = chat(&app, "what is 5 plus 3").await;
    assert_eq!(reply["response"], "The result is 8.");
}

#[tokio::test]
async fn task_commands_round_trip() {
    let app = build_app().await.expect("app should build");

    let added = chat(&app, "add task water the plants").await;
    assert_eq!(added["response"], "Added task: water the plants");

    let listing = chat(&app, "list tasks").await;
    assert!(listing["response"]
        .as_str()
        .unwrap()
        .contains("water the plants"));
}

#[tokio::test]
async fn standby_sentinel_maps_to_fixed_phrase() {
    let app = build_app().await.expect("app should build");

    let reply = chat(&app, "sleep").await;
    assert_eq!(reply["status"], "success");
    assert_eq!(reply["response"], "Going to stand-by.");
}

#[tokio::test]
async fn help_lists_capabilities() {
    let app = build_app().await.expect("app should build");

    let reply = chat(&app, "help").await;
    assert!(reply["response"].as_str().unwrap().contains("weather"));
}

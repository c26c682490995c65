//! Integration tests for the HTTP API
//!
//! Each test drives the router directly with `tower::ServiceExt::oneshot`,
//! no sockets involved.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use iosrv::api::create_api_routes;
use iosrv::device::state::BaudRate;
use iosrv::device::IoSimulator;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> (Arc<IoSimulator>, Router) {
    let simulator = Arc::new(IoSimulator::new(1, BaudRate::default()).unwrap());
    let router = create_api_routes(Arc::clone(&simulator));
    (simulator, router)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (_, router) = app();

    let response = router.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["service"], "iosrv");
    assert_eq!(body["data"]["status"], "healthy");
}

#[tokio::test]
async fn test_get_status_snapshot() {
    let (_, router) = app();

    let response = router.oneshot(get("/api/status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["address"], 1);
    assert_eq!(body["data"]["baud"], 9600);
    let all_low = json!([false, false, false, false, false, false, false, false]);
    assert_eq!(body["data"]["digital_outputs"], all_low);
    assert_eq!(body["data"]["control_modes"][0], "normal");
}

#[tokio::test]
async fn test_set_inputs() {
    let (simulator, router) = app();

    let response = router
        .oneshot(post_json(
            "/api/inputs",
            json!({ "states": [true, false, false, false, false, false, false, true] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["digital_inputs"][0], true);
    assert_eq!(body["data"]["digital_inputs"][7], true);

    assert_eq!(simulator.recent_events(10).len(), 1);
}

#[tokio::test]
async fn test_set_inputs_wrong_arity() {
    let (_, router) = app();

    let response = router
        .oneshot(post_json("/api/inputs", json!({ "states": [true, false] })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], 400);
}

#[tokio::test]
async fn test_inject_frame() {
    let (simulator, router) = app();

    let response = router
        .oneshot(post_json(
            "/api/modbus",
            json!({ "frame": "01 05 00 00 ff 00 8c 3a" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["response"], "01050000ff008c3a");
    assert_eq!(body["data"]["status"]["digital_outputs"][0], true);
    assert!(simulator.snapshot().await.digital_outputs[0]);
}

#[tokio::test]
async fn test_inject_frame_silent_drop_has_no_response() {
    let (_, router) = app();

    // Addressed to station 9: the device stays silent
    let response = router
        .oneshot(post_json("/api/modbus", json!({ "frame": "09050000ff00" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["data"].get("response").is_none());
}

#[tokio::test]
async fn test_inject_frame_bad_hex() {
    let (_, router) = app();

    let response = router
        .oneshot(post_json("/api/modbus", json!({ "frame": "zz00" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_history_limit() {
    let (simulator, router) = app();

    for _ in 0..5 {
        simulator.simulate_inputs([false; 8]).await;
    }

    let response = router
        .oneshot(get("/api/history?limit=3"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
    assert_eq!(body["data"][0]["kind"], "inputs");
}

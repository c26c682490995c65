//! API routes configuration

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::api::handlers;
use crate::device::IoSimulator;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub simulator: Arc<IoSimulator>,
    pub start_time: DateTime<Utc>,
}

/// OpenAPI documentation aggregate
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health_check,
        handlers::get_status,
        handlers::set_inputs,
        handlers::inject_frame,
        handlers::get_history,
    ),
    components(
        schemas(
            crate::api::dto::HealthStatus,
            crate::api::dto::SetInputsRequest,
            crate::api::dto::FrameRequest,
            crate::api::dto::FrameResponse,
            crate::api::types::ErrorResponse,
            crate::api::types::ErrorInfo,
            crate::device::DeviceSnapshot,
            crate::device::ControlMode,
            crate::device::Event,
        )
    ),
    tags(
        (name = "iosrv", description = "Modbus RTU I/O device simulator API")
    )
)]
pub struct IoSrvApiDoc;

/// Create all API routes
pub fn create_api_routes(simulator: Arc<IoSimulator>) -> Router {
    let state = AppState {
        simulator,
        start_time: Utc::now(),
    };

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/status", get(handlers::get_status))
        .route("/api/inputs", post(handlers::set_inputs))
        .route("/api/modbus", post(handlers::inject_frame))
        .route("/api/history", get(handlers::get_history))
        .route("/openapi.json", get(openapi_spec))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(IoSrvApiDoc::openapi())
}

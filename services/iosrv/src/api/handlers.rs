//! HTTP API handlers
//!
//! Thin wrappers around the simulator core: decode the request, call into
//! `IoSimulator`, wrap the result in the standard response envelope.

use axum::extract::{Query, State};
use axum::response::Json;
use chrono::Utc;

use crate::api::dto::{
    FrameRequest, FrameResponse, HealthStatus, HistoryQuery, SetInputsRequest,
};
use crate::api::routes::AppState;
use crate::api::types::{AppError, SuccessResponse};
use crate::device::{DeviceSnapshot, Event};
use crate::protocol::constants::CHANNEL_COUNT;
use crate::utils::hex::{bytes_to_hex, hex_to_bytes};

/// Default number of history entries returned
const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthStatus)
    ),
    tag = "iosrv"
)]
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<SuccessResponse<HealthStatus>>, AppError> {
    let uptime_duration = Utc::now() - state.start_time;
    let uptime_seconds = uptime_duration.num_seconds().max(0).try_into().unwrap_or(0);

    let health = HealthStatus {
        status: "healthy".to_string(),
        service: "iosrv".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds,
        timestamp: Utc::now(),
    };

    Ok(Json(SuccessResponse::new(health)))
}

/// Get the current device state
#[utoipa::path(
    get,
    path = "/api/status",
    responses(
        (status = 200, description = "Device state retrieved", body = DeviceSnapshot)
    ),
    tag = "iosrv"
)]
pub async fn get_status(
    State(state): State<AppState>,
) -> Result<Json<SuccessResponse<DeviceSnapshot>>, AppError> {
    let snapshot = state.simulator.snapshot().await;
    Ok(Json(SuccessResponse::new(snapshot)))
}

/// Apply an input vector through the per-channel control modes
#[utoipa::path(
    post,
    path = "/api/inputs",
    request_body = SetInputsRequest,
    responses(
        (status = 200, description = "Inputs applied", body = DeviceSnapshot),
        (status = 400, description = "Wrong number of input states")
    ),
    tag = "iosrv"
)]
pub async fn set_inputs(
    State(state): State<AppState>,
    Json(request): Json<SetInputsRequest>,
) -> Result<Json<SuccessResponse<DeviceSnapshot>>, AppError> {
    let states: [bool; CHANNEL_COUNT] = request.states.try_into().map_err(|_| {
        AppError::bad_request(format!("Expected exactly {CHANNEL_COUNT} input states"))
    })?;

    state.simulator.simulate_inputs(states).await;
    let snapshot = state.simulator.snapshot().await;
    Ok(Json(SuccessResponse::new(snapshot)))
}

/// Inject a raw Modbus RTU frame into the device
#[utoipa::path(
    post,
    path = "/api/modbus",
    request_body = FrameRequest,
    responses(
        (status = 200, description = "Frame processed", body = FrameResponse),
        (status = 400, description = "Frame is not valid hex")
    ),
    tag = "iosrv"
)]
pub async fn inject_frame(
    State(state): State<AppState>,
    Json(request): Json<FrameRequest>,
) -> Result<Json<SuccessResponse<FrameResponse>>, AppError> {
    let frame = hex_to_bytes(&request.frame)
        .map_err(|e| AppError::bad_request("Invalid frame").with_details(e.to_string()))?;

    let response = state.simulator.process_frame(&frame).await;
    let status = state.simulator.snapshot().await;

    Ok(Json(SuccessResponse::new(FrameResponse {
        response: response.as_deref().map(bytes_to_hex),
        status,
    })))
}

/// Get the most recent history entries
#[utoipa::path(
    get,
    path = "/api/history",
    params(
        ("limit" = Option<usize>, Query, description = "Maximum number of entries")
    ),
    responses(
        (status = 200, description = "History retrieved", body = [Event])
    ),
    tag = "iosrv"
)]
pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<SuccessResponse<Vec<Event>>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let events = state.simulator.recent_events(limit);
    Ok(Json(SuccessResponse::new(events)))
}

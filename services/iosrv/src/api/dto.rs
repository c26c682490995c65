//! Request and response models for the HTTP API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::device::DeviceSnapshot;

/// Service health report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    /// Overall health status
    pub status: String,
    /// Service name
    pub service: String,
    /// Service version
    pub version: String,
    /// Uptime in seconds
    pub uptime_seconds: u64,
    /// Timestamp of this check
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: DateTime<Utc>,
}

/// Input vector to apply through the control modes
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SetInputsRequest {
    /// One level per channel, exactly 8 entries
    pub states: Vec<bool>,
}

/// Raw Modbus RTU frame, hex encoded
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FrameRequest {
    /// Request frame, e.g. `"01 05 00 00 ff 00 8c 3a"`
    pub frame: String,
}

/// Result of injecting a frame into the device
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FrameResponse {
    /// Hex-encoded response frame; absent where the device stays silent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    /// Device state after processing the frame
    pub status: DeviceSnapshot,
}

/// Query parameters for the history endpoint
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct HistoryQuery {
    /// Maximum number of entries to return, default 100
    pub limit: Option<usize>,
}

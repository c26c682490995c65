//! Error handling for the I/O Simulator Service
//!
//! This module provides the service-wide error type and conversions from the
//! lower-level error types the service touches (I/O, JSON, configuration).

use thiserror::Error;

/// I/O Simulator Service Error Type
#[derive(Error, Debug, Clone)]
pub enum IoSrvError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Input/Output operation errors
    #[error("IO error: {0}")]
    IoError(String),

    /// Modbus protocol errors
    #[error("Protocol error: {0}")]
    ProtocolError(String),

    /// Connection establishment and maintenance errors
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Data serialization and deserialization errors
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Invalid parameter errors
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// General internal errors
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Result type alias for the I/O Simulator Service
pub type Result<T> = std::result::Result<T, IoSrvError>;

// Conversion from std::io::Error
impl From<std::io::Error> for IoSrvError {
    fn from(err: std::io::Error) -> Self {
        IoSrvError::IoError(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for IoSrvError {
    fn from(err: serde_json::Error) -> Self {
        IoSrvError::SerializationError(format!("JSON error: {err}"))
    }
}

// Conversion from figment::Error
impl From<figment::Error> for IoSrvError {
    fn from(err: figment::Error) -> Self {
        IoSrvError::ConfigError(format!("Configuration error: {err}"))
    }
}

// Helper methods for creating errors
impl IoSrvError {
    pub fn config(msg: impl Into<String>) -> Self {
        IoSrvError::ConfigError(msg.into())
    }

    pub fn protocol(msg: impl Into<String>) -> Self {
        IoSrvError::ProtocolError(msg.into())
    }

    pub fn connection(msg: impl Into<String>) -> Self {
        IoSrvError::ConnectionError(msg.into())
    }

    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        IoSrvError::InvalidParameter(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        IoSrvError::InternalError(msg.into())
    }
}

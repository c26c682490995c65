//! Shared utilities: error types, logging setup, hex helpers

pub mod error;
pub mod hex;
pub mod logger;

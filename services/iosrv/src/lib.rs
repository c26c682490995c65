//! I/O Simulator Service (`iosrv`)
//!
//! Simulates a Waveshare-style Modbus RTU 8-channel digital I/O device:
//! frame parsing, CRC checking and the full register map of the real device,
//! including per-channel control modes (normal, linkage, toggle, edge
//! trigger) and flash cycles.
//!
//! The device core is exposed two ways:
//!
//! - a Modbus TCP bridge ([`bridge`]) that speaks raw RTU frames over TCP,
//!   so standard Modbus tooling can poll and command the simulated device
//! - an HTTP API ([`api`]) for injecting input vectors and frames and for
//!   inspecting device state and the command history
//!
//! ```no_run
//! use std::sync::Arc;
//! use iosrv::device::{BaudRate, IoSimulator};
//!
//! # async fn demo() -> iosrv::Result<()> {
//! let simulator = Arc::new(IoSimulator::new(1, BaudRate::default())?);
//!
//! // Switch output channel 0 on
//! let response = simulator
//!     .process_frame(&[0x01, 0x05, 0x00, 0x00, 0xFF, 0x00, 0x8C, 0x3A])
//!     .await;
//! assert!(response.is_some());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod bootstrap;
pub mod bridge;
pub mod config;
pub mod device;
pub mod protocol;
pub mod utils;

pub use config::AppConfig;
pub use device::IoSimulator;
pub use utils::error::{IoSrvError, Result};

/// Wait for a shutdown signal (Ctrl-C or SIGTERM)
pub async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
                return;
            },
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => tracing::info!("Received Ctrl-C"),
            _ = sigterm.recv() => tracing::info!("Received SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Received Ctrl-C");
    }
}

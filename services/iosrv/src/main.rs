//! I/O Simulator Service (`iosrv`)
//!
//! Simulates a Modbus RTU 8-channel digital I/O device behind a TCP bridge
//! and an HTTP control API.

use std::path::Path;
use std::sync::Arc;

use axum::serve;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use iosrv::bootstrap::{self, Args};
use iosrv::bridge::run_bridge;
use iosrv::device::IoSimulator;
use iosrv::{api, wait_for_shutdown, AppConfig, IoSrvError};

#[tokio::main]
async fn main() -> iosrv::Result<()> {
    let args = Args::parse();

    let config = AppConfig::load(args.config.as_deref().map(Path::new))?;
    bootstrap::initialize_logging(&args, &config)?;

    // Validation mode: validate and exit
    if args.validate {
        config.validate()?;
        info!("Validation completed successfully");
        return Ok(());
    }

    let simulator = Arc::new(IoSimulator::new(
        config.device.address,
        config.device_baud()?,
    )?);

    let shutdown_token = CancellationToken::new();

    // Modbus TCP bridge
    let bridge_handle = if config.bridge.enabled {
        let bridge_address = format!("{}:{}", config.bridge.host, config.bridge.port);
        let bridge_simulator = Arc::clone(&simulator);
        let bridge_token = shutdown_token.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = run_bridge(bridge_simulator, &bridge_address, bridge_token).await {
                error!("Modbus TCP bridge error: {}", e);
            }
        }))
    } else {
        info!("Modbus TCP bridge disabled");
        None
    };

    // HTTP API server
    let bind_address = bootstrap::determine_bind_address(&args, &config);
    let app = api::create_api_routes(Arc::clone(&simulator));

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .map_err(|e| {
            IoSrvError::ConnectionError(format!("Failed to bind to {bind_address}: {e}"))
        })?;

    info!("API server listening on http://{}", bind_address);
    info!("Health check: http://{}/health", bind_address);

    let server_token = shutdown_token.clone();
    let server_handle = tokio::spawn(async move {
        let shutdown = async move { server_token.cancelled().await };
        if let Err(e) = serve(listener, app).with_graceful_shutdown(shutdown).await {
            error!("Server error: {}", e);
        }
    });

    wait_for_shutdown().await;

    info!("Shutting down");
    shutdown_token.cancel();
    simulator.shutdown();

    if let Some(handle) = bridge_handle {
        let _ = handle.await;
    }
    let _ = server_handle.await;

    info!("Shutdown complete");
    Ok(())
}

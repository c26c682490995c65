//! Modbus TCP bridge
//!
//! Accepts raw TCP connections and shuttles byte frames to the simulator, so
//! standard Modbus tooling can talk to the simulated device without a serial
//! line. One task per connection; frames the device would ignore on a real
//! bus produce no bytes on the socket either.

use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::device::IoSimulator;
use crate::protocol::constants::MAX_FRAME_LEN;
use crate::utils::error::{IoSrvError, Result};
use crate::utils::hex::format_hex_spaced;

/// Run the bridge accept loop until the token is cancelled
pub async fn run_bridge(
    simulator: Arc<IoSimulator>,
    bind_address: &str,
    shutdown: CancellationToken,
) -> Result<()> {
    let listener = TcpListener::bind(bind_address).await.map_err(|e| {
        IoSrvError::ConnectionError(format!("Failed to bind bridge to {bind_address}: {e}"))
    })?;
    serve_bridge(simulator, listener, shutdown).await
}

/// Accept loop over an already-bound listener
pub async fn serve_bridge(
    simulator: Arc<IoSimulator>,
    listener: TcpListener,
    shutdown: CancellationToken,
) -> Result<()> {
    if let Ok(address) = listener.local_addr() {
        info!("Modbus TCP bridge listening on {}", address);
    }

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("Modbus TCP bridge shutting down");
                return Ok(());
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        debug!("Bridge connection from {}", peer);
                        let simulator = Arc::clone(&simulator);
                        let token = shutdown.child_token();
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(simulator, stream, token).await {
                                debug!("Bridge connection from {} closed: {}", peer, e);
                            }
                        });
                    },
                    Err(e) => warn!("Bridge accept failed: {}", e),
                }
            }
        }
    }
}

async fn handle_connection(
    simulator: Arc<IoSimulator>,
    mut stream: TcpStream,
    shutdown: CancellationToken,
) -> Result<()> {
    let mut buffer = [0u8; MAX_FRAME_LEN];

    loop {
        let read = tokio::select! {
            _ = shutdown.cancelled() => return Ok(()),
            read = stream.read(&mut buffer) => read?,
        };
        if read == 0 {
            return Ok(());
        }

        let request = &buffer[..read];
        debug!("Bridge rx: {}", format_hex_spaced(request));

        if let Some(response) = simulator.process_frame(request).await {
            debug!("Bridge tx: {}", format_hex_spaced(&response));
            stream.write_all(&response).await?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::state::BaudRate;
    use crate::protocol::frame::append_crc;

    #[tokio::test]
    async fn test_bridge_round_trip() {
        let simulator = Arc::new(IoSimulator::new(1, BaudRate::default()).unwrap());
        let token = CancellationToken::new();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        let bridge_sim = Arc::clone(&simulator);
        let bridge_token = token.clone();
        tokio::spawn(async move {
            serve_bridge(bridge_sim, listener, bridge_token).await.unwrap();
        });

        let mut client = TcpStream::connect(address).await.unwrap();

        // Switch channel 0 on, expect the request echoed back
        let request = append_crc(vec![0x01, 0x05, 0x00, 0x00, 0xFF, 0x00]);
        client.write_all(&request).await.unwrap();

        let mut response = vec![0u8; request.len()];
        client.read_exact(&mut response).await.unwrap();
        assert_eq!(response, request);

        assert!(simulator.snapshot().await.digital_outputs[0]);
        token.cancel();
    }
}

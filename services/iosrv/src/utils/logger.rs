//! Logger initialization for the I/O Simulator Service
//!
//! Sets up the global `tracing` subscriber with either console output or a
//! daily-rotated log file, controlled by configuration.

use std::path::Path;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

use crate::utils::error::Result;

/// Initialize the logger with file or console output
///
/// File logs are rotated daily. The `RUST_LOG` environment variable takes
/// precedence over the configured level when set.
///
/// # Arguments
///
/// * `log_dir` - The directory where log files will be stored
/// * `service_name` - The name of the service, used as part of the log file name
/// * `level` - The log level (trace, debug, info, warn, error)
/// * `console` - Whether to log to console instead of a file
pub fn init_logger(
    log_dir: impl AsRef<Path>,
    service_name: &str,
    level: &str,
    console: bool,
) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{service_name}={level}")));

    if console {
        fmt().with_env_filter(env_filter).init();

        tracing::info!(
            "Logger initialized for service: {} (console mode)",
            service_name
        );
    } else {
        std::fs::create_dir_all(&log_dir)?;

        let file_appender = RollingFileAppender::new(
            Rotation::DAILY,
            log_dir,
            format!("{}.log", service_name),
        );

        fmt()
            .with_env_filter(env_filter)
            .with_writer(file_appender)
            .with_ansi(false)
            .init();

        tracing::info!(
            "Logger initialized for service: {} (file mode)",
            service_name
        );
    }

    Ok(())
}

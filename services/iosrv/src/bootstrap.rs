//! Service startup: command line arguments and logging initialization

use clap::Parser;

use crate::config::AppConfig;
use crate::utils::error::Result;
use crate::utils::logger::init_logger;

/// Command line arguments
#[derive(Parser, Debug, Clone)]
#[command(name = "iosrv", about = "Modbus RTU 8-channel I/O device simulator")]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, env = "IOSRV_CONFIG")]
    pub config: Option<String>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// API bind address override, e.g. 0.0.0.0:8090
    #[arg(short, long)]
    pub bind_address: Option<String>,

    /// Validate the configuration and exit
    #[arg(long)]
    pub validate: bool,
}

/// Initialize logging from configuration, honoring the CLI override
pub fn initialize_logging(args: &Args, config: &AppConfig) -> Result<()> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(&config.logging.level);

    init_logger(
        &config.logging.dir,
        &config.service.name,
        level,
        config.logging.console,
    )
}

/// Resolve the API bind address, CLI override first
pub fn determine_bind_address(args: &Args, config: &AppConfig) -> String {
    args.bind_address
        .clone()
        .unwrap_or_else(|| format!("{}:{}", config.api.host, config.api.port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determine_bind_address() {
        let config = AppConfig::default();
        let mut args = Args {
            config: None,
            log_level: None,
            bind_address: None,
            validate: false,
        };

        assert_eq!(determine_bind_address(&args, &config), "0.0.0.0:8090");

        args.bind_address = Some("127.0.0.1:9000".to_string());
        assert_eq!(determine_bind_address(&args, &config), "127.0.0.1:9000");
    }
}

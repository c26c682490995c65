//! Service configuration
//!
//! Layered configuration: a TOML file merged with `IOSRV_`-prefixed
//! environment variables. Every field has a default, so the service starts
//! with no configuration file at all.

use std::path::Path;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::device::state::BaudRate;
use crate::protocol::constants::BAUD_RATES;
use crate::utils::error::{IoSrvError, Result};

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "iosrv.toml";

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Service identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_service_name")]
    pub name: String,
}

/// HTTP API server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
}

/// Modbus TCP bridge settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default = "default_bridge_enabled")]
    pub enabled: bool,
    #[serde(default = "default_api_host")]
    pub host: String,
    #[serde(default = "default_bridge_port")]
    pub port: u16,
}

/// Simulated device settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Station address, 1..=255
    #[serde(default = "default_device_address")]
    pub address: u8,
    /// Serial baud rate, must be one of the device's supported rates
    #[serde(default = "default_device_baud")]
    pub baud: u32,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_dir")]
    pub dir: String,
    /// Log to console instead of a rotated file
    #[serde(default = "default_log_console")]
    pub console: bool,
}

fn default_service_name() -> String {
    "iosrv".to_string()
}

fn default_api_host() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    8090
}

fn default_bridge_enabled() -> bool {
    true
}

fn default_bridge_port() -> u16 {
    5020
}

fn default_device_address() -> u8 {
    1
}

fn default_device_baud() -> u32 {
    9_600
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_log_console() -> bool {
    true
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            enabled: default_bridge_enabled(),
            host: default_api_host(),
            port: default_bridge_port(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            address: default_device_address(),
            baud: default_device_baud(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: default_log_dir(),
            console: default_log_console(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file merged with `IOSRV_` environment
    /// variables (e.g. `IOSRV_DEVICE__ADDRESS=5`)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));

        let config: AppConfig = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("IOSRV_").split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// Check invariants figment cannot express
    pub fn validate(&self) -> Result<()> {
        if self.device.address == 0 {
            return Err(IoSrvError::ConfigError(
                "device.address must be in 1..=255".to_string(),
            ));
        }
        if !BAUD_RATES.contains(&self.device.baud) {
            return Err(IoSrvError::ConfigError(format!(
                "device.baud must be one of {:?}, got {}",
                BAUD_RATES, self.device.baud
            )));
        }
        Ok(())
    }

    /// The configured baud rate as a validated device value
    pub fn device_baud(&self) -> Result<BaudRate> {
        BaudRate::from_value(self.device.baud)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.service.name, "iosrv");
        assert_eq!(config.api.port, 8090);
        assert_eq!(config.bridge.port, 5020);
        assert_eq!(config.device.address, 1);
        assert_eq!(config.device.baud, 9_600);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.device.address = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.device.baud = 12_345;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = AppConfig::load(Some(Path::new("does-not-exist.toml"))).unwrap();
        assert_eq!(config.device.address, 1);
    }
}

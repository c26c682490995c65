//! Device register map and runtime state
//!
//! `DeviceState` holds everything a frame can read or write: channel banks,
//! the station address, baud rate selection, per-channel control modes and
//! flash intervals. It is plain data; the simulator wraps it in a single
//! `RwLock` so each request is one atomic read-modify-write.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::protocol::constants::{BAUD_RATES, CHANNEL_COUNT};
use crate::utils::error::{IoSrvError, Result};

/// Per-channel control mode, register range 0x1000..=0x1007
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    /// Output follows explicit write commands only
    Normal,
    /// Output mirrors the corresponding input
    Linkage,
    /// Output flips on each rising edge of the input
    Toggle,
    /// Output flips on every input edge
    EdgeTrigger,
}

impl ControlMode {
    /// Decode a control mode register value, `None` for values above 3
    pub fn from_register(value: u16) -> Option<Self> {
        match value {
            0 => Some(ControlMode::Normal),
            1 => Some(ControlMode::Linkage),
            2 => Some(ControlMode::Toggle),
            3 => Some(ControlMode::EdgeTrigger),
            _ => None,
        }
    }

    /// Register encoding of this mode
    pub fn as_register(self) -> u16 {
        match self {
            ControlMode::Normal => 0,
            ControlMode::Linkage => 1,
            ControlMode::Toggle => 2,
            ControlMode::EdgeTrigger => 3,
        }
    }
}

/// Serial baud rate, selected by table index through register 0x2000
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaudRate(u32);

impl BaudRate {
    /// Look up a baud rate by register table index
    pub fn from_index(index: u8) -> Option<Self> {
        BAUD_RATES.get(index as usize).map(|&rate| BaudRate(rate))
    }

    /// Look up a baud rate by its numeric value
    pub fn from_value(value: u32) -> Result<Self> {
        if BAUD_RATES.contains(&value) {
            Ok(BaudRate(value))
        } else {
            Err(IoSrvError::InvalidParameter(format!(
                "Unsupported baud rate: {value}"
            )))
        }
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl Default for BaudRate {
    fn default() -> Self {
        BaudRate(9_600)
    }
}

/// Full register map of the simulated device
#[derive(Debug, Clone)]
pub struct DeviceState {
    /// Station address, 1..=255
    pub address: u8,
    /// Serial baud rate selection
    pub baud: BaudRate,
    /// Digital input channels (discrete inputs)
    pub digital_inputs: [bool; CHANNEL_COUNT],
    /// Digital output channels (coils)
    pub digital_outputs: [bool; CHANNEL_COUNT],
    /// Analog input channels, storage only
    pub analog_inputs: [i32; CHANNEL_COUNT],
    /// Analog output channels, storage only
    pub analog_outputs: [i32; CHANNEL_COUNT],
    /// Per-channel control modes
    pub control_modes: [ControlMode; CHANNEL_COUNT],
    /// Flash ON intervals in 100 ms units, 0 = disabled
    pub flash_on_intervals: [u16; CHANNEL_COUNT],
    /// Flash OFF intervals in 100 ms units, 0 = disabled
    pub flash_off_intervals: [u16; CHANNEL_COUNT],
    /// Flash cycle phase flags, true while the ON phase is active
    pub flash_phases: [bool; CHANNEL_COUNT],
}

impl DeviceState {
    /// Create a device state with the given station address and baud rate
    pub fn new(address: u8, baud: BaudRate) -> Result<Self> {
        if address == 0 {
            return Err(IoSrvError::InvalidParameter(
                "Device address must be in 1..=255".to_string(),
            ));
        }

        Ok(Self {
            address,
            baud,
            digital_inputs: [false; CHANNEL_COUNT],
            digital_outputs: [false; CHANNEL_COUNT],
            analog_inputs: [0; CHANNEL_COUNT],
            analog_outputs: [0; CHANNEL_COUNT],
            control_modes: [ControlMode::Normal; CHANNEL_COUNT],
            flash_on_intervals: [0; CHANNEL_COUNT],
            flash_off_intervals: [0; CHANNEL_COUNT],
            flash_phases: [false; CHANNEL_COUNT],
        })
    }

    /// Snapshot of the externally visible state, for the HTTP API
    pub fn snapshot(&self) -> DeviceSnapshot {
        DeviceSnapshot {
            address: self.address,
            baud: self.baud.as_u32(),
            digital_inputs: self.digital_inputs.to_vec(),
            digital_outputs: self.digital_outputs.to_vec(),
            analog_inputs: self.analog_inputs.to_vec(),
            analog_outputs: self.analog_outputs.to_vec(),
            control_modes: self.control_modes.to_vec(),
            flash_on_intervals: self.flash_on_intervals.to_vec(),
            flash_off_intervals: self.flash_off_intervals.to_vec(),
        }
    }
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            address: 1,
            baud: BaudRate::default(),
            digital_inputs: [false; CHANNEL_COUNT],
            digital_outputs: [false; CHANNEL_COUNT],
            analog_inputs: [0; CHANNEL_COUNT],
            analog_outputs: [0; CHANNEL_COUNT],
            control_modes: [ControlMode::Normal; CHANNEL_COUNT],
            flash_on_intervals: [0; CHANNEL_COUNT],
            flash_off_intervals: [0; CHANNEL_COUNT],
            flash_phases: [false; CHANNEL_COUNT],
        }
    }
}

/// Externally visible device state
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeviceSnapshot {
    /// Station address
    pub address: u8,
    /// Serial baud rate
    pub baud: u32,
    /// Digital input channel levels
    pub digital_inputs: Vec<bool>,
    /// Digital output channel levels
    pub digital_outputs: Vec<bool>,
    /// Analog input channel values
    pub analog_inputs: Vec<i32>,
    /// Analog output channel values
    pub analog_outputs: Vec<i32>,
    /// Per-channel control modes
    pub control_modes: Vec<ControlMode>,
    /// Flash ON intervals in 100 ms units
    pub flash_on_intervals: Vec<u16>,
    /// Flash OFF intervals in 100 ms units
    pub flash_off_intervals: Vec<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_mode_register_encoding() {
        assert_eq!(ControlMode::from_register(0), Some(ControlMode::Normal));
        assert_eq!(ControlMode::from_register(1), Some(ControlMode::Linkage));
        assert_eq!(ControlMode::from_register(2), Some(ControlMode::Toggle));
        assert_eq!(
            ControlMode::from_register(3),
            Some(ControlMode::EdgeTrigger)
        );
        assert_eq!(ControlMode::from_register(4), None);
        assert_eq!(ControlMode::from_register(0xFFFF), None);

        for value in 0..4 {
            let mode = ControlMode::from_register(value).unwrap();
            assert_eq!(mode.as_register(), value);
        }
    }

    #[test]
    fn test_baud_rate_table() {
        assert_eq!(BaudRate::from_index(0).unwrap().as_u32(), 4_800);
        assert_eq!(BaudRate::from_index(1).unwrap().as_u32(), 9_600);
        assert_eq!(BaudRate::from_index(7).unwrap().as_u32(), 256_000);
        assert!(BaudRate::from_index(8).is_none());

        assert!(BaudRate::from_value(115_200).is_ok());
        assert!(BaudRate::from_value(12_345).is_err());
        assert_eq!(BaudRate::default().as_u32(), 9_600);
    }

    #[test]
    fn test_device_state_defaults() {
        let state = DeviceState::new(1, BaudRate::default()).unwrap();
        assert_eq!(state.address, 1);
        assert!(state.digital_outputs.iter().all(|v| !v));
        assert!(state
            .control_modes
            .iter()
            .all(|m| *m == ControlMode::Normal));
    }

    #[test]
    fn test_device_state_rejects_address_zero() {
        assert!(DeviceState::new(0, BaudRate::default()).is_err());
    }
}

//! Modbus RTU protocol constants for the 8-channel I/O device
//!
//! Register layout and command values follow the Waveshare Modbus RTU IO
//! 8CH register map.

/// Number of digital I/O channels on the device
pub const CHANNEL_COUNT: usize = 8;

/// Minimum parseable frame: address + function code + CRC
pub const MIN_FRAME_LEN: usize = 4;

/// Largest frame accepted from the wire
pub const MAX_FRAME_LEN: usize = 256;

/// Broadcast station address, always accepted
pub const BROADCAST_ADDRESS: u8 = 0x00;

// Function codes
pub const FC_READ_COILS: u8 = 0x01;
pub const FC_READ_DISCRETE_INPUTS: u8 = 0x02;
pub const FC_READ_HOLDING_REGISTERS: u8 = 0x03;
pub const FC_WRITE_SINGLE_COIL: u8 = 0x05;
pub const FC_WRITE_SINGLE_REGISTER: u8 = 0x06;
pub const FC_WRITE_MULTIPLE_COILS: u8 = 0x0F;
pub const FC_WRITE_MULTIPLE_REGISTERS: u8 = 0x10;

// Exception codes
pub const EXC_ILLEGAL_FUNCTION: u8 = 0x01;
pub const EXC_ILLEGAL_DATA_ADDRESS: u8 = 0x02;

// Write-single-coil command values
pub const COIL_VALUE_ON: u16 = 0xFF00;
pub const COIL_VALUE_OFF: u16 = 0x0000;
pub const COIL_VALUE_TOGGLE: u16 = 0x5500;

// Write-single-coil special addresses
/// Operates on all eight output channels at once
pub const COIL_ADDR_ALL_OUTPUTS: u16 = 0x00FF;
/// Base address of the per-channel flash-ON interval commands
pub const COIL_ADDR_FLASH_ON_BASE: u16 = 0x0200;
/// Base address of the per-channel flash-OFF interval commands
pub const COIL_ADDR_FLASH_OFF_BASE: u16 = 0x0400;

// Holding register map
/// Base address of the per-channel control mode registers
pub const REG_CONTROL_MODE_BASE: u16 = 0x1000;
/// Serial baud rate register (low byte is an index into [`BAUD_RATES`])
pub const REG_BAUD_RATE: u16 = 0x2000;
/// Station address register
pub const REG_DEVICE_ADDRESS: u16 = 0x4000;
/// Read-only software version register
pub const REG_SOFTWARE_VERSION: u16 = 0x8000;

/// Reported software version, 0x00C8 = V2.00
pub const SOFTWARE_VERSION: u16 = 0x00C8;

/// Baud rates selectable through register 0x2000, by table index
pub const BAUD_RATES: [u32; 8] = [
    4_800, 9_600, 19_200, 38_400, 57_600, 115_200, 128_000, 256_000,
];

/// Flash interval unit in milliseconds
pub const FLASH_TICK_MS: u64 = 100;

/// Maximum register count for a single read request
pub const MAX_READ_REGISTERS: u16 = 125;

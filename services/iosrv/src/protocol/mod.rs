//! Modbus RTU protocol support: frame codec and register map constants

pub mod constants;
pub mod frame;

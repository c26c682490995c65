//! Simulated device core: register map, event history, flash scheduling and
//! the RTU command dispatcher

pub mod events;
pub mod flash;
pub mod simulator;
pub mod state;

pub use events::{Event, EventLog};
pub use simulator::IoSimulator;
pub use state::{BaudRate, ControlMode, DeviceSnapshot, DeviceState};

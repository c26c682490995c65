//! 8-channel Modbus RTU I/O device simulator
//!
//! `IoSimulator` is the device core: it owns the register map, the event
//! history and the flash scheduler, and processes raw RTU frames exactly like
//! the physical device would. Bus semantics apply: frames that are too short
//! or addressed to another station are dropped without a response, a bad CRC
//! or unknown function code yields an exception frame.
//!
//! The register map lives behind a single `RwLock`; every frame is handled
//! under one write guard, so a read-modify-write command such as toggle can
//! never interleave with another frame or a flash tick.

use std::sync::{Arc, Mutex};

use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::events::{Event, EventLog};
use super::flash::FlashScheduler;
use super::state::{BaudRate, ControlMode, DeviceSnapshot, DeviceState};
use crate::protocol::constants::{
    BROADCAST_ADDRESS, CHANNEL_COUNT, COIL_ADDR_ALL_OUTPUTS, COIL_ADDR_FLASH_OFF_BASE,
    COIL_ADDR_FLASH_ON_BASE, COIL_VALUE_OFF, COIL_VALUE_ON, COIL_VALUE_TOGGLE,
    EXC_ILLEGAL_DATA_ADDRESS, EXC_ILLEGAL_FUNCTION, FC_READ_COILS, FC_READ_DISCRETE_INPUTS,
    FC_READ_HOLDING_REGISTERS, FC_WRITE_MULTIPLE_COILS, FC_WRITE_MULTIPLE_REGISTERS,
    FC_WRITE_SINGLE_COIL, FC_WRITE_SINGLE_REGISTER, MAX_FRAME_LEN, MAX_READ_REGISTERS,
    MIN_FRAME_LEN, REG_BAUD_RATE, REG_CONTROL_MODE_BASE, REG_DEVICE_ADDRESS,
    REG_SOFTWARE_VERSION, SOFTWARE_VERSION,
};
use crate::protocol::frame;
use crate::utils::error::Result;
use crate::utils::hex::format_hex_spaced;

/// Simulated 8-channel digital I/O device
pub struct IoSimulator {
    state: Arc<RwLock<DeviceState>>,
    events: Mutex<EventLog>,
    flash: FlashScheduler,
}

impl IoSimulator {
    /// Create a simulator with the given station address and baud rate
    pub fn new(address: u8, baud: BaudRate) -> Result<Self> {
        let state = Arc::new(RwLock::new(DeviceState::new(address, baud)?));
        let flash = FlashScheduler::new(Arc::clone(&state));

        info!(
            "I/O simulator initialized: address={}, baud={}",
            address,
            baud.as_u32()
        );

        Ok(Self {
            state,
            events: Mutex::new(EventLog::default()),
            flash,
        })
    }

    /// Snapshot of the externally visible device state
    pub async fn snapshot(&self) -> DeviceSnapshot {
        self.state.read().await.snapshot()
    }

    /// The most recent `limit` history entries, oldest first
    pub fn recent_events(&self, limit: usize) -> Vec<Event> {
        self.lock_events().recent(limit)
    }

    /// Cancel all background activity, used on shutdown
    pub fn shutdown(&self) {
        self.flash.stop_all();
    }

    /// Process one Modbus RTU request frame
    ///
    /// Returns the response frame, or `None` where a real device would stay
    /// silent: frames shorter than address+function+CRC, or frames addressed
    /// to neither this station nor the broadcast address.
    pub async fn process_frame(&self, request: &[u8]) -> Option<Vec<u8>> {
        if request.len() < MIN_FRAME_LEN || request.len() > MAX_FRAME_LEN {
            debug!("Dropping malformed frame ({} bytes)", request.len());
            return None;
        }

        let mut state = self.state.write().await;

        let station = request[0];
        if station != state.address && station != BROADCAST_ADDRESS {
            debug!(
                "Ignoring frame for station {} (own address {})",
                station, state.address
            );
            return None;
        }

        let function = request[1];
        if !frame::verify(request) {
            warn!("CRC mismatch on frame: {}", format_hex_spaced(request));
            return Some(frame::build_exception(
                station,
                function,
                EXC_ILLEGAL_FUNCTION,
            ));
        }

        let pdu = &request[2..request.len() - 2];
        match function {
            FC_READ_COILS => read_bits(station, function, pdu, &state.digital_outputs),
            FC_READ_DISCRETE_INPUTS => read_bits(station, function, pdu, &state.digital_inputs),
            FC_READ_HOLDING_REGISTERS => read_holding_registers(station, pdu, &state),
            FC_WRITE_SINGLE_COIL => self.write_single_coil(&mut state, station, pdu, request),
            FC_WRITE_SINGLE_REGISTER => self.write_single_register(&mut state, pdu, request),
            FC_WRITE_MULTIPLE_COILS => self.write_multiple_coils(&mut state, station, pdu),
            FC_WRITE_MULTIPLE_REGISTERS => self.write_multiple_registers(&mut state, station, pdu),
            _ => {
                debug!("Unsupported function code 0x{:02X}", function);
                Some(frame::build_exception(
                    station,
                    function,
                    EXC_ILLEGAL_FUNCTION,
                ))
            },
        }
    }

    /// Apply a full input vector and run the per-channel control modes
    ///
    /// Normal leaves the output alone, Linkage mirrors the input, Toggle
    /// flips the output on a rising edge, EdgeTrigger flips it on any edge.
    pub async fn simulate_inputs(&self, inputs: [bool; CHANNEL_COUNT]) {
        let mut state = self.state.write().await;

        for channel in 0..CHANNEL_COUNT {
            let previous = state.digital_inputs[channel];
            let current = inputs[channel];
            state.digital_inputs[channel] = current;

            match state.control_modes[channel] {
                ControlMode::Normal => {},
                ControlMode::Linkage => {
                    state.digital_outputs[channel] = current;
                },
                ControlMode::Toggle => {
                    if current && !previous {
                        state.digital_outputs[channel] = !state.digital_outputs[channel];
                    }
                },
                ControlMode::EdgeTrigger => {
                    if current != previous {
                        state.digital_outputs[channel] = !state.digital_outputs[channel];
                    }
                },
            }
        }

        self.log_event("inputs", json!({ "states": inputs }));
    }

    /// Write single coil (0x05): channel writes plus the device's special
    /// command addresses. A successful write echoes the request verbatim.
    fn write_single_coil(
        &self,
        state: &mut DeviceState,
        station: u8,
        pdu: &[u8],
        request: &[u8],
    ) -> Option<Vec<u8>> {
        if pdu.len() < 4 {
            return None;
        }

        let address = u16::from_be_bytes([pdu[0], pdu[1]]);
        let value = u16::from_be_bytes([pdu[2], pdu[3]]);

        if address == COIL_ADDR_ALL_OUTPUTS {
            match value {
                COIL_VALUE_ON => state.digital_outputs = [true; CHANNEL_COUNT],
                COIL_VALUE_OFF => state.digital_outputs = [false; CHANNEL_COUNT],
                COIL_VALUE_TOGGLE => {
                    for output in state.digital_outputs.iter_mut() {
                        *output = !*output;
                    }
                },
                // Unknown command values leave the outputs untouched
                _ => {},
            }
            self.log_event(
                "all_outputs",
                json!({ "command": value, "states": state.digital_outputs }),
            );
        } else if (COIL_ADDR_FLASH_ON_BASE..COIL_ADDR_FLASH_ON_BASE + CHANNEL_COUNT as u16)
            .contains(&address)
        {
            let channel = (address - COIL_ADDR_FLASH_ON_BASE) as usize;
            state.flash_on_intervals[channel] = value;
            // New cycle begins with the ON phase
            state.flash_phases[channel] = false;
            self.flash.start(channel);
            self.log_event(
                format!("flash_on_{channel}"),
                json!({ "interval": value }),
            );
        } else if (COIL_ADDR_FLASH_OFF_BASE..COIL_ADDR_FLASH_OFF_BASE + CHANNEL_COUNT as u16)
            .contains(&address)
        {
            let channel = (address - COIL_ADDR_FLASH_OFF_BASE) as usize;
            state.flash_off_intervals[channel] = value;
            self.log_event(
                format!("flash_off_{channel}"),
                json!({ "interval": value }),
            );
        } else if (address as usize) < CHANNEL_COUNT {
            let channel = address as usize;
            let mut level = state.digital_outputs[channel];
            match value {
                COIL_VALUE_ON => level = true,
                COIL_VALUE_OFF => level = false,
                COIL_VALUE_TOGGLE => level = !level,
                _ => {},
            }
            // Linkage mode owns the output: the input level wins over the
            // written command
            if state.control_modes[channel] == ControlMode::Linkage {
                level = state.digital_inputs[channel];
            }
            state.digital_outputs[channel] = level;
            self.log_event(format!("output_{channel}"), json!({ "state": level }));
        } else {
            return Some(frame::build_exception(
                station,
                FC_WRITE_SINGLE_COIL,
                EXC_ILLEGAL_DATA_ADDRESS,
            ));
        }

        Some(request.to_vec())
    }

    /// Write single register (0x06): control mode, baud rate and station
    /// address registers. Out-of-range values are ignored, the request is
    /// echoed either way.
    fn write_single_register(
        &self,
        state: &mut DeviceState,
        pdu: &[u8],
        request: &[u8],
    ) -> Option<Vec<u8>> {
        if pdu.len() < 4 {
            return None;
        }

        let register = u16::from_be_bytes([pdu[0], pdu[1]]);
        let value = u16::from_be_bytes([pdu[2], pdu[3]]);

        self.apply_register_write(state, register, value);

        Some(request.to_vec())
    }

    /// Write multiple coils (0x0F) over the output channel range
    fn write_multiple_coils(
        &self,
        state: &mut DeviceState,
        station: u8,
        pdu: &[u8],
    ) -> Option<Vec<u8>> {
        if pdu.len() < 5 {
            return None;
        }

        let start = u16::from_be_bytes([pdu[0], pdu[1]]);
        let quantity = u16::from_be_bytes([pdu[2], pdu[3]]);
        let byte_count = pdu[4] as usize;

        if pdu.len() < 5 + byte_count || byte_count < (quantity as usize + 7) / 8 {
            return None;
        }

        if u32::from(start) + u32::from(quantity) > CHANNEL_COUNT as u32 {
            return Some(frame::build_exception(
                station,
                FC_WRITE_MULTIPLE_COILS,
                EXC_ILLEGAL_DATA_ADDRESS,
            ));
        }

        for i in 0..quantity as usize {
            let channel = start as usize + i;
            let mut level = pdu[5 + i / 8] & (1 << (i % 8)) != 0;
            if state.control_modes[channel] == ControlMode::Linkage {
                level = state.digital_inputs[channel];
            }
            state.digital_outputs[channel] = level;
        }

        self.log_event("outputs", json!({ "states": state.digital_outputs }));

        Some(frame::build_response(
            station,
            FC_WRITE_MULTIPLE_COILS,
            &pdu[0..4],
        ))
    }

    /// Write multiple registers (0x10), each one with single-write semantics
    fn write_multiple_registers(
        &self,
        state: &mut DeviceState,
        station: u8,
        pdu: &[u8],
    ) -> Option<Vec<u8>> {
        if pdu.len() < 5 {
            return None;
        }

        let start = u16::from_be_bytes([pdu[0], pdu[1]]);
        let quantity = u16::from_be_bytes([pdu[2], pdu[3]]);
        let byte_count = pdu[4] as usize;

        if byte_count != quantity as usize * 2 || pdu.len() < 5 + byte_count {
            return None;
        }

        for i in 0..quantity as usize {
            let register = start.wrapping_add(i as u16);
            let value = u16::from_be_bytes([pdu[5 + i * 2], pdu[6 + i * 2]]);
            self.apply_register_write(state, register, value);
        }

        Some(frame::build_response(
            station,
            FC_WRITE_MULTIPLE_REGISTERS,
            &pdu[0..4],
        ))
    }

    /// Holding register write semantics shared by 0x06 and 0x10
    fn apply_register_write(&self, state: &mut DeviceState, register: u16, value: u16) {
        if (REG_CONTROL_MODE_BASE..REG_CONTROL_MODE_BASE + CHANNEL_COUNT as u16)
            .contains(&register)
        {
            let channel = (register - REG_CONTROL_MODE_BASE) as usize;
            if let Some(mode) = ControlMode::from_register(value) {
                state.control_modes[channel] = mode;
                self.log_event(format!("mode_{channel}"), json!({ "mode": mode }));
            } else {
                debug!("Ignoring unknown control mode value {}", value);
            }
        } else if register == REG_BAUD_RATE {
            match u8::try_from(value).ok().and_then(BaudRate::from_index) {
                Some(baud) => {
                    state.baud = baud;
                    self.log_event("baud", json!({ "baud": baud.as_u32() }));
                },
                None => debug!("Ignoring unknown baud rate index {}", value),
            }
        } else if register == REG_DEVICE_ADDRESS {
            match u8::try_from(value) {
                Ok(address) if address != 0 => {
                    state.address = address;
                    self.log_event("device_address", json!({ "address": address }));
                },
                _ => debug!("Ignoring invalid device address {}", value),
            }
        }
        // Writes to any other register are silently ignored
    }

    fn log_event(&self, kind: impl Into<String>, data: serde_json::Value) {
        self.lock_events().push(kind, data);
    }

    fn lock_events(&self) -> std::sync::MutexGuard<'_, EventLog> {
        match self.events.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Read coils (0x01) / discrete inputs (0x02): bits packed LSB-first
fn read_bits(station: u8, function: u8, pdu: &[u8], bank: &[bool; CHANNEL_COUNT]) -> Option<Vec<u8>> {
    if pdu.len() < 4 {
        return None;
    }

    let start = u16::from_be_bytes([pdu[0], pdu[1]]);
    let quantity = u16::from_be_bytes([pdu[2], pdu[3]]);

    if u32::from(start) + u32::from(quantity) > CHANNEL_COUNT as u32 {
        return Some(frame::build_exception(
            station,
            function,
            EXC_ILLEGAL_DATA_ADDRESS,
        ));
    }

    let byte_count = (quantity as usize + 7) / 8;
    let mut payload = vec![byte_count as u8];
    payload.resize(1 + byte_count, 0);
    for i in 0..quantity as usize {
        if bank[start as usize + i] {
            payload[1 + i / 8] |= 1 << (i % 8);
        }
    }

    Some(frame::build_response(station, function, &payload))
}

/// Read holding registers (0x03): control modes, device address, version.
/// Unknown registers read as zero so the byte count header stays truthful.
fn read_holding_registers(station: u8, pdu: &[u8], state: &DeviceState) -> Option<Vec<u8>> {
    if pdu.len() < 4 {
        return None;
    }

    let start = u16::from_be_bytes([pdu[0], pdu[1]]);
    let quantity = u16::from_be_bytes([pdu[2], pdu[3]]);

    if quantity == 0 || quantity > MAX_READ_REGISTERS {
        return Some(frame::build_exception(
            station,
            FC_READ_HOLDING_REGISTERS,
            EXC_ILLEGAL_DATA_ADDRESS,
        ));
    }

    let mut payload = Vec::with_capacity(1 + quantity as usize * 2);
    payload.push((quantity * 2) as u8);
    for i in 0..quantity {
        let value = read_register(state, start.wrapping_add(i));
        payload.extend_from_slice(&value.to_be_bytes());
    }

    Some(frame::build_response(
        station,
        FC_READ_HOLDING_REGISTERS,
        &payload,
    ))
}

fn read_register(state: &DeviceState, register: u16) -> u16 {
    if (REG_CONTROL_MODE_BASE..REG_CONTROL_MODE_BASE + CHANNEL_COUNT as u16).contains(&register) {
        state.control_modes[(register - REG_CONTROL_MODE_BASE) as usize].as_register()
    } else if register == REG_DEVICE_ADDRESS {
        u16::from(state.address)
    } else if register == REG_SOFTWARE_VERSION {
        SOFTWARE_VERSION
    } else {
        0
    }
}

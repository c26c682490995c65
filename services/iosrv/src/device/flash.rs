//! Per-channel flash cycle scheduler
//!
//! Each output channel can run one flash cycle: the output is driven high for
//! the channel's ON interval, low for its OFF interval, and so on. Intervals
//! are expressed in 100 ms units; an interval of zero halts the cycle with the
//! output left at its last driven level.
//!
//! One tokio task per active channel, tracked by a `CancellationToken`.
//! Restarting a channel cancels the previous task before the new one is
//! spawned, so at most one task per channel is ever alive.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::state::DeviceState;
use crate::protocol::constants::{CHANNEL_COUNT, FLASH_TICK_MS};

struct FlashTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Owns the per-channel flash tasks
pub struct FlashScheduler {
    state: Arc<RwLock<DeviceState>>,
    tasks: Mutex<[Option<FlashTask>; CHANNEL_COUNT]>,
}

impl FlashScheduler {
    pub fn new(state: Arc<RwLock<DeviceState>>) -> Self {
        Self {
            state,
            tasks: Mutex::new(Default::default()),
        }
    }

    /// Start (or restart) the flash cycle for a channel
    ///
    /// The previous task, if any, is cancelled first. The new cycle begins
    /// with the ON phase; the caller is expected to have reset the channel's
    /// phase flag.
    pub fn start(&self, channel: usize) {
        let token = CancellationToken::new();
        let task_token = token.clone();
        let state = Arc::clone(&self.state);

        let mut tasks = match self.tasks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(previous) = tasks[channel].take() {
            previous.token.cancel();
        }

        debug!("Starting flash cycle for channel {}", channel);
        let handle = tokio::spawn(async move {
            run_flash_cycle(state, channel, task_token).await;
        });
        tasks[channel] = Some(FlashTask { token, handle });
    }

    /// Cancel the flash cycle for a channel, leaving the output as-is
    pub fn stop(&self, channel: usize) {
        let mut tasks = match self.tasks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(task) = tasks[channel].take() {
            debug!("Stopping flash cycle for channel {}", channel);
            task.token.cancel();
        }
    }

    /// Cancel all flash cycles, used on shutdown
    pub fn stop_all(&self) {
        let mut tasks = match self.tasks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        for slot in tasks.iter_mut() {
            if let Some(task) = slot.take() {
                task.token.cancel();
                task.handle.abort();
            }
        }
    }
}

impl Drop for FlashScheduler {
    fn drop(&mut self) {
        self.stop_all();
    }
}

/// Drive one channel's flash cycle until cancelled or an interval hits zero
async fn run_flash_cycle(
    state: Arc<RwLock<DeviceState>>,
    channel: usize,
    token: CancellationToken,
) {
    loop {
        let interval = {
            let mut guard = state.write().await;
            // A replacement task may already hold this channel; once
            // cancelled, this task must not touch the output again.
            if token.is_cancelled() {
                return;
            }

            if guard.flash_phases[channel] {
                guard.digital_outputs[channel] = false;
                guard.flash_phases[channel] = false;
                guard.flash_off_intervals[channel]
            } else {
                guard.digital_outputs[channel] = true;
                guard.flash_phases[channel] = true;
                guard.flash_on_intervals[channel]
            }
        };

        // Zero interval halts the cycle with the output at its last level
        if interval == 0 {
            debug!("Flash cycle for channel {} halted", channel);
            return;
        }

        tokio::select! {
            _ = token.cancelled() => return,
            _ = tokio::time::sleep(Duration::from_millis(u64::from(interval) * FLASH_TICK_MS)) => {}
        }
    }
}

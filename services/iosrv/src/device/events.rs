//! Bounded event history
//!
//! Every state-changing command appends an entry here. The log is a fixed
//! capacity ring: when full, the oldest entry is dropped. Logging never fails
//! and never blocks request processing.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Default history capacity
pub const DEFAULT_CAPACITY: usize = 1000;

/// One recorded state change
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Event {
    /// When the change was applied
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: DateTime<Utc>,
    /// What changed, e.g. `output_3`, `mode_0`, `inputs`
    pub kind: String,
    /// Change payload
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
}

/// Fixed-capacity FIFO event log
#[derive(Debug)]
pub struct EventLog {
    entries: VecDeque<Event>,
    capacity: usize,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, evicting the oldest one when at capacity
    pub fn push(&mut self, kind: impl Into<String>, data: serde_json::Value) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(Event {
            timestamp: Utc::now(),
            kind: kind.into(),
            data,
        });
    }

    /// The most recent `limit` entries, oldest first
    pub fn recent(&self, limit: usize) -> Vec<Event> {
        let skip = self.entries.len().saturating_sub(limit);
        self.entries.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_push_and_recent_order() {
        let mut log = EventLog::new(10);
        for i in 0..5 {
            log.push(format!("output_{i}"), json!({ "state": true }));
        }

        assert_eq!(log.len(), 5);

        let recent = log.recent(3);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].kind, "output_2");
        assert_eq!(recent[2].kind, "output_4");
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut log = EventLog::new(1000);
        for i in 0..1500 {
            log.push("inputs", json!({ "seq": i }));
        }

        assert_eq!(log.len(), 1000);

        let recent = log.recent(1000);
        assert_eq!(recent[0].data["seq"], 500);
        assert_eq!(recent[999].data["seq"], 1499);
    }

    #[test]
    fn test_recent_limit_larger_than_len() {
        let mut log = EventLog::new(10);
        log.push("inputs", json!({}));

        assert_eq!(log.recent(100).len(), 1);
        assert!(EventLog::default().recent(100).is_empty());
    }
}

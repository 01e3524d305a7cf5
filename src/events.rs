//! Recent server events.
//!
//! An `EventLog` is handed explicitly to the components that report progress
//! (survey scheduler, administrative actions). Each event goes to the `log`
//! facade and into a bounded in-memory buffer that reports can show.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::utils::format_timestamp;

/// Cloneable handle to a bounded buffer of recent events.
#[derive(Clone)]
pub struct EventLog {
    entries: Arc<Mutex<VecDeque<String>>>,
    capacity: usize,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// Records an event, evicting the oldest one once the buffer is full.
    pub fn record(&self, message: impl Into<String>) {
        let message = message.into();
        log::info!("{}", message);

        if self.capacity == 0 {
            return;
        }
        let line = format!("{} {}", format_timestamp(Utc::now()), message);
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(line);
    }

    /// The last `n` events, oldest first.
    pub fn recent(&self, n: usize) -> Vec<String> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let skip = entries.len().saturating_sub(n);
        entries.iter().skip(skip).cloned().collect()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_SHOW_SERVER_EVENTS)
    }
}

//! Single-slot side channel for a late-arriving value.
//!
//! The automation engine learns its live URL deep inside its own session
//! setup, long after [`launch`](crate::runs::RunRegistry::launch) has
//! returned. A [`SignalSlot`] is the meeting point: the engine writes the
//! URL once when the session exists, and the orchestration polls the slot
//! with [`SignalSlot::await_value`] until the value appears or the budget
//! runs out. One slot per run; two runs never alias the same storage.

use std::sync::Mutex;
use std::time::Duration;

/// A single optional value, written at most once per run, read many times.
#[derive(Debug, Default)]
pub struct SignalSlot {
    value: Mutex<Option<String>>,
}

impl SignalSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the slot. Must happen before the run that will write it is launched.
    pub fn reset(&self) {
        *self.value.lock().unwrap() = None;
    }

    /// Store a value. Empty strings are ignored so a session without a
    /// live URL never looks like a signal.
    pub fn write(&self, value: &str) {
        if value.is_empty() {
            return;
        }
        *self.value.lock().unwrap() = Some(value.to_string());
    }

    /// Non-destructive peek at the current value.
    pub fn read(&self) -> Option<String> {
        self.value.lock().unwrap().clone()
    }

    /// Poll the slot every `interval` until a value appears or `timeout`
    /// elapses. The slot is read first, so a value written before the wait
    /// began is returned without sleeping; the last read lands exactly at
    /// the deadline, never after. Timing out is a valid outcome (`None`),
    /// not an error.
    pub async fn await_value(&self, timeout: Duration, interval: Duration) -> Option<String> {
        let mut waited = Duration::ZERO;
        loop {
            if let Some(value) = self.read() {
                return Some(value);
            }
            if waited >= timeout {
                return None;
            }
            tokio::time::sleep(interval).await;
            waited += interval;
        }
    }
}

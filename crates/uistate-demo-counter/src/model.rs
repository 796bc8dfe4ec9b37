#![forbid(unsafe_code)]

//! The demo's state holder.
//!
//! `CounterModel` owns its writable containers privately and exposes
//! read-only views, so UI code can observe but never write. It survives
//! lifecycle recreation (the holder outlives any one screen lifecycle),
//! which is what makes the replay/no-replay distinction between state
//! and events visible in the demo.

use std::time::{SystemTime, UNIX_EPOCH};

use uistate::{Event, LiveRef, LiveValue, MissingValueError};

pub struct CounterModel {
    prefix: String,
    number: LiveValue<i32>,
    multitude: LiveRef<i32>,
    notices: LiveValue<Event<String>>,
}

impl CounterModel {
    pub fn new(prefix: impl Into<String>, initial: i32) -> Self {
        let number = LiveValue::with_value(initial);
        let multitude = number.map(|n| n * 25);
        Self {
            prefix: prefix.into(),
            number,
            multitude,
            notices: LiveValue::new(),
        }
    }

    /// Read-only view of the counter.
    pub fn number(&self) -> LiveRef<i32> {
        self.number.read_only()
    }

    /// Derived view: the counter scaled by 25.
    pub fn multitude(&self) -> LiveRef<i32> {
        self.multitude.clone()
    }

    /// Read-only view of the one-shot notice channel.
    pub fn notices(&self) -> LiveRef<Event<String>> {
        self.notices.read_only()
    }

    /// Increment the counter and emit a generated notice line as a
    /// one-shot event. Returns the line for the caller's own use.
    pub fn generate(&self) -> Result<String, MissingValueError> {
        let current = self.number.require()?;
        self.number.set(current + 1);
        let line = format!("{}{:x}", self.prefix, stamp());
        self.notices.emit(line.clone());
        Ok(line)
    }
}

/// Monotonic-enough uniqueness suffix for generated lines.
fn stamp() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0)
}

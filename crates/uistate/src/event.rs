#![forbid(unsafe_code)]

//! One-shot event wrapper for container-published notifications.
//!
//! A [`LiveValue`] replays its latest value to observers that register
//! late or reactivate after missing writes. That is the right behavior
//! for state ("the counter is 7") and the wrong one for events ("show
//! a toast"): a replayed event fires its side effect again. [`Event`]
//! closes the gap by carrying a one-shot handled flag — the payload
//! comes out of [`Event::consume`] exactly once, no matter how many
//! observers see the wrapper or how often the container replays it.
//!
//! # Invariants
//!
//! 1. The handled flag transitions false→true at most once, only via
//!    [`Event::consume`], and never resets.
//! 2. Clones share the flag: consuming any clone marks them all handled.
//! 3. [`Event::peek`] never mutates the flag.

use std::cell::Cell;
use std::rc::Rc;

use tracing::debug;

use crate::lifecycle::Lifecycle;
use crate::value::{LiveRef, LiveValue};

/// A payload with a shared one-shot handled flag.
///
/// Cloning shares the flag (not the payload), so the value-cloning
/// notify path of [`LiveValue`] cannot mint fresh unconsumed copies.
pub struct Event<T> {
    payload: T,
    handled: Rc<Cell<bool>>,
}

impl<T: Clone> Clone for Event<T> {
    fn clone(&self) -> Self {
        Self {
            payload: self.payload.clone(),
            handled: Rc::clone(&self.handled),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Event<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event")
            .field("payload", &self.payload)
            .field("handled", &self.handled.get())
            .finish()
    }
}

impl<T> Event<T> {
    /// Wrap a payload; the handled flag starts false.
    #[must_use]
    pub fn new(payload: T) -> Self {
        Self {
            payload,
            handled: Rc::new(Cell::new(false)),
        }
    }

    /// The payload, regardless of handled state. Never mutates the flag.
    /// For diagnostics and logging.
    #[must_use]
    pub fn peek(&self) -> &T {
        &self.payload
    }

    /// Whether the payload has already been consumed.
    #[must_use]
    pub fn is_handled(&self) -> bool {
        self.handled.get()
    }

    /// The payload, exactly once: the first call flips the handled flag
    /// and returns the payload; every later call returns `None`.
    pub fn consume(&self) -> Option<T>
    where
        T: Clone,
    {
        if self.handled.replace(true) {
            None
        } else {
            debug!("event consumed");
            Some(self.payload.clone())
        }
    }
}

/// Wrap any value into an [`Event`].
pub trait IntoEvent: Sized {
    /// `value.into_event()` is shorthand for `Event::new(value)`.
    fn into_event(self) -> Event<Self>;
}

impl<T> IntoEvent for T {
    fn into_event(self) -> Event<T> {
        Event::new(self)
    }
}

impl<T: Clone + 'static> LiveRef<Event<T>> {
    /// Observe a container of events, forwarding only payloads that
    /// [`Event::consume`] yields.
    ///
    /// Gating, ordering, and teardown follow [`LiveRef::observe`]; on
    /// top of that, an already-handled wrapper is silently skipped, so
    /// a one-time side effect is not replayed to observers that attach
    /// late or reactivate after the event was handled.
    pub fn observe_event(&self, lifecycle: &Lifecycle, callback: impl Fn(T) + 'static) {
        self.observe(lifecycle, move |event| {
            if let Some(event) = event
                && let Some(payload) = event.consume()
            {
                callback(payload);
            }
        });
    }
}

impl<T: Clone + 'static> LiveValue<Event<T>> {
    /// Publish a payload as a fresh unconsumed event.
    pub fn emit(&self, payload: T) {
        self.set(Event::new(payload));
    }

    /// See [`LiveRef::observe_event`].
    pub fn observe_event(&self, lifecycle: &Lifecycle, callback: impl Fn(T) + 'static) {
        self.read_only().observe_event(lifecycle, callback);
    }
}

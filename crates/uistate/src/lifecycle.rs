#![forbid(unsafe_code)]

//! Externally driven lifecycle state machine.
//!
//! A [`Lifecycle`] is owned by whoever controls the consumer's lifetime
//! (a screen, a window, a test). Observers registered against a
//! [`crate::LiveValue`] hand over a lifecycle handle; the container uses
//! it to gate dispatch and to tear the observer down.
//!
//! # Invariants
//!
//! 1. [`LifecycleState::Destroyed`] is absorbing: once reached, no
//!    further transition occurs and no hook ever runs again.
//! 2. Hooks run synchronously, in registration order, on the thread that
//!    called [`Lifecycle::set_state`].
//! 3. Transitioning to the current state is a no-op (no hooks run).
//! 4. All hooks are dropped when the lifecycle is destroyed.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::debug;

/// The three states a lifecycle can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Observers scoped to this lifecycle receive notifications.
    Active,
    /// Observers stay registered but are not invoked; they catch up on
    /// the latest value when the lifecycle becomes active again.
    Inactive,
    /// Terminal. Observers are removed and never invoked again.
    Destroyed,
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
            Self::Destroyed => write!(f, "destroyed"),
        }
    }
}

type Hook = Rc<dyn Fn(LifecycleState)>;

struct LifecycleInner {
    state: LifecycleState,
    hooks: Vec<Hook>,
}

/// A cheap, clonable handle to a shared lifecycle state machine.
///
/// Cloning a `Lifecycle` creates a new handle to the **same** machine;
/// every clone sees the same state and the same hooks.
pub struct Lifecycle {
    inner: Rc<RefCell<LifecycleInner>>,
}

impl Clone for Lifecycle {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl std::fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Lifecycle")
            .field("state", &inner.state)
            .field("hook_count", &inner.hooks.len())
            .finish()
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    /// Create a lifecycle that starts in [`LifecycleState::Active`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_state(LifecycleState::Active)
    }

    /// Create a lifecycle in an explicit initial state.
    #[must_use]
    pub fn with_state(state: LifecycleState) -> Self {
        Self {
            inner: Rc::new(RefCell::new(LifecycleInner {
                state,
                hooks: Vec::new(),
            })),
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.inner.borrow().state
    }

    /// Whether observers scoped to this lifecycle may be invoked.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state() == LifecycleState::Active
    }

    /// Whether the lifecycle has reached its terminal state.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.state() == LifecycleState::Destroyed
    }

    /// Transition the machine and run registered hooks with the new
    /// state, in registration order.
    ///
    /// Destroyed is terminal: any transition attempted afterwards is a
    /// silent no-op. Transitioning to the current state runs no hooks.
    pub fn set_state(&self, next: LifecycleState) {
        // Collect hooks under the borrow, release, then invoke, so hooks
        // may query the lifecycle (or drive containers) re-entrantly.
        let hooks: Vec<Hook> = {
            let mut inner = self.inner.borrow_mut();
            if inner.state == LifecycleState::Destroyed {
                debug!(attempted = %next, "transition ignored: lifecycle already destroyed");
                return;
            }
            if inner.state == next {
                return;
            }
            debug!(from = %inner.state, to = %next, "lifecycle transition");
            inner.state = next;
            if next == LifecycleState::Destroyed {
                std::mem::take(&mut inner.hooks)
            } else {
                inner.hooks.clone()
            }
        };
        for hook in &hooks {
            hook(next);
        }
    }

    /// Convenience for `set_state(LifecycleState::Destroyed)`.
    pub fn destroy(&self) {
        self.set_state(LifecycleState::Destroyed);
    }

    /// Register a callback invoked exactly once when the lifecycle is
    /// destroyed. If it is already destroyed, the callback is dropped
    /// without running.
    pub fn on_destroy(&self, callback: impl FnOnce() + 'static) {
        if self.is_destroyed() {
            debug!("on_destroy ignored: lifecycle already destroyed");
            return;
        }
        let slot = Cell::new(Some(callback));
        self.watch(move |state| {
            if state == LifecycleState::Destroyed
                && let Some(cb) = slot.take()
            {
                cb();
            }
        });
    }

    /// Register a hook invoked on every state transition.
    ///
    /// Used by the value container to implement gating, catch-up on
    /// reactivation, and removal on destruction. Hooks must capture only
    /// weak references to container state so a dropped container never
    /// keeps observers alive.
    pub(crate) fn watch(&self, hook: impl Fn(LifecycleState) + 'static) {
        let mut inner = self.inner.borrow_mut();
        if inner.state == LifecycleState::Destroyed {
            return;
        }
        inner.hooks.push(Rc::new(hook));
    }
}

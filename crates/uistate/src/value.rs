#![forbid(unsafe_code)]

//! Observable value container with lifecycle-gated observers.
//!
//! # Design
//!
//! [`LiveValue<T>`] is the writable side, owned privately by a state
//! holder. [`LiveRef<T>`] is the read-only view handed to consumers.
//! Both are handles to the same `Rc<RefCell<..>>` inner cell; the split
//! enforces the single-writer rule at the type level.
//!
//! The value is `Option<T>`: `None` means "no value", covering both a
//! container that was never written and one that was explicitly
//! [`LiveValue::clear`]ed.
//!
//! # Invariants
//!
//! 1. Every write notifies: observers whose lifecycle is active receive
//!    the exact write sequence, in registration order, duplicates
//!    included.
//! 2. An observer whose lifecycle is inactive misses writes but catches
//!    up with at most one delivery (the latest value) when the lifecycle
//!    reactivates.
//! 3. An observer whose lifecycle is destroyed is removed permanently;
//!    registration against an already-destroyed lifecycle is inert.
//! 4. [`LiveRef::observe_required`] never delivers an absent value.
//! 5. Activity is re-checked at delivery time: an observer paused or
//!    destroyed by an earlier callback in the same write does not
//!    receive that write.
//! 6. A re-entrant write from inside a callback restarts the dispatch
//!    with the latest value; forwarders and not-yet-notified observers
//!    skip the superseded snapshot.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `require()` before any write | Caller ordering bug | `MissingValueError` |
//! | Observe on destroyed lifecycle | Defensive registration | Silent no-op |
//! | Derived handle dropped | All `map` refs gone | Forwarder pruned on next write |
//! | Unconditional write from a callback | Caller feedback loop | Dispatch never terminates |

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::debug;

use crate::lifecycle::{Lifecycle, LifecycleState};

/// Error returned by [`LiveRef::require`] when no value is present.
///
/// Signals a caller ordering bug (reading before the owning state holder
/// ever wrote), never a recoverable runtime condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingValueError;

impl std::fmt::Display for MissingValueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "no value has been written to this container")
    }
}

impl std::error::Error for MissingValueError {}

/// One registered observer: the gating lifecycle, the callback, and the
/// last write version it has seen (for catch-up on reactivation).
struct ObserverEntry<T> {
    lifecycle: Lifecycle,
    callback: Box<dyn Fn(Option<&T>)>,
    last_seen: Cell<u64>,
}

/// A forwarder feeds writes into a derived container created by `map`.
/// Returns `false` once the derived container is gone, which prunes it.
type Forwarder<T> = Box<dyn Fn(Option<&T>) -> bool>;

struct ValueInner<T> {
    value: Option<T>,
    /// Write counter; 0 means never written.
    version: u64,
    observers: Vec<Rc<ObserverEntry<T>>>,
    forwarders: Vec<Forwarder<T>>,
    /// A dispatch loop is currently running for this container.
    dispatching: bool,
    /// A write landed while dispatching; the loop restarts with the
    /// latest value instead of finishing with a stale snapshot.
    dispatch_invalidated: bool,
}

impl<T> ValueInner<T> {
    fn empty() -> Self {
        Self {
            value: None,
            version: 0,
            observers: Vec::new(),
            forwarders: Vec::new(),
            dispatching: false,
            dispatch_invalidated: false,
        }
    }
}

/// Read-only consumer view of an observable value.
///
/// Cloning a `LiveRef` creates a new handle to the **same** container.
/// Obtained from [`LiveValue::read_only`] or [`LiveRef::map`].
pub struct LiveRef<T> {
    inner: Rc<RefCell<ValueInner<T>>>,
}

impl<T> Clone for LiveRef<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for LiveRef<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("LiveRef")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("observer_count", &inner.observers.len())
            .finish()
    }
}

/// The writable side of an observable value.
///
/// Meant to be owned privately by a state holder; consumers receive
/// [`LiveRef`] handles via [`LiveValue::read_only`], so only the owner
/// ever writes.
pub struct LiveValue<T> {
    handle: LiveRef<T>,
}

impl<T: std::fmt::Debug> std::fmt::Debug for LiveValue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("LiveValue").field(&self.handle).finish()
    }
}

impl<T: Clone + 'static> Default for LiveValue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> LiveValue<T> {
    /// Create an empty container (no value, version 0).
    #[must_use]
    pub fn new() -> Self {
        Self {
            handle: LiveRef {
                inner: Rc::new(RefCell::new(ValueInner::empty())),
            },
        }
    }

    /// Create a container pre-populated with `value`.
    ///
    /// Counts as a write: observers registered afterwards receive the
    /// value as an immediate catch-up delivery.
    #[must_use]
    pub fn with_value(value: T) -> Self {
        let holder = Self::new();
        holder.set(value);
        holder
    }

    /// Replace the value and synchronously notify every observer whose
    /// lifecycle is currently active, in registration order.
    ///
    /// Every write notifies; writing a value equal to the current one is
    /// not coalesced.
    pub fn set(&self, value: T) {
        write_value(&self.handle.inner, Some(value));
    }

    /// Clear the value and notify likewise with an absent value.
    ///
    /// [`observe_required`](LiveRef::observe_required) observers are not
    /// invoked for the clear itself.
    pub fn clear(&self) {
        write_value(&self.handle.inner, None);
    }

    /// The read-only view to hand to consumers.
    #[must_use]
    pub fn read_only(&self) -> LiveRef<T> {
        self.handle.clone()
    }

    /// See [`LiveRef::get`].
    #[must_use]
    pub fn get(&self) -> Option<T> {
        self.handle.get()
    }

    /// See [`LiveRef::require`].
    pub fn require(&self) -> Result<T, MissingValueError> {
        self.handle.require()
    }

    /// See [`LiveRef::version`].
    #[must_use]
    pub fn version(&self) -> u64 {
        self.handle.version()
    }

    /// See [`LiveRef::observe`].
    pub fn observe(&self, lifecycle: &Lifecycle, callback: impl Fn(Option<&T>) + 'static) {
        self.handle.observe(lifecycle, callback);
    }

    /// See [`LiveRef::observe_required`].
    pub fn observe_required(&self, lifecycle: &Lifecycle, callback: impl Fn(&T) + 'static) {
        self.handle.observe_required(lifecycle, callback);
    }

    /// See [`LiveRef::map`].
    #[must_use]
    pub fn map<U: Clone + 'static>(&self, f: impl Fn(&T) -> U + 'static) -> LiveRef<U> {
        self.handle.map(f)
    }
}

impl<T: Clone + 'static> LiveRef<T> {
    /// Clone of the current value, `None` if absent. No side effects.
    #[must_use]
    pub fn get(&self) -> Option<T> {
        self.inner.borrow().value.clone()
    }

    /// The current value, or [`MissingValueError`] if absent.
    ///
    /// For consumers that must resynchronize immediately (e.g. right
    /// after a lifecycle resume) instead of waiting for the next
    /// notification.
    pub fn require(&self) -> Result<T, MissingValueError> {
        self.get().ok_or(MissingValueError)
    }

    /// Write counter; 0 means never written. Diagnostic.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Register a lifecycle-gated observer.
    ///
    /// The callback fires on every write while `lifecycle` is active.
    /// If a value has ever been written, the callback also fires once at
    /// registration (when active) and catches up on the latest value
    /// whenever the lifecycle reactivates having missed writes. When the
    /// lifecycle is destroyed the observer is removed permanently.
    ///
    /// Registering against an already-destroyed lifecycle is a silent
    /// no-op: the callback is dropped and never fires.
    pub fn observe(&self, lifecycle: &Lifecycle, callback: impl Fn(Option<&T>) + 'static) {
        if lifecycle.is_destroyed() {
            debug!("observe ignored: lifecycle already destroyed");
            return;
        }
        let entry = Rc::new(ObserverEntry {
            lifecycle: lifecycle.clone(),
            callback: Box::new(callback),
            last_seen: Cell::new(0),
        });
        self.inner.borrow_mut().observers.push(Rc::clone(&entry));

        // The hook holds only weak references: a dropped container must
        // not keep observers alive through the lifecycle.
        let weak_inner = Rc::downgrade(&self.inner);
        let weak_entry = Rc::downgrade(&entry);
        lifecycle.watch(move |state| {
            let Some(inner) = weak_inner.upgrade() else {
                return;
            };
            match state {
                LifecycleState::Destroyed => {
                    if let Some(entry) = weak_entry.upgrade() {
                        inner
                            .borrow_mut()
                            .observers
                            .retain(|e| !Rc::ptr_eq(e, &entry));
                        debug!("observer removed: lifecycle destroyed");
                    }
                }
                LifecycleState::Active => {
                    if let Some(entry) = weak_entry.upgrade() {
                        dispatch_pending(&inner, &entry);
                    }
                }
                LifecycleState::Inactive => {}
            }
        });

        if lifecycle.is_active() {
            dispatch_pending(&self.inner, &entry);
        }
    }

    /// Like [`observe`](Self::observe), but absent values are suppressed
    /// entirely: the callback only ever sees a present value.
    ///
    /// Saves every subscriber from re-implementing the "ignore
    /// uninitialized state" guard.
    pub fn observe_required(&self, lifecycle: &Lifecycle, callback: impl Fn(&T) + 'static) {
        self.observe(lifecycle, move |value| {
            if let Some(value) = value {
                callback(value);
            }
        });
    }

    /// Derive a read-only container holding `f` applied to this one.
    ///
    /// The derived container updates on every source write (absent maps
    /// to absent). It lives as long as some handle to it exists; once
    /// all handles drop, the internal forwarder is pruned from the
    /// source on its next write.
    #[must_use]
    pub fn map<U: Clone + 'static>(&self, f: impl Fn(&T) -> U + 'static) -> LiveRef<U> {
        let derived = Rc::new(RefCell::new(ValueInner::empty()));
        {
            let src = self.inner.borrow();
            if src.version > 0 {
                let mut d = derived.borrow_mut();
                d.value = src.value.as_ref().map(&f);
                d.version = 1;
            }
        }
        let weak = Rc::downgrade(&derived);
        self.inner.borrow_mut().forwarders.push(Box::new(move |value| {
            let Some(derived) = weak.upgrade() else {
                debug!("derived container gone: forwarder pruned");
                return false;
            };
            write_value(&derived, value.map(&f));
            true
        }));
        LiveRef { inner: derived }
    }
}

/// Core write path, shared by [`LiveValue::set`]/[`LiveValue::clear`]
/// and `map` forwarders: replace the value, bump the version, then run
/// the dispatch loop.
fn write_value<T: Clone + 'static>(inner: &Rc<RefCell<ValueInner<T>>>, value: Option<T>) {
    {
        let mut cell = inner.borrow_mut();
        cell.value = value;
        cell.version += 1;
    }
    dispatch(inner);
}

/// Feed forwarders and notify active observers, in registration order,
/// with the latest value.
///
/// All callbacks run outside the interior borrow, so callbacks may read
/// the container, register observers, or write (for owner-side
/// callbacks) re-entrantly. A re-entrant write marks the in-progress
/// dispatch stale and returns; the outer loop restarts with the latest
/// value, so forwarders and not-yet-notified observers skip the
/// superseded snapshot. Lifecycle activity is re-checked immediately
/// before each delivery, so an observer paused or destroyed by an
/// earlier callback in the same write does not receive it.
fn dispatch<T: Clone + 'static>(inner: &Rc<RefCell<ValueInner<T>>>) {
    {
        let mut cell = inner.borrow_mut();
        if cell.dispatching {
            cell.dispatch_invalidated = true;
            return;
        }
        cell.dispatching = true;
    }

    loop {
        let (version, snapshot) = {
            let mut cell = inner.borrow_mut();
            cell.dispatch_invalidated = false;
            (cell.version, cell.value.clone())
        };

        // Forwarders are taken out for the calls; any registered from
        // inside a callback land behind the surviving ones, preserving
        // registration order. A nested write cannot race this window:
        // it only marks the dispatch stale, and the restart re-feeds
        // every forwarder with the latest value.
        let mut forwarders = std::mem::take(&mut inner.borrow_mut().forwarders);
        forwarders.retain(|forward| forward(snapshot.as_ref()));
        {
            let mut cell = inner.borrow_mut();
            forwarders.append(&mut cell.forwarders);
            cell.forwarders = forwarders;
        }

        if !inner.borrow().dispatch_invalidated {
            // Snapshot fixes the notification order; registration and
            // activity are re-checked per delivery.
            let targets: Vec<Rc<ObserverEntry<T>>> = inner.borrow().observers.clone();
            for entry in &targets {
                let registered = inner
                    .borrow()
                    .observers
                    .iter()
                    .any(|e| Rc::ptr_eq(e, entry));
                if !registered
                    || !entry.lifecycle.is_active()
                    || entry.last_seen.get() >= version
                {
                    continue;
                }
                entry.last_seen.set(version);
                (entry.callback)(snapshot.as_ref());
                if inner.borrow().dispatch_invalidated {
                    break;
                }
            }
        }

        let done = {
            let mut cell = inner.borrow_mut();
            if cell.dispatch_invalidated {
                false
            } else {
                cell.dispatching = false;
                true
            }
        };
        if done {
            break;
        }
    }
}

/// Deliver the latest value to one observer if it has missed writes.
/// At most one delivery, carrying only the current value.
fn dispatch_pending<T: Clone + 'static>(
    inner: &Rc<RefCell<ValueInner<T>>>,
    entry: &Rc<ObserverEntry<T>>,
) {
    let (version, snapshot) = {
        let cell = inner.borrow();
        (cell.version, cell.value.clone())
    };
    if version == 0 || entry.last_seen.get() >= version {
        return;
    }
    entry.last_seen.set(version);
    (entry.callback)(snapshot.as_ref());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn get_set_basic() {
        let holder = LiveValue::new();
        assert_eq!(holder.get(), None);
        assert_eq!(holder.version(), 0);

        holder.set(42);
        assert_eq!(holder.get(), Some(42));
        assert_eq!(holder.version(), 1);
    }

    #[test]
    fn with_value_counts_as_write() {
        let holder = LiveValue::with_value(7);
        assert_eq!(holder.get(), Some(7));
        assert_eq!(holder.version(), 1);
    }

    #[test]
    fn clear_yields_absent() {
        let holder = LiveValue::with_value(1);
        holder.clear();
        assert_eq!(holder.get(), None);
        assert_eq!(holder.version(), 2);
    }

    #[test]
    fn every_write_notifies_even_duplicates() {
        let holder = LiveValue::new();
        let lc = Lifecycle::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        holder.observe_required(&lc, move |v| s.borrow_mut().push(*v));

        holder.set(1);
        holder.set(1);
        holder.set(2);
        assert_eq!(*seen.borrow(), vec![1, 1, 2]);
    }

    #[test]
    fn observers_notified_in_registration_order() {
        let holder = LiveValue::new();
        let lc = Lifecycle::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let l1 = Rc::clone(&log);
        holder.observe(&lc, move |_| l1.borrow_mut().push('A'));
        let l2 = Rc::clone(&log);
        holder.observe(&lc, move |_| l2.borrow_mut().push('B'));
        let l3 = Rc::clone(&log);
        holder.observe(&lc, move |_| l3.borrow_mut().push('C'));

        holder.set(1);
        assert_eq!(*log.borrow(), vec!['A', 'B', 'C']);
    }

    #[test]
    fn registration_replay_when_value_present() {
        let holder = LiveValue::with_value(5);
        let lc = Lifecycle::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        holder.observe_required(&lc, move |v| s.borrow_mut().push(*v));

        // One catch-up delivery at registration, then live writes.
        assert_eq!(*seen.borrow(), vec![5]);
        holder.set(6);
        assert_eq!(*seen.borrow(), vec![5, 6]);
    }

    #[test]
    fn no_replay_on_fresh_container() {
        let holder: LiveValue<i32> = LiveValue::new();
        let lc = Lifecycle::new();
        let count = Rc::new(Cell::new(0u32));
        let c = Rc::clone(&count);
        holder.observe(&lc, move |_| c.set(c.get() + 1));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn inactive_observer_misses_writes_then_catches_up_once() {
        let holder = LiveValue::new();
        let lc = Lifecycle::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        holder.observe_required(&lc, move |v| s.borrow_mut().push(*v));

        lc.set_state(LifecycleState::Inactive);
        holder.set(1);
        holder.set(2);
        holder.set(3);
        assert!(seen.borrow().is_empty());

        lc.set_state(LifecycleState::Active);
        // Exactly one catch-up delivery, latest value only.
        assert_eq!(*seen.borrow(), vec![3]);
    }

    #[test]
    fn reactivation_without_missed_writes_is_silent() {
        let holder = LiveValue::with_value(1);
        let lc = Lifecycle::new();
        let count = Rc::new(Cell::new(0u32));
        let c = Rc::clone(&count);
        holder.observe(&lc, move |_| c.set(c.get() + 1));
        assert_eq!(count.get(), 1);

        lc.set_state(LifecycleState::Inactive);
        lc.set_state(LifecycleState::Active);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn destroyed_lifecycle_never_invoked_again() {
        let holder = LiveValue::new();
        let lc = Lifecycle::new();
        let count = Rc::new(Cell::new(0u32));
        let c = Rc::clone(&count);
        holder.observe(&lc, move |_| c.set(c.get() + 1));

        holder.set(1);
        assert_eq!(count.get(), 1);

        lc.destroy();
        for i in 0..10 {
            holder.set(i);
        }
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn observe_on_destroyed_lifecycle_is_inert() {
        let holder = LiveValue::with_value(1);
        let lc = Lifecycle::new();
        lc.destroy();

        let count = Rc::new(Cell::new(0u32));
        let c = Rc::clone(&count);
        holder.observe(&lc, move |_| c.set(c.get() + 1));

        holder.set(2);
        assert_eq!(count.get(), 0);
        assert_eq!(holder.handle.inner.borrow().observers.len(), 0);
    }

    #[test]
    fn destroy_removes_entry_from_observer_list() {
        let holder = LiveValue::new();
        let lc = Lifecycle::new();
        holder.observe(&lc, |_: Option<&i32>| {});
        assert_eq!(holder.handle.inner.borrow().observers.len(), 1);

        lc.destroy();
        assert_eq!(holder.handle.inner.borrow().observers.len(), 0);
    }

    #[test]
    fn observe_required_suppresses_absent() {
        let holder = LiveValue::new();
        let lc = Lifecycle::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        holder.observe_required(&lc, move |v| s.borrow_mut().push(*v));

        holder.set(1);
        holder.clear();
        holder.set(2);
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn plain_observe_sees_absent() {
        let holder = LiveValue::new();
        let lc = Lifecycle::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        holder.observe(&lc, move |v: Option<&i32>| s.borrow_mut().push(v.copied()));

        holder.set(1);
        holder.clear();
        assert_eq!(*seen.borrow(), vec![Some(1), None]);
    }

    #[test]
    fn require_before_write_fails() {
        let holder: LiveValue<String> = LiveValue::new();
        assert_eq!(holder.require(), Err(MissingValueError));
    }

    #[test]
    fn require_after_write_returns_value() {
        let holder = LiveValue::new();
        holder.set("ready".to_string());
        assert_eq!(holder.require(), Ok("ready".to_string()));
    }

    #[test]
    fn require_after_clear_fails() {
        let holder = LiveValue::with_value(1);
        holder.clear();
        assert_eq!(holder.require(), Err(MissingValueError));
    }

    #[test]
    fn read_only_shares_container() {
        let holder = LiveValue::new();
        let reader = holder.read_only();
        holder.set(9);
        assert_eq!(reader.get(), Some(9));
        assert_eq!(reader.version(), 1);
    }

    #[test]
    fn map_tracks_source() {
        let holder = LiveValue::with_value(4);
        let doubled = holder.map(|n| n * 2);
        assert_eq!(doubled.get(), Some(8));

        holder.set(10);
        assert_eq!(doubled.get(), Some(20));

        holder.clear();
        assert_eq!(doubled.get(), None);
    }

    #[test]
    fn map_on_fresh_container_starts_empty() {
        let holder: LiveValue<i32> = LiveValue::new();
        let mapped = holder.map(|n| n + 1);
        assert_eq!(mapped.get(), None);
        assert_eq!(mapped.version(), 0);
    }

    #[test]
    fn map_notifies_derived_observers() {
        let holder = LiveValue::new();
        let mapped = holder.map(|n: &i32| n * 25);
        let lc = Lifecycle::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        mapped.observe_required(&lc, move |v| s.borrow_mut().push(*v));

        holder.set(1);
        holder.set(2);
        assert_eq!(*seen.borrow(), vec![25, 50]);
    }

    #[test]
    fn dropped_derived_container_is_pruned() {
        let holder = LiveValue::new();
        let mapped = holder.map(|n: &i32| n * 2);
        assert_eq!(holder.handle.inner.borrow().forwarders.len(), 1);

        drop(mapped);
        holder.set(1);
        assert_eq!(holder.handle.inner.borrow().forwarders.len(), 0);
    }

    #[test]
    fn mixed_lifecycles_gate_independently() {
        let holder = LiveValue::new();
        let lc_a = Lifecycle::new();
        let lc_b = Lifecycle::new();
        let a = Rc::new(Cell::new(0u32));
        let b = Rc::new(Cell::new(0u32));
        let ac = Rc::clone(&a);
        let bc = Rc::clone(&b);
        holder.observe(&lc_a, move |_| ac.set(ac.get() + 1));
        holder.observe(&lc_b, move |_| bc.set(bc.get() + 1));

        lc_a.set_state(LifecycleState::Inactive);
        holder.set(1);
        assert_eq!(a.get(), 0);
        assert_eq!(b.get(), 1);

        lc_a.set_state(LifecycleState::Active);
        assert_eq!(a.get(), 1);
        assert_eq!(b.get(), 1);
    }

    #[test]
    fn debug_format() {
        let holder = LiveValue::with_value(42);
        let dbg = format!("{holder:?}");
        assert!(dbg.contains("LiveValue"));
        assert!(dbg.contains("42"));
        assert!(dbg.contains("version"));
    }

    #[test]
    fn reentrant_write_restarts_dispatch_with_latest() {
        let holder = Rc::new(LiveValue::new());
        let lc = Lifecycle::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let h = Rc::clone(&holder);
        let s = Rc::clone(&seen);
        holder.observe_required(&lc, move |v| {
            s.borrow_mut().push(*v);
            if *v < 3 {
                h.set(v + 1);
            }
        });

        holder.set(1);
        assert_eq!(*seen.borrow(), vec![1, 2, 3]);
        assert_eq!(holder.get(), Some(3));
        assert_eq!(holder.version(), 3);
    }

    #[test]
    fn reentrant_write_skips_stale_snapshot_for_later_observers() {
        let holder = Rc::new(LiveValue::new());
        let lc = Lifecycle::new();

        // First observer rewrites once; the second must only ever see
        // the value that ended up current.
        let h = Rc::clone(&holder);
        holder.observe_required(&lc, move |v| {
            if *v == 1 {
                h.set(2);
            }
        });
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        holder.observe_required(&lc, move |v| s.borrow_mut().push(*v));

        holder.set(1);
        assert_eq!(*seen.borrow(), vec![2]);
    }

    #[test]
    fn nested_write_from_derived_observer_reaches_derived() {
        let source = Rc::new(LiveValue::new());
        let derived = source.map(|n: &i32| n * 10);
        let lc = Lifecycle::new();

        // The derived observer writes back to the source while the
        // source's forwarder dispatch is still in flight.
        let src = Rc::clone(&source);
        derived.observe_required(&lc, move |v| {
            if *v == 10 {
                src.set(2);
            }
        });

        source.set(1);
        assert_eq!(source.get(), Some(2));
        assert_eq!(derived.get(), Some(20));
    }

    #[test]
    fn observer_destroyed_by_earlier_callback_skips_same_write() {
        let holder = LiveValue::new();
        let lc_a = Lifecycle::new();
        let lc_b = Lifecycle::new();

        let doomed = lc_b.clone();
        holder.observe(&lc_a, move |_: Option<&i32>| doomed.destroy());

        let count = Rc::new(Cell::new(0u32));
        let c = Rc::clone(&count);
        holder.observe(&lc_b, move |_| c.set(c.get() + 1));

        holder.set(1);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn observer_paused_by_earlier_callback_skips_then_catches_up() {
        let holder = LiveValue::new();
        let lc_a = Lifecycle::new();
        let lc_b = Lifecycle::new();

        let paused = lc_b.clone();
        holder.observe(&lc_a, move |_: Option<&i32>| {
            paused.set_state(LifecycleState::Inactive);
        });

        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        holder.observe_required(&lc_b, move |v| s.borrow_mut().push(*v));

        holder.set(1);
        assert!(seen.borrow().is_empty());

        // Reactivation delivers the missed value as a catch-up.
        lc_b.set_state(LifecycleState::Active);
        assert_eq!(*seen.borrow(), vec![1]);
    }

    #[test]
    fn registration_while_inactive_fires_on_activation() {
        let holder = LiveValue::with_value(5);
        let lc = Lifecycle::with_state(LifecycleState::Inactive);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        holder.observe_required(&lc, move |v| s.borrow_mut().push(*v));
        assert!(seen.borrow().is_empty());

        holder.set(6);
        assert!(seen.borrow().is_empty());

        lc.set_state(LifecycleState::Active);
        assert_eq!(*seen.borrow(), vec![6]);
    }
}

#![forbid(unsafe_code)]

//! Lifecycle-aware state primitives for single-threaded UIs.
//!
//! This crate provides the small set of building blocks a retained
//! state holder ("view model") needs to publish state to UI code whose
//! lifetime it does not control:
//!
//! - [`Lifecycle`]: an externally driven active/inactive/destroyed state
//!   machine that gates observer dispatch.
//! - [`LiveValue`] / [`LiveRef`]: a writable value container and its
//!   read-only consumer view. Observers are scoped to a [`Lifecycle`],
//!   receive every write in registration order while active, catch up on
//!   the latest value when reactivated, and are removed permanently on
//!   destruction.
//! - [`Event`]: a one-shot payload wrapper. Consuming it through
//!   [`Event::consume`] yields the payload exactly once, so transient
//!   notifications are not replayed to late or reactivated observers.
//! - [`Producer`]: a typed zero-argument factory binding for state
//!   holders that need constructor arguments.
//!
//! # Architecture
//!
//! Everything is `Rc<RefCell<..>>`-based and single-threaded: reads,
//! writes, and observer dispatch happen synchronously on the calling
//! thread. The writable [`LiveValue`] is meant to be owned privately by
//! the state holder; consumers only ever see [`LiveRef`], so there is a
//! single writer by construction.
//!
//! # Errors
//!
//! Two failure kinds exist, both signalling caller bugs rather than
//! runtime conditions: [`MissingValueError`] ([`LiveRef::require`]
//! before any write) and [`TypeMismatchError`] ([`Producer::create`]
//! for a type other than the bound one). Every other operation is
//! total: observing from a destroyed lifecycle is silently inert, and
//! consuming an already-handled event yields `None`.

pub mod event;
pub mod factory;
pub mod lifecycle;
pub mod value;

pub use event::{Event, IntoEvent};
pub use factory::{Producer, TypeMismatchError};
pub use lifecycle::{Lifecycle, LifecycleState};
pub use value::{LiveRef, LiveValue, MissingValueError};

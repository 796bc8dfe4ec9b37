#![forbid(unsafe_code)]

//! Typed zero-argument producer binding for state holders.
//!
//! Default-constructible state holders need no factory. Holders that
//! take constructor arguments get a [`Producer`]: a deliberately narrow
//! escape hatch binding exactly one target type to one closure. A
//! request for any other type fails fast with both type names rather
//! than silently substituting.

use std::any::{Any, TypeId, type_name};

use tracing::debug;

/// Error returned by [`Producer::create`] when the requested type is not
/// the bound one. Signals a caller wiring bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMismatchError {
    /// Type the producer was bound to.
    pub bound: &'static str,
    /// Type the caller requested.
    pub requested: &'static str,
}

impl std::fmt::Display for TypeMismatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "producer bound to `{}` cannot satisfy a request for `{}`",
            self.bound, self.requested
        )
    }
}

impl std::error::Error for TypeMismatchError {}

/// Binds one state-holder type `M` to one zero-argument producer.
///
/// No coercion, no fallback producer, no caching across requested
/// types: [`create`](Self::create) runs the closure when and only when
/// the requested type is exactly `M`.
pub struct Producer<M: 'static> {
    make: Box<dyn Fn() -> M>,
}

impl<M: 'static> std::fmt::Debug for Producer<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Producer")
            .field("bound", &type_name::<M>())
            .finish()
    }
}

impl<M: 'static> Producer<M> {
    /// Bind `make` to the target type `M`.
    #[must_use]
    pub fn new(make: impl Fn() -> M + 'static) -> Self {
        Self {
            make: Box::new(make),
        }
    }

    /// Run the producer if `R` is exactly the bound type.
    ///
    /// The result moves through a `Box<dyn Any>` downcast anchored by a
    /// compile-time `TypeId` comparison; there is no runtime inspection
    /// of the produced value.
    pub fn create<R: 'static>(&self) -> Result<R, TypeMismatchError> {
        let mismatch = TypeMismatchError {
            bound: type_name::<M>(),
            requested: type_name::<R>(),
        };
        if TypeId::of::<R>() != TypeId::of::<M>() {
            debug!(bound = mismatch.bound, requested = mismatch.requested, "type mismatch");
            return Err(mismatch);
        }
        let produced: Box<dyn Any> = Box::new((self.make)());
        match produced.downcast::<R>() {
            Ok(value) => Ok(*value),
            Err(_) => Err(mismatch),
        }
    }
}

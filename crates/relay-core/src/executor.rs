//! # Executors
//!
//! An executor is the invocable unit behind a subscriber: something that takes
//! one event and runs a bound handler body against it.
//!
//! How the unit was constructed (a plain closure, a listener method bound
//! through a factory, a forwarding sink) is invisible to the dispatcher. Every
//! executor surfaces handler errors the same way, as the `Err` of
//! [`EventExecutor::invoke`].

use crate::error::{EventViewError, HandlerError};
use crate::event::{AnyEvent, Event};
use crate::subscriber::OwnerId;
use std::fmt;
use std::marker::PhantomData;
use uuid::Uuid;

/// Invokes a bound handler with a single event.
pub trait EventExecutor: Send + Sync {
    /// Runs the handler. Errors raised by the handler body are returned as-is.
    fn invoke(&self, event: &dyn AnyEvent) -> Result<(), HandlerError>;
}

impl<F> EventExecutor for F
where
    F: Fn(&dyn AnyEvent) -> Result<(), HandlerError> + Send + Sync,
{
    fn invoke(&self, event: &dyn AnyEvent) -> Result<(), HandlerError> {
        self(event)
    }
}

/// Executor for a closure over a concrete event type.
///
/// The event is viewed as `T` before the closure runs; an event that cannot be
/// viewed as `T` is reported as an [`EventViewError`].
pub struct TypedExecutor<T, F> {
    handler: F,
    _event: PhantomData<fn(&T)>,
}

impl<T, F> TypedExecutor<T, F>
where
    T: Event,
    F: Fn(&T) -> Result<(), HandlerError> + Send + Sync,
{
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            _event: PhantomData,
        }
    }
}

impl<T, F> EventExecutor for TypedExecutor<T, F>
where
    T: Event,
    F: Fn(&T) -> Result<(), HandlerError> + Send + Sync,
{
    fn invoke(&self, event: &dyn AnyEvent) -> Result<(), HandlerError> {
        let Some(typed) = event.view::<T>() else {
            return Err(EventViewError {
                expected: std::any::type_name::<T>(),
                actual: event.event_type().name(),
            }
            .into());
        };
        (self.handler)(typed)
    }
}

/// Stable identity of the handler an executor is bound to.
///
/// Part of a subscriber's equality key. Executors themselves are opaque, so
/// their identity is assigned when they are constructed.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutorId {
    /// A one-off handler such as an ad-hoc closure.
    Unique(Uuid),
    /// A named handler bound to a listener instance.
    Method {
        /// The listener the handler is bound to.
        owner: OwnerId,
        /// The handler's name on the listener.
        name: &'static str,
    },
}

impl ExecutorId {
    /// A fresh identity, equal to no other.
    #[must_use]
    pub fn unique() -> Self {
        Self::Unique(Uuid::new_v4())
    }

    /// Identity of the handler `name` bound to `owner`.
    #[must_use]
    pub fn method(owner: OwnerId, name: &'static str) -> Self {
        Self::Method { owner, name }
    }
}

impl fmt::Debug for ExecutorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unique(id) => write!(f, "unique:{id}"),
            Self::Method { owner, name } => write!(f, "{owner:?}::{name}"),
        }
    }
}

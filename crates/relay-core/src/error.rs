//! Error types for the dispatch engine.

use thiserror::Error;

/// Error raised by a subscriber's handler body.
///
/// Handlers return `anyhow::Result<()>`, so any error type can be surfaced
/// through a [`PostResult`](crate::PostResult).
pub type HandlerError = anyhow::Error;

/// Errors from bus registration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The subscriber's declared type is outside the bus's event root.
    #[error("Event type {event} is not assignable to bus root type {root}")]
    NotAssignable {
        /// Declared type of the rejected subscriber.
        event: &'static str,
        /// Root type the bus was configured with.
        root: &'static str,
    },
}

/// Errors from validating a [`BusConfig`](crate::BusConfig).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Bus name cannot be empty")]
    EmptyName,

    #[error("Invalid value for {var}: {value}")]
    InvalidEnv { var: &'static str, value: String },
}

/// A handler panicked while being invoked.
///
/// Recorded as an ordinary failure when the bus is configured to catch panics.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Subscriber panicked: {message}")]
pub struct SubscriberPanic {
    /// The panic payload rendered as text, when it was a string.
    pub message: String,
}

/// A typed handler received an event it cannot view as its parameter type.
///
/// Happens when a typed handler is registered under a supertype whose events
/// do not project onto the handler's type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Event of type {actual} cannot be viewed as {expected}")]
pub struct EventViewError {
    /// Type the handler accepts.
    pub expected: &'static str,
    /// Concrete type of the posted event.
    pub actual: &'static str,
}

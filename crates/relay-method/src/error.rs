//! Error types for listener registration.

use relay_core::BusError;
use thiserror::Error;

/// An executor could not be constructed for a handler method.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindError {
    /// A cached binding exists for this method but declares another event type.
    #[error("Handler {listener}::{method} was bound for {cached} but now declares {declared}")]
    ShapeConflict {
        listener: &'static str,
        method: &'static str,
        cached: &'static str,
        declared: &'static str,
    },

    /// The listener declares more than one handler under this name.
    #[error("Handler {listener}::{method} is declared more than once")]
    DuplicateHandler {
        listener: &'static str,
        method: &'static str,
    },
}

/// Why a single handler method was not registered.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CandidateError {
    #[error(transparent)]
    Bind(#[from] BindError),

    #[error(transparent)]
    Bus(#[from] BusError),
}

/// One handler method that failed to register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedHandler {
    pub method: &'static str,
    pub error: CandidateError,
}

/// Some handler methods of a listener could not be registered.
///
/// The remaining handlers were registered regardless.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{} handler(s) on {listener} could not be registered", .failures.len())]
pub struct RegistrationError {
    pub listener: &'static str,
    /// Handlers that were registered despite the failures.
    pub registered: usize,
    pub failures: Vec<FailedHandler>,
}

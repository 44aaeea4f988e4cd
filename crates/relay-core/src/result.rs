//! # Post Results
//!
//! The outcome of one `post` call. Subscriber failures never escape `post`;
//! they are collected here, in invocation order, next to the subscriber that
//! raised them. Callers who want fail-fast behaviour opt in with
//! [`PostResult::raise`].

use crate::error::{HandlerError, SubscriberPanic};
use crate::subscriber::Subscriber;
use std::fmt;
use thiserror::Error;

/// One subscriber's failure during a dispatch.
pub struct SubscriberFailure {
    subscriber: Subscriber,
    error: HandlerError,
}

impl SubscriberFailure {
    pub(crate) fn new(subscriber: Subscriber, error: HandlerError) -> Self {
        Self { subscriber, error }
    }

    /// The subscriber that failed.
    #[must_use]
    pub fn subscriber(&self) -> &Subscriber {
        &self.subscriber
    }

    /// What it failed with.
    #[must_use]
    pub fn error(&self) -> &HandlerError {
        &self.error
    }

    /// Whether the handler panicked rather than returning an error.
    #[must_use]
    pub fn is_panic(&self) -> bool {
        self.error.is::<SubscriberPanic>()
    }

    /// Splits into the subscriber and its error.
    #[must_use]
    pub fn into_parts(self) -> (Subscriber, HandlerError) {
        (self.subscriber, self.error)
    }
}

impl fmt::Debug for SubscriberFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriberFailure")
            .field("subscriber", &self.subscriber)
            .field("error", &self.error)
            .finish()
    }
}

/// Outcome of posting an event.
#[must_use = "a PostResult may carry subscriber failures that should be inspected"]
#[derive(Debug)]
pub enum PostResult {
    /// Every invoked subscriber returned normally.
    Success,
    /// At least one subscriber failed.
    Failure(Failures),
}

/// The failures of one dispatch. Never empty.
#[derive(Debug)]
pub struct Failures(Vec<SubscriberFailure>);

impl Failures {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; provided for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SubscriberFailure> {
        self.0.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[SubscriberFailure] {
        &self.0
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<SubscriberFailure> {
        self.0
    }
}

impl<'a> IntoIterator for &'a Failures {
    type Item = &'a SubscriberFailure;
    type IntoIter = std::slice::Iter<'a, SubscriberFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Failures {
    type Item = SubscriberFailure;
    type IntoIter = std::vec::IntoIter<SubscriberFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl PostResult {
    /// The success result.
    pub fn success() -> Self {
        Self::Success
    }

    /// Result for a dispatch that captured `failures`.
    ///
    /// An empty collection yields [`PostResult::Success`], so a `Failure` is
    /// never empty.
    pub fn from_failures(failures: Vec<SubscriberFailure>) -> Self {
        if failures.is_empty() {
            Self::Success
        } else {
            Self::Failure(Failures(failures))
        }
    }

    /// Whether every invoked subscriber returned normally.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// The captured failures, in invocation order. Empty on success.
    #[must_use]
    pub fn failures(&self) -> &[SubscriberFailure] {
        match self {
            Self::Success => &[],
            Self::Failure(failures) => failures.as_slice(),
        }
    }

    /// The captured errors, in invocation order.
    pub fn errors(&self) -> impl Iterator<Item = &HandlerError> {
        self.failures().iter().map(SubscriberFailure::error)
    }

    /// Escalates a failure into a single [`CompositeError`].
    pub fn raise(self) -> Result<(), CompositeError> {
        match self {
            Self::Success => Ok(()),
            Self::Failure(failures) => Err(CompositeError { failures }),
        }
    }
}

impl fmt::Display for PostResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "PostResult{{type=success}}"),
            Self::Failure(failures) => {
                write!(f, "PostResult{{type=failure, exceptions=[")?;
                for (i, failure) in failures.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", failure.error)?;
                }
                write!(f, "]}}")
            }
        }
    }
}

/// Every failure of one dispatch, raised as a single error.
#[derive(Debug, Error)]
#[error("Errors occurred whilst posting to {} subscriber(s)", .failures.len())]
pub struct CompositeError {
    failures: Failures,
}

impl CompositeError {
    #[must_use]
    pub fn failures(&self) -> &Failures {
        &self.failures
    }

    #[must_use]
    pub fn into_failures(self) -> Failures {
        self.failures
    }
}

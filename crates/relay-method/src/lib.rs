//! # Relay Method - Listener Registration
//!
//! Registers a listener object's handler methods as bus subscribers.
//!
//! ## Collaborators
//!
//! ```text
//! ┌──────────────┐ handlers()  ┌───────────────┐ accept? order? cancelled?
//! │  Listener L  │ ──────────▶ │ MethodScanner │
//! └──────────────┘             └───────┬───────┘
//!                                      ▼
//!                            ┌───────────────────┐ (listener, method)
//!                            │  ExecutorFactory  │ ─────────────────▶ executor
//!                            └─────────┬─────────┘
//!                                      ▼
//!                       MethodSubscriptionAdapter ──register──▶ EventBus
//! ```
//!
//! A listener type lists its handlers explicitly through [`Listener::handlers`];
//! each [`HandlerMethod`] carries the `subscribe` / `ignore_cancelled` markers
//! the default scanner reads.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapter;
pub mod error;
pub mod factory;
pub mod method;
pub mod scanner;

// Re-export main types
pub use adapter::MethodSubscriptionAdapter;
pub use error::{BindError, CandidateError, FailedHandler, RegistrationError};
pub use factory::{CachingExecutorFactory, DirectExecutorFactory, ExecutorFactory};
pub use method::{HandlerMethod, Listener, MethodThunk};
pub use scanner::{DefaultMethodScanner, MethodScanner};

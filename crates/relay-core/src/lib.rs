//! # Relay Core - In-Process Event Dispatch
//!
//! Synchronous publish/subscribe: producers `post` events, subscribers
//! registered for the event's type (or any of its supertypes) run inline on
//! the posting thread, in priority order.
//!
//! ## Dispatch Flow
//!
//! ```text
//! ┌──────────────┐   post(&event)   ┌──────────────────┐
//! │   Producer   │ ───────────────▶ │  SimpleEventBus  │
//! └──────────────┘                  └────────┬─────────┘
//!        ▲                                   │ lookup(concrete type)
//!        │ PostResult                        ▼
//!        │                          ┌──────────────────┐  ancestors_of
//!        │                          │SubscriberRegistry│ ─────────────▶ hierarchy
//!        │                          └────────┬─────────┘
//!        │                                   │ [FIRST .. LAST]
//!        │                                   ▼
//!        └──────────────────────────  invoke each subscriber,
//!                                     capture failures
//! ```
//!
//! ## Guarantees
//!
//! - A subscriber registered under `T` receives every event whose type is `T`
//!   or a subtype of `T`.
//! - One failing subscriber never prevents delivery to the others.
//! - `post` never fails; failures are returned in the [`PostResult`].
//! - A dispatch works from a snapshot of the subscriber list taken when it
//!   starts.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod bus;
pub mod config;
pub mod error;
pub mod event;
pub mod executor;
pub mod hierarchy;
pub mod order;
pub mod registry;
pub mod result;
pub mod subscriber;

// Re-export main types
pub use bus::{EventBus, EventBusExt, SimpleEventBus};
pub use config::{BusConfig, DEFAULT_CACHE_CAPACITY};
pub use error::{BusError, ConfigError, EventViewError, HandlerError, SubscriberPanic};
pub use event::{AnyEvent, Cancellable, Cancellation, Event};
pub use executor::{EventExecutor, ExecutorId, TypedExecutor};
pub use hierarchy::{ancestors_of, is_subtype, EventType, TypeTag};
pub use order::PostOrder;
pub use registry::{SubscriberRegistry, SubscriberSnapshot};
pub use result::{CompositeError, Failures, PostResult, SubscriberFailure};
pub use subscriber::{OwnerId, Subscriber, SubscriberBuilder};

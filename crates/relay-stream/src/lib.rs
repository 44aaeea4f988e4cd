//! # Relay Stream - Async Consumption of Bus Events
//!
//! Turns "every `T` posted to this bus" into a [`tokio_stream::Stream`].
//!
//! ```rust,ignore
//! let bus = Arc::new(SimpleEventBus::new());
//! let mut joins = bus.event_stream::<PlayerJoined>()?;
//!
//! while let Some(joined) = joins.recv().await {
//!     greet(&joined);
//! }
//! ```
//!
//! Posting stays synchronous: the bus pushes a clone of each event into the
//! stream's buffer and returns.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod stream;

// Re-export main types
pub use stream::{EventStream, EventStreamExt, StreamClosed};

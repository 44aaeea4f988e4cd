//! # Relay Test Suite
//!
//! Unified test crate for scenarios that span more than one relay crate.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Shared event hierarchy and tracing setup
//! └── integration/      # Cross-crate scenarios
//!     ├── dispatch.rs        # Routing, ordering, filters, failure isolation
//!     ├── concurrency.rs     # Registration racing dispatch
//!     ├── method_adapter.rs  # Listener registration on a rooted bus
//!     └── streams.rs         # Stream bridge lifecycle
//!
//! tests/benches/
//! └── dispatch_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p relay-tests
//!
//! # By area
//! cargo test -p relay-tests integration::dispatch::
//! cargo test -p relay-tests integration::concurrency::
//!
//! # With bus logging
//! RUST_LOG=relay_core=trace cargo test -p relay-tests -- --nocapture
//!
//! # Benchmarks
//! cargo bench -p relay-tests
//! ```

#![allow(dead_code)]

pub mod fixtures;
pub mod integration;

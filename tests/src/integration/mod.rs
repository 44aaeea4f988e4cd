//! # Integration Scenarios
//!
//! Every module drives the public API only: `relay_core` buses, listeners
//! registered through `relay_method`, and streams from `relay_stream`.

pub mod dispatch;

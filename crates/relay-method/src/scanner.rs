//! Decides which handler methods become subscribers, and with what settings.

use crate::method::{HandlerMethod, Listener};
use relay_core::PostOrder;

/// Strategy consulted once per handler method during registration.
///
/// The provided methods read the descriptor's own markers; override them to
/// filter or re-prioritize handlers.
pub trait MethodScanner: Send + Sync {
    /// Whether a subscriber should be generated for `method`.
    fn should_register<L: Listener>(&self, listener: &L, method: &HandlerMethod<L>) -> bool {
        let _ = listener;
        method.subscribe_order().is_some()
    }

    /// The priority the resulting subscriber is dispatched at.
    fn post_order<L: Listener>(&self, listener: &L, method: &HandlerMethod<L>) -> PostOrder {
        let _ = listener;
        method.subscribe_order().unwrap_or_default()
    }

    /// Whether cancelled events are delivered to the resulting subscriber.
    fn consume_cancelled_events<L: Listener>(&self, listener: &L, method: &HandlerMethod<L>) -> bool {
        let _ = listener;
        !method.is_ignore_cancelled()
    }
}

/// Registers every method carrying a `subscribe` marker, at the order it names.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMethodScanner;

impl MethodScanner for DefaultMethodScanner {}

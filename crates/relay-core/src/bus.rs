//! # Event Bus
//!
//! The bus surface and its reference implementation.
//!
//! ## Dispatch
//!
//! `post` runs every applicable subscriber inline, on the calling thread, in
//! priority order:
//!
//! ```text
//! post(event)
//!   ├─► concrete = event.event_type()
//!   ├─► subscribers = registry.lookup(concrete)      (snapshot, ordered)
//!   └─► for each subscriber
//!         ├─ event cancelled && !consume_cancelled ─► skip
//!         ├─ generic tag present on both and differs ─► skip
//!         └─ invoke ─► Err / panic captured, loop continues
//! ```
//!
//! A failing subscriber never stops delivery to the ones after it; `post`
//! itself never fails.

use crate::config::BusConfig;
use crate::error::{BusError, ConfigError, HandlerError, SubscriberPanic};
use crate::event::{AnyEvent, Event};
use crate::hierarchy::{is_subtype, EventType};
use crate::registry::{SubscriberRegistry, SubscriberSnapshot};
use crate::result::{PostResult, SubscriberFailure};
use crate::subscriber::{OwnerId, Subscriber};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, trace, warn};

/// The operations every bus offers.
///
/// Sufficient for building adapters (listener scanning, stream bridges) on top
/// of any implementation.
pub trait EventBus: Send + Sync {
    /// The type every subscriber's declared type must descend from, if any.
    fn root_type(&self) -> Option<EventType>;

    /// Registers `subscriber` under its declared type.
    ///
    /// Returns `Ok(false)` when an equal subscriber is already registered.
    fn register(&self, subscriber: &Subscriber) -> Result<bool, BusError>;

    /// Unregisters the subscriber equal to `subscriber`.
    fn unregister(&self, subscriber: &Subscriber) -> bool;

    /// Unregisters every subscriber matching `predicate`; returns the count.
    ///
    /// The predicate may call back into the bus.
    fn unregister_matching(&self, predicate: &dyn Fn(&Subscriber) -> bool) -> usize;

    /// Unregisters every subscriber.
    fn unregister_all(&self);

    /// Delivers `event` to every applicable subscriber.
    fn post(&self, event: &dyn AnyEvent) -> PostResult;

    /// Whether posting an event of type `ty` would reach any subscriber.
    fn has_subscribers(&self, ty: EventType) -> bool;

    /// Copy of the declared-type → subscribers mapping.
    fn subscribers(&self) -> SubscriberSnapshot;
}

/// Typed conveniences over any [`EventBus`].
pub trait EventBusExt: EventBus {
    /// Registers a closure for events of type `T` with default settings.
    fn subscribe<T, F>(&self, handler: F) -> Result<Subscriber, BusError>
    where
        T: Event,
        F: Fn(&T) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        let subscriber = Subscriber::on::<T, F>(handler);
        self.register(&subscriber)?;
        Ok(subscriber)
    }

    /// Whether posting a `T` would reach any subscriber.
    fn has_subscribers_for<T: Event>(&self) -> bool {
        self.has_subscribers(EventType::of::<T>())
    }

    /// Unregisters everything attributed to `owner`.
    fn unregister_owner(&self, owner: OwnerId) -> usize {
        self.unregister_matching(&|subscriber: &Subscriber| subscriber.owner() == owner)
    }
}

impl<B: EventBus + ?Sized> EventBusExt for B {}

/// Reference [`EventBus`] implementation.
pub struct SimpleEventBus {
    registry: SubscriberRegistry,
    root: Option<EventType>,
    config: BusConfig,
}

impl SimpleEventBus {
    /// Create a bus with default configuration and no root type.
    #[must_use]
    pub fn new() -> Self {
        Self::from_valid_config(BusConfig::default())
    }

    /// Create a bus from `config`, rejecting it if it does not validate.
    pub fn with_config(config: BusConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: BusConfig) -> Self {
        Self {
            registry: SubscriberRegistry::with_capacity(config.cache_capacity),
            root: None,
            config,
        }
    }

    /// Restricts registrations to subtypes of `R`.
    #[must_use]
    pub fn rooted_at<R: Event>(self) -> Self {
        self.with_root(EventType::of::<R>())
    }

    /// Restricts registrations to subtypes of `root`.
    #[must_use]
    pub fn with_root(mut self, root: EventType) -> Self {
        self.root = Some(root);
        self
    }

    #[must_use]
    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// The underlying registry, for inspection.
    #[must_use]
    pub fn registry(&self) -> &SubscriberRegistry {
        &self.registry
    }

    fn invoke(&self, subscriber: &Subscriber, event: &dyn AnyEvent) -> Result<(), HandlerError> {
        if !self.config.catch_panics {
            return subscriber.invoke(event);
        }
        match catch_unwind(AssertUnwindSafe(|| subscriber.invoke(event))) {
            Ok(outcome) => outcome,
            Err(payload) => Err(SubscriberPanic {
                message: panic_message(payload.as_ref()),
            }
            .into()),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl Default for SimpleEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus for SimpleEventBus {
    fn root_type(&self) -> Option<EventType> {
        self.root
    }

    fn register(&self, subscriber: &Subscriber) -> Result<bool, BusError> {
        let declared = subscriber.declared_type();
        if let Some(root) = self.root {
            if !is_subtype(declared, root) {
                return Err(BusError::NotAssignable {
                    event: declared.name(),
                    root: root.name(),
                });
            }
        }
        Ok(self.registry.register(subscriber.clone()))
    }

    fn unregister(&self, subscriber: &Subscriber) -> bool {
        self.registry.unregister(subscriber)
    }

    fn unregister_matching(&self, predicate: &dyn Fn(&Subscriber) -> bool) -> usize {
        self.registry.unregister_matching(predicate)
    }

    fn unregister_all(&self) {
        self.registry.unregister_all();
    }

    fn post(&self, event: &dyn AnyEvent) -> PostResult {
        let concrete = event.event_type();
        let subscribers = self.registry.lookup(concrete);
        let tag = event.type_tag();

        trace!(
            bus = %self.config.name,
            event = %concrete,
            subscribers = subscribers.len(),
            "Posting event"
        );

        let mut failures = Vec::new();
        for subscriber in subscribers.iter() {
            if !subscriber.consume_cancelled_events() && event.is_cancelled() {
                trace!(event = %concrete, "Skipping subscriber for cancelled event");
                continue;
            }
            if let (Some(expected), Some(actual)) = (subscriber.generic_type(), tag) {
                if expected != actual {
                    trace!(
                        event = %concrete,
                        expected = expected.name(),
                        actual = actual.name(),
                        "Skipping subscriber for generic mismatch"
                    );
                    continue;
                }
            }

            if let Err(error) = self.invoke(subscriber, event) {
                if self.config.log_failures {
                    warn!(
                        bus = %self.config.name,
                        event = %concrete,
                        order = %subscriber.post_order(),
                        error = %error,
                        "Subscriber failed"
                    );
                }
                failures.push(SubscriberFailure::new(subscriber.clone(), error));
            }
        }

        if !failures.is_empty() {
            debug!(
                bus = %self.config.name,
                event = %concrete,
                failures = failures.len(),
                "Post completed with failures"
            );
        }
        PostResult::from_failures(failures)
    }

    fn has_subscribers(&self, ty: EventType) -> bool {
        self.registry.has_subscribers(ty)
    }

    fn subscribers(&self) -> SubscriberSnapshot {
        self.registry.snapshot()
    }
}

//! # Method Subscription Adapter
//!
//! Registers a listener instance's handler methods on a bus.
//!
//! ```text
//! register(&listener)
//!   └─► for each L::handlers()
//!         ├─ name already declared? ─── yes ─► collect, next
//!         ├─ scanner.should_register? ── no ──► skip
//!         ├─ factory.create ─────────── Err ──► log, collect, next
//!         └─ bus.register(subscriber) ─ Err ──► log, collect, next
//! ```
//!
//! Every subscriber is owned by the listener instance (`OwnerId::of`) and
//! identified by the method name, so registering the same instance twice does
//! not duplicate anything and `unregister` removes exactly that instance's
//! handlers.

use crate::error::{BindError, CandidateError, FailedHandler, RegistrationError};
use crate::factory::{DirectExecutorFactory, ExecutorFactory};
use crate::method::Listener;
use crate::scanner::{DefaultMethodScanner, MethodScanner};
use relay_core::{EventBus, EventBusExt, ExecutorId, OwnerId, Subscriber};
use std::any::type_name;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, trace};

/// Registers and unregisters listener instances on a bus.
pub struct MethodSubscriptionAdapter<B: ?Sized, F = DirectExecutorFactory, S = DefaultMethodScanner> {
    bus: Arc<B>,
    factory: F,
    scanner: S,
}

impl<B, F> MethodSubscriptionAdapter<B, F, DefaultMethodScanner>
where
    B: EventBus + ?Sized,
    F: ExecutorFactory,
{
    /// Adapter using the default scanner.
    pub fn new(bus: Arc<B>, factory: F) -> Self {
        Self::with_scanner(bus, factory, DefaultMethodScanner)
    }
}

impl<B, F, S> MethodSubscriptionAdapter<B, F, S>
where
    B: EventBus + ?Sized,
    F: ExecutorFactory,
    S: MethodScanner,
{
    pub fn with_scanner(bus: Arc<B>, factory: F, scanner: S) -> Self {
        Self {
            bus,
            factory,
            scanner,
        }
    }

    #[must_use]
    pub fn bus(&self) -> &Arc<B> {
        &self.bus
    }

    #[must_use]
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Registers every accepted handler method of `listener`.
    ///
    /// A handler that cannot be bound or registered does not stop the others;
    /// all such failures are returned together once the rest are registered.
    /// On success, returns how many subscribers were newly added.
    pub fn register<L: Listener>(&self, listener: &Arc<L>) -> Result<usize, RegistrationError> {
        let owner = OwnerId::of(listener);
        let mut registered = 0;
        let mut failures = Vec::new();
        let mut seen = HashSet::new();

        for method in L::handlers() {
            // Handler names identify the binding; only the first declaration counts.
            if !seen.insert(method.name()) {
                let err = BindError::DuplicateHandler {
                    listener: type_name::<L>(),
                    method: method.name(),
                };
                error!(listener = type_name::<L>(), method = method.name(), "Duplicate handler name");
                failures.push(FailedHandler {
                    method: method.name(),
                    error: CandidateError::Bind(err),
                });
                continue;
            }

            if !self.scanner.should_register(&**listener, &method) {
                trace!(method = method.name(), "Handler not accepted by scanner");
                continue;
            }

            let executor = match self.factory.create(listener, &method) {
                Ok(executor) => executor,
                Err(err) => {
                    error!(
                        listener = type_name::<L>(),
                        method = method.name(),
                        error = %err,
                        "Failed to bind handler method"
                    );
                    failures.push(FailedHandler {
                        method: method.name(),
                        error: CandidateError::Bind(err),
                    });
                    continue;
                }
            };

            let mut builder = Subscriber::to_type(method.event_type())
                .order(self.scanner.post_order(&**listener, &method))
                .consume_cancelled(self.scanner.consume_cancelled_events(&**listener, &method))
                .owner(owner);
            if let Some(tag) = method.generic_type() {
                builder = builder.generic(tag);
            }
            let subscriber = builder.build(ExecutorId::method(owner, method.name()), executor);

            match self.bus.register(&subscriber) {
                Ok(true) => registered += 1,
                Ok(false) => {}
                Err(err) => {
                    error!(
                        listener = type_name::<L>(),
                        method = method.name(),
                        error = %err,
                        "Failed to register handler method"
                    );
                    failures.push(FailedHandler {
                        method: method.name(),
                        error: CandidateError::Bus(err),
                    });
                }
            }
        }

        debug!(
            listener = type_name::<L>(),
            registered,
            failed = failures.len(),
            "Listener registered"
        );

        if failures.is_empty() {
            Ok(registered)
        } else {
            Err(RegistrationError {
                listener: type_name::<L>(),
                registered,
                failures,
            })
        }
    }

    /// Removes every subscriber registered for `listener`; returns the count.
    pub fn unregister<L: Listener>(&self, listener: &Arc<L>) -> usize {
        let removed = self.bus.unregister_owner(OwnerId::of(listener));
        debug!(listener = type_name::<L>(), removed, "Listener unregistered");
        removed
    }
}

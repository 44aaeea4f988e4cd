//! # Subscribers
//!
//! A subscriber is an immutable binding of a declared event type, a dispatch
//! priority, a cancellation policy, an optional generic filter and the
//! executor that runs its handler.
//!
//! ## Equality
//!
//! Two subscribers are equal iff their keys are equal: declared type, generic
//! tag, priority, cancellation policy, owner and executor identity. The
//! executor object itself never takes part, which keeps "register the same
//! logical handler twice" well-defined.

use crate::error::HandlerError;
use crate::event::{AnyEvent, Event};
use crate::executor::{EventExecutor, ExecutorId, TypedExecutor};
use crate::hierarchy::{EventType, TypeTag};
use crate::order::PostOrder;
use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use uuid::Uuid;

/// Identity of whatever owns a subscriber, for bulk removal.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(Owner);

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
enum Owner {
    Anonymous(Uuid),
    Instance { type_id: TypeId, addr: usize },
}

impl OwnerId {
    /// A fresh owner identity shared by nothing else.
    #[must_use]
    pub fn anonymous() -> Self {
        Self(Owner::Anonymous(Uuid::new_v4()))
    }

    /// Identity of a shared listener instance.
    ///
    /// Two `Arc`s compare equal here iff they point at the same allocation.
    #[must_use]
    pub fn of<L: 'static>(listener: &Arc<L>) -> Self {
        Self(Owner::Instance {
            type_id: TypeId::of::<L>(),
            addr: Arc::as_ptr(listener) as *const () as usize,
        })
    }
}

impl fmt::Debug for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Owner::Anonymous(id) => write!(f, "anonymous:{id}"),
            Owner::Instance { addr, .. } => write!(f, "instance:{addr:#x}"),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct SubscriberKey {
    declared: EventType,
    generic: Option<TypeTag>,
    order: PostOrder,
    consume_cancelled: bool,
    owner: OwnerId,
    executor: ExecutorId,
}

/// A registered (or registrable) event handler.
///
/// Cheap to clone: clones share the same executor.
#[derive(Clone)]
pub struct Subscriber {
    key: SubscriberKey,
    executor: Arc<dyn EventExecutor>,
}

impl Subscriber {
    /// Subscriber for events of type `T` (and its subtypes) with default
    /// settings: normal priority, cancelled events consumed, no generic filter.
    pub fn on<T, F>(handler: F) -> Self
    where
        T: Event,
        F: Fn(&T) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        Self::to::<T>().handler(handler)
    }

    /// Starts building a subscriber declared for `T`.
    #[must_use]
    pub fn to<T: Event>() -> SubscriberBuilder {
        Self::to_type(EventType::of::<T>())
    }

    /// Starts building a subscriber declared for `declared`.
    #[must_use]
    pub fn to_type(declared: EventType) -> SubscriberBuilder {
        SubscriberBuilder {
            declared,
            generic: None,
            order: PostOrder::Normal,
            consume_cancelled: true,
            owner: None,
        }
    }

    /// The type this subscriber was declared for.
    #[must_use]
    pub fn declared_type(&self) -> EventType {
        self.key.declared
    }

    /// The generic parameter this subscriber filters on, if any.
    #[must_use]
    pub fn generic_type(&self) -> Option<TypeTag> {
        self.key.generic
    }

    #[must_use]
    pub fn post_order(&self) -> PostOrder {
        self.key.order
    }

    /// Whether cancelled events are still delivered to this subscriber.
    #[must_use]
    pub fn consume_cancelled_events(&self) -> bool {
        self.key.consume_cancelled
    }

    #[must_use]
    pub fn owner(&self) -> OwnerId {
        self.key.owner
    }

    #[must_use]
    pub fn executor_id(&self) -> ExecutorId {
        self.key.executor
    }

    /// Runs the handler against `event`.
    pub fn invoke(&self, event: &dyn AnyEvent) -> Result<(), HandlerError> {
        self.executor.invoke(event)
    }
}

impl PartialEq for Subscriber {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Subscriber {}

impl Hash for Subscriber {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("event", &self.key.declared)
            .field("generic", &self.key.generic)
            .field("order", &self.key.order)
            .field("consume_cancelled", &self.key.consume_cancelled)
            .field("owner", &self.key.owner)
            .field("executor", &self.key.executor)
            .finish()
    }
}

/// Builder for [`Subscriber`].
#[derive(Debug, Clone)]
pub struct SubscriberBuilder {
    declared: EventType,
    generic: Option<TypeTag>,
    order: PostOrder,
    consume_cancelled: bool,
    owner: Option<OwnerId>,
}

impl SubscriberBuilder {
    #[must_use]
    pub fn order(mut self, order: PostOrder) -> Self {
        self.order = order;
        self
    }

    #[must_use]
    pub fn consume_cancelled(mut self, consume: bool) -> Self {
        self.consume_cancelled = consume;
        self
    }

    /// Skip this subscriber for events that are cancelled.
    #[must_use]
    pub fn ignore_cancelled(self) -> Self {
        self.consume_cancelled(false)
    }

    /// Only deliver events whose generic tag is `tag`.
    ///
    /// Events that carry no tag are still delivered.
    #[must_use]
    pub fn generic(mut self, tag: TypeTag) -> Self {
        self.generic = Some(tag);
        self
    }

    /// Shorthand for `generic(TypeTag::of::<G>())`.
    #[must_use]
    pub fn generic_of<G: ?Sized + 'static>(self) -> Self {
        self.generic(TypeTag::of::<G>())
    }

    /// Attributes the subscriber to `owner`. Defaults to a fresh anonymous owner.
    #[must_use]
    pub fn owner(mut self, owner: OwnerId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Finishes with a typed closure.
    pub fn handler<T, F>(self, handler: F) -> Subscriber
    where
        T: Event,
        F: Fn(&T) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.build(ExecutorId::unique(), Arc::new(TypedExecutor::new(handler)))
    }

    /// Finishes with a closure over the untyped event.
    ///
    /// Suits marker supertypes, which have no value to view the event as.
    pub fn dyn_handler<F>(self, handler: F) -> Subscriber
    where
        F: Fn(&dyn AnyEvent) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.build(ExecutorId::unique(), Arc::new(handler))
    }

    /// Finishes with an already-constructed executor and its identity.
    pub fn build(self, executor_id: ExecutorId, executor: Arc<dyn EventExecutor>) -> Subscriber {
        Subscriber {
            key: SubscriberKey {
                declared: self.declared,
                generic: self.generic,
                order: self.order,
                consume_cancelled: self.consume_cancelled,
                owner: self.owner.unwrap_or_else(OwnerId::anonymous),
                executor: executor_id,
            },
            executor,
        }
    }
}

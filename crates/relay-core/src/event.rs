//! # Events
//!
//! Defines what producers hand to the bus.
//!
//! - [`Event`] is implemented by every event type and declares its place in
//!   the type hierarchy, its cancellation flag and its reified generic tag.
//! - [`AnyEvent`] is the object-safe view the dispatcher works with. It is
//!   implemented for every `Event`, so `&MyEvent` coerces to `&dyn AnyEvent`.
//!
//! ## Hierarchies
//!
//! ```rust,ignore
//! /// Marker supertype: never constructed, only routed on.
//! enum ChatEvent {}
//! impl Event for ChatEvent {}
//!
//! struct MessageSent { channel: String }
//! impl Event for MessageSent {
//!     fn supertypes() -> Vec<EventType> {
//!         vec![EventType::of::<ChatEvent>()]
//!     }
//! }
//!
//! struct MessageEdited { base: MessageSent, revision: u32 }
//! impl Event for MessageEdited {
//!     fn supertypes() -> Vec<EventType> {
//!         vec![EventType::of::<MessageSent>()]
//!     }
//!     fn upcast(&self, target: TypeId) -> Option<&dyn Any> {
//!         (target == TypeId::of::<MessageSent>()).then_some(&self.base as &dyn Any)
//!     }
//! }
//! ```

use crate::hierarchy::{EventType, TypeTag};
use std::any::{Any, TypeId};
use std::sync::atomic::{AtomicBool, Ordering};

/// A value that can be posted to the bus.
pub trait Event: Any + Send + Sync {
    /// Direct supertypes of this event type.
    ///
    /// Subscribers registered for any of these (or their own supertypes)
    /// receive events of this type.
    fn supertypes() -> Vec<EventType>
    where
        Self: Sized,
    {
        Vec::new()
    }

    /// Projects this event onto one of its direct concrete supertypes.
    ///
    /// Only needed when typed handlers of a parent type must see the parent's
    /// data. Projections onto indirect ancestors are chained automatically.
    fn upcast(&self, target: TypeId) -> Option<&dyn Any> {
        let _ = target;
        None
    }

    /// The cancellation flag, if this event can be cancelled.
    fn as_cancellable(&self) -> Option<&dyn Cancellable> {
        None
    }

    /// The reified generic parameter of this event, if it carries one.
    fn generic_tag(&self) -> Option<TypeTag> {
        None
    }
}

/// Object-safe view of an [`Event`] used by the dispatcher.
pub trait AnyEvent: Send + Sync + 'static {
    /// The concrete runtime type of this event.
    fn event_type(&self) -> EventType;

    /// This event as [`Any`], for downcasting to its concrete type.
    fn as_any(&self) -> &dyn Any;

    /// See [`Event::upcast`].
    fn supertype_ref(&self, target: TypeId) -> Option<&dyn Any>;

    /// See [`Event::as_cancellable`].
    fn cancellation(&self) -> Option<&dyn Cancellable>;

    /// See [`Event::generic_tag`].
    fn type_tag(&self) -> Option<TypeTag>;
}

impl<T: Event> AnyEvent for T {
    fn event_type(&self) -> EventType {
        EventType::of::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn supertype_ref(&self, target: TypeId) -> Option<&dyn Any> {
        self.upcast(target)
    }

    fn cancellation(&self) -> Option<&dyn Cancellable> {
        self.as_cancellable()
    }

    fn type_tag(&self) -> Option<TypeTag> {
        self.generic_tag()
    }
}

impl dyn AnyEvent {
    /// Views this event as `T`.
    ///
    /// Succeeds when `T` is the concrete type, or a concrete ancestor reachable
    /// through a chain of [`Event::upcast`] projections.
    pub fn view<T: Event>(&self) -> Option<&T> {
        if let Some(event) = self.as_any().downcast_ref::<T>() {
            return Some(event);
        }

        let target = TypeId::of::<T>();
        let mut pending: Vec<&dyn AnyEvent> = vec![self];
        while let Some(current) = pending.pop() {
            for parent in current.event_type().parents() {
                let Some(projected) = current.supertype_ref(parent.id()) else {
                    continue;
                };
                if parent.id() == target {
                    return projected.downcast_ref::<T>();
                }
                if let Some(next) = parent.erase(projected) {
                    pending.push(next);
                }
            }
        }
        None
    }

    /// Whether this event exposes a cancellation flag that is currently set.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation().is_some_and(Cancellable::is_cancelled)
    }
}

/// An event that subscribers may flag as cancelled.
///
/// The flag is business state: cancelled events are still dispatched, but
/// subscribers that opted out of cancelled events are skipped.
pub trait Cancellable: Send + Sync {
    /// Whether the event is currently cancelled.
    fn is_cancelled(&self) -> bool;

    /// Sets or clears the cancelled flag.
    fn set_cancelled(&self, cancelled: bool);
}

/// Ready-made cancellation flag for events to embed.
///
/// Interior-mutable so handlers, which only see `&Event`, can flip it.
#[derive(Debug, Default)]
pub struct Cancellation {
    cancelled: AtomicBool,
}

impl Cancellation {
    /// A flag that starts out not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Cancellable for Cancellation {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    fn set_cancelled(&self, cancelled: bool) {
        self.cancelled.store(cancelled, Ordering::Release);
    }
}

impl Clone for Cancellation {
    fn clone(&self) -> Self {
        Self {
            cancelled: AtomicBool::new(self.is_cancelled()),
        }
    }
}

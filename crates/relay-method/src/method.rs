//! # Handler Methods
//!
//! A listener describes its handlers as a list of [`HandlerMethod`]s: one per
//! method that could receive events. Each descriptor carries the markers a
//! [`MethodScanner`](crate::MethodScanner) reads to decide whether and how to
//! register it.
//!
//! ```rust,ignore
//! struct Audit { seen: AtomicUsize }
//!
//! impl Listener for Audit {
//!     fn handlers() -> Vec<HandlerMethod<Self>> {
//!         vec![
//!             HandlerMethod::new("on_login", Audit::on_login)
//!                 .subscribe(PostOrder::Early),
//!             HandlerMethod::new("on_logout", Audit::on_logout)
//!                 .subscribe(PostOrder::Normal)
//!                 .ignore_cancelled(),
//!             // Not a subscriber: no `subscribe` marker.
//!             HandlerMethod::new("replay", Audit::replay),
//!         ]
//!     }
//! }
//! ```

use relay_core::{AnyEvent, Event, EventType, EventViewError, HandlerError, PostOrder, TypeTag};
use std::fmt;
use std::sync::Arc;

/// The erased body of a handler method: listener plus untyped event.
pub type MethodThunk<L> =
    Arc<dyn Fn(&L, &dyn AnyEvent) -> Result<(), HandlerError> + Send + Sync>;

/// A type whose instances expose handler methods.
pub trait Listener: Send + Sync + 'static {
    /// Every handler method this listener type declares.
    fn handlers() -> Vec<HandlerMethod<Self>>
    where
        Self: Sized;
}

/// Descriptor of one handler method on listener type `L`.
pub struct HandlerMethod<L> {
    name: &'static str,
    event: EventType,
    generic: Option<TypeTag>,
    subscribe: Option<PostOrder>,
    ignore_cancelled: bool,
    marks: Vec<&'static str>,
    thunk: MethodThunk<L>,
}

impl<L: 'static> HandlerMethod<L> {
    /// Descriptor for a method taking events of type `T`.
    ///
    /// The event is viewed as `T` on every invocation; an event that does not
    /// project onto `T` fails with [`EventViewError`].
    pub fn new<T, F>(name: &'static str, body: F) -> Self
    where
        T: Event,
        F: Fn(&L, &T) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        let thunk: MethodThunk<L> = Arc::new(move |listener: &L, event: &dyn AnyEvent| {
            let Some(typed) = event.view::<T>() else {
                return Err(EventViewError {
                    expected: std::any::type_name::<T>(),
                    actual: event.event_type().name(),
                }
                .into());
            };
            body(listener, typed)
        });
        Self::erased(name, EventType::of::<T>(), thunk)
    }

    /// Descriptor for a method declared on `event` that takes the untyped event.
    ///
    /// Used for marker supertypes, which have no value to view the event as.
    pub fn erased(name: &'static str, event: EventType, thunk: MethodThunk<L>) -> Self {
        Self {
            name,
            event,
            generic: None,
            subscribe: None,
            ignore_cancelled: false,
            marks: Vec::new(),
            thunk,
        }
    }

    /// Marks the method as a subscriber dispatched at `order`.
    #[must_use]
    pub fn subscribe(mut self, order: PostOrder) -> Self {
        self.subscribe = Some(order);
        self
    }

    /// Marks the method as not wanting cancelled events.
    #[must_use]
    pub fn ignore_cancelled(mut self) -> Self {
        self.ignore_cancelled = true;
        self
    }

    /// Restricts the method to events whose generic tag is `tag`.
    #[must_use]
    pub fn generic(mut self, tag: TypeTag) -> Self {
        self.generic = Some(tag);
        self
    }

    #[must_use]
    pub fn generic_of<G: ?Sized + 'static>(self) -> Self {
        self.generic(TypeTag::of::<G>())
    }

    /// Attaches a free-form marker for custom scanners.
    #[must_use]
    pub fn mark(mut self, mark: &'static str) -> Self {
        self.marks.push(mark);
        self
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The event type the method's parameter declares.
    #[must_use]
    pub fn event_type(&self) -> EventType {
        self.event
    }

    #[must_use]
    pub fn generic_type(&self) -> Option<TypeTag> {
        self.generic
    }

    /// The `subscribe` marker, if present.
    #[must_use]
    pub fn subscribe_order(&self) -> Option<PostOrder> {
        self.subscribe
    }

    #[must_use]
    pub fn is_ignore_cancelled(&self) -> bool {
        self.ignore_cancelled
    }

    #[must_use]
    pub fn has_mark(&self, mark: &str) -> bool {
        self.marks.iter().any(|m| *m == mark)
    }

    /// The erased handler body.
    #[must_use]
    pub fn thunk(&self) -> &MethodThunk<L> {
        &self.thunk
    }
}

impl<L> Clone for HandlerMethod<L> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            event: self.event,
            generic: self.generic,
            subscribe: self.subscribe,
            ignore_cancelled: self.ignore_cancelled,
            marks: self.marks.clone(),
            thunk: Arc::clone(&self.thunk),
        }
    }
}

impl<L> fmt::Debug for HandlerMethod<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerMethod")
            .field("name", &self.name)
            .field("event", &self.event)
            .field("generic", &self.generic)
            .field("subscribe", &self.subscribe)
            .field("ignore_cancelled", &self.ignore_cancelled)
            .field("marks", &self.marks)
            .finish_non_exhaustive()
    }
}

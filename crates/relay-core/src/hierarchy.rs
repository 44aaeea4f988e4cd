//! # Type Hierarchy
//!
//! Runtime type tokens for events and the resolver that expands a concrete
//! event type into every type it can be delivered as.
//!
//! Rust has no class inheritance, so event types declare their direct parents
//! through [`Event::supertypes`]. The resolver walks those edges breadth-first
//! and memoizes the result per type for the lifetime of the process: a type's
//! ancestry is fixed at compile time and never needs eviction.

use crate::event::{AnyEvent, Event};
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

/// Runtime token for an event type.
///
/// Equality and hashing use the underlying [`TypeId`] only.
#[derive(Clone, Copy)]
pub struct EventType {
    id: TypeId,
    name: &'static str,
    parents: fn() -> Vec<EventType>,
    erase: fn(&dyn Any) -> Option<&dyn AnyEvent>,
}

fn erase<T: Event>(value: &dyn Any) -> Option<&dyn AnyEvent> {
    value.downcast_ref::<T>().map(|event| event as &dyn AnyEvent)
}

impl EventType {
    /// Token for the event type `T`.
    #[must_use]
    pub fn of<T: Event>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            parents: T::supertypes,
            erase: erase::<T>,
        }
    }

    /// The [`TypeId`] backing this token.
    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name, for diagnostics only.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Direct supertypes declared by the type.
    #[must_use]
    pub fn parents(&self) -> Vec<EventType> {
        (self.parents)()
    }

    /// Every type this type can be delivered as, itself first.
    #[must_use]
    pub fn ancestors(&self) -> Arc<[EventType]> {
        ancestors_of(*self)
    }

    /// Whether an event of this type is routed to subscribers of `other`.
    #[must_use]
    pub fn is_subtype_of(&self, other: EventType) -> bool {
        is_subtype(*self, other)
    }

    /// Re-types a projected value of this type as an event.
    pub(crate) fn erase<'a>(&self, value: &'a dyn Any) -> Option<&'a dyn AnyEvent> {
        (self.erase)(value)
    }
}

impl PartialEq for EventType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventType {}

impl Hash for EventType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Comparable descriptor for the logical generic parameter of an event.
///
/// Carried explicitly by events whose runtime type alone cannot tell
/// `Envelope<Foo>` apart from `Envelope<Bar>`. Compared by value.
#[derive(Clone, Copy)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    /// Tag for the type `T`.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Fully qualified type name, for diagnostics only.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeTag({})", self.name)
    }
}

fn resolved() -> &'static RwLock<HashMap<EventType, Arc<[EventType]>>> {
    static RESOLVED: OnceLock<RwLock<HashMap<EventType, Arc<[EventType]>>>> = OnceLock::new();
    RESOLVED.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Resolves `ty` to itself plus every transitive supertype, each exactly once.
///
/// Breadth-first from `ty`, so nearer ancestors come first. Cyclic declarations
/// cannot occur in a well-formed hierarchy and are not defended against.
#[must_use]
pub fn ancestors_of(ty: EventType) -> Arc<[EventType]> {
    if let Some(hit) = resolved().read().get(&ty) {
        return Arc::clone(hit);
    }

    let mut types = vec![ty];
    let mut next = 0;
    while next < types.len() {
        for parent in types[next].parents() {
            if !types.contains(&parent) {
                types.push(parent);
            }
        }
        next += 1;
    }

    let types: Arc<[EventType]> = types.into();
    Arc::clone(resolved().write().entry(ty).or_insert(types))
}

/// Whether `sub` is `sup` or declares it as a transitive supertype.
#[must_use]
pub fn is_subtype(sub: EventType, sup: EventType) -> bool {
    sub == sup || ancestors_of(sub).contains(&sup)
}

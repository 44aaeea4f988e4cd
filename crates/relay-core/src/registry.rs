//! # Subscriber Registry
//!
//! Owns the raw mapping from declared type to subscribers, plus a derived
//! cache from concrete event type to the priority-ordered list of every
//! subscriber that applies to it.
//!
//! ## Invalidation
//!
//! Every mutation invalidates the whole cache under the same lock that guards
//! the raw mapping. Registrations are rare next to lookups, so recomputing a
//! handful of entries beats tracking which concrete types a change touches.
//!
//! ```text
//! register / unregister*          lookup(concrete)
//!        │                               │
//!        ▼                               ▼
//! ┌──────────────┐  generation++  ┌──────────────┐  miss  ┌───────────────┐
//! │ raw (Mutex)  │ ─────────────▶ │ cache (RwLock)│ ─────▶ │ ancestors_of  │
//! │ type → [sub] │ ◀───────────── │ type → Arc<[]>│ ◀───── │ + stable sort │
//! └──────────────┘  snapshot read └──────────────┘ insert └───────────────┘
//! ```
//!
//! Lookups hand out `Arc<[Subscriber]>` snapshots: a dispatch that already
//! holds one keeps it even if a subscriber is removed mid-flight.

use crate::hierarchy::{ancestors_of, EventType};
use crate::subscriber::Subscriber;
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Owned copy of the raw declared-type mapping.
pub type SubscriberSnapshot = HashMap<EventType, Vec<Subscriber>>;

#[derive(Default)]
struct RawIndex {
    /// Declared type → subscribers, set semantics, insertion order kept.
    by_type: HashMap<EventType, Vec<Subscriber>>,
    /// Bumped on every invalidation.
    generation: u64,
}

struct Resolved {
    generation: u64,
    by_concrete: HashMap<EventType, Arc<[Subscriber]>>,
}

/// Registry of subscribers with a lazily computed dispatch cache.
pub struct SubscriberRegistry {
    raw: Mutex<RawIndex>,
    cache: RwLock<Resolved>,
}

impl SubscriberRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(crate::config::DEFAULT_CACHE_CAPACITY)
    }

    /// Create an empty registry whose cache starts with room for `capacity`
    /// concrete types.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            raw: Mutex::new(RawIndex::default()),
            cache: RwLock::new(Resolved {
                generation: 0,
                by_concrete: HashMap::with_capacity(capacity),
            }),
        }
    }

    /// Adds `subscriber` under its declared type.
    ///
    /// Returns `false` if an equal subscriber was already present; the cache
    /// is invalidated either way.
    pub fn register(&self, subscriber: Subscriber) -> bool {
        let mut raw = self.raw.lock();
        let declared = subscriber.declared_type();
        let entries = raw.by_type.entry(declared).or_default();
        let inserted = if entries.contains(&subscriber) {
            false
        } else {
            entries.push(subscriber);
            true
        };
        self.invalidate(&mut raw);

        debug!(event = %declared, inserted, "Subscriber registered");
        inserted
    }

    /// Removes the subscriber equal to `subscriber`, if present.
    pub fn unregister(&self, subscriber: &Subscriber) -> bool {
        self.unregister_matching(|candidate| candidate == subscriber) > 0
    }

    /// Removes every subscriber matching `predicate`.
    ///
    /// The predicate runs against a snapshot with no lock held, so it may call
    /// back into the registry. Subscribers added while it runs are not
    /// considered. Returns how many were removed; the cache is invalidated iff
    /// any were.
    pub fn unregister_matching<P>(&self, mut predicate: P) -> usize
    where
        P: FnMut(&Subscriber) -> bool,
    {
        let candidates: Vec<Subscriber> = {
            let raw = self.raw.lock();
            raw.by_type.values().flatten().cloned().collect()
        };
        let doomed: HashSet<Subscriber> = candidates
            .into_iter()
            .filter(|subscriber| predicate(subscriber))
            .collect();
        if doomed.is_empty() {
            return 0;
        }

        let mut raw = self.raw.lock();
        let mut removed = 0;
        raw.by_type.retain(|_, entries| {
            let before = entries.len();
            entries.retain(|subscriber| !doomed.contains(subscriber));
            removed += before - entries.len();
            !entries.is_empty()
        });

        if removed > 0 {
            self.invalidate(&mut raw);
            debug!(removed, "Subscribers unregistered");
        }
        removed
    }

    /// Removes every subscriber.
    pub fn unregister_all(&self) {
        let mut raw = self.raw.lock();
        let removed: usize = raw.by_type.values().map(Vec::len).sum();
        raw.by_type.clear();
        self.invalidate(&mut raw);
        debug!(removed, "All subscribers unregistered");
    }

    /// The priority-ordered subscribers applicable to events of `concrete`.
    ///
    /// Gathers the subscribers of every type in `concrete`'s ancestry and
    /// stable-sorts them by [`PostOrder`](crate::PostOrder). Equal priorities
    /// keep a consistent relative order across lookups.
    pub fn lookup(&self, concrete: EventType) -> Arc<[Subscriber]> {
        let cached = self.cache.read().by_concrete.get(&concrete).cloned();
        if let Some(hit) = cached {
            return hit;
        }

        let ancestors = ancestors_of(concrete);
        let (generation, mut applicable) = {
            let raw = self.raw.lock();
            let mut applicable = Vec::new();
            for ty in ancestors.iter() {
                if let Some(entries) = raw.by_type.get(ty) {
                    applicable.extend(entries.iter().cloned());
                }
            }
            (raw.generation, applicable)
        };
        applicable.sort_by_key(Subscriber::post_order);
        let applicable: Arc<[Subscriber]> = applicable.into();

        let mut cache = self.cache.write();
        // A mutation since the snapshot means this list must not be cached,
        // though it is still a valid answer for the caller.
        if cache.generation == generation {
            cache
                .by_concrete
                .insert(concrete, Arc::clone(&applicable));
        }
        debug!(
            event = %concrete,
            subscribers = applicable.len(),
            generation,
            "Dispatch cache entry computed"
        );
        applicable
    }

    /// Whether any subscriber applies to events of `concrete`.
    #[must_use]
    pub fn has_subscribers(&self, concrete: EventType) -> bool {
        !self.lookup(concrete).is_empty()
    }

    /// Copy of the raw declared-type mapping.
    #[must_use]
    pub fn snapshot(&self) -> SubscriberSnapshot {
        self.raw.lock().by_type.clone()
    }

    /// Total number of registered subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.lock().by_type.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.lock().by_type.is_empty()
    }

    /// Number of invalidations so far.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.raw.lock().generation
    }

    /// Number of concrete types currently cached.
    #[must_use]
    pub fn cached_types(&self) -> usize {
        self.cache.read().by_concrete.len()
    }

    fn invalidate(&self, raw: &mut RawIndex) {
        raw.generation += 1;
        let mut cache = self.cache.write();
        cache.generation = raw.generation;
        cache.by_concrete.clear();
    }
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}

//! # Test Fixtures
//!
//! A small game-server event hierarchy shared by the integration scenarios:
//!
//! ```text
//! GameEvent (marker)
//! ├── PlayerEvent { player }
//! │   └── PlayerChat { base, message, cancellation }   (cancellable)
//! ├── Tick(u64)
//! └── Delivery { tag }                                  (generic-tagged)
//!
//! Unrelated                                             (outside the hierarchy)
//! ```

use relay_core::{Cancellable, Cancellation, Event, EventType, TypeTag};
use std::any::{Any, TypeId};
use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

/// Root of every game event. Never constructed.
pub enum GameEvent {}
impl Event for GameEvent {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerEvent {
    pub player: &'static str,
}

impl Event for PlayerEvent {
    fn supertypes() -> Vec<EventType> {
        vec![EventType::of::<GameEvent>()]
    }
}

#[derive(Debug, Clone)]
pub struct PlayerChat {
    pub base: PlayerEvent,
    pub message: String,
    pub cancellation: Cancellation,
}

impl PlayerChat {
    pub fn new(player: &'static str, message: &str) -> Self {
        Self {
            base: PlayerEvent { player },
            message: message.to_string(),
            cancellation: Cancellation::new(),
        }
    }
}

impl Event for PlayerChat {
    fn supertypes() -> Vec<EventType> {
        vec![EventType::of::<PlayerEvent>()]
    }

    fn upcast(&self, target: TypeId) -> Option<&dyn Any> {
        (target == TypeId::of::<PlayerEvent>()).then_some(&self.base as &dyn Any)
    }

    fn as_cancellable(&self) -> Option<&dyn Cancellable> {
        Some(&self.cancellation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick(pub u64);

impl Event for Tick {
    fn supertypes() -> Vec<EventType> {
        vec![EventType::of::<GameEvent>()]
    }
}

/// An item delivered to a player; `tag` names the item's payload type.
#[derive(Debug, Clone, Copy)]
pub struct Delivery {
    pub tag: TypeTag,
}

impl Delivery {
    pub fn of<P: 'static>() -> Self {
        Self {
            tag: TypeTag::of::<P>(),
        }
    }
}

impl Event for Delivery {
    fn supertypes() -> Vec<EventType> {
        vec![EventType::of::<GameEvent>()]
    }

    fn generic_tag(&self) -> Option<TypeTag> {
        Some(self.tag)
    }
}

/// Payload types for [`Delivery`].
pub struct Sword;
pub struct Potion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unrelated;
impl Event for Unrelated {}

static TRACING: Once = Once::new();

/// Installs a test-writer subscriber once per process.
///
/// Honours `RUST_LOG`; defaults to `warn`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

//! # Executor Factories
//!
//! Turn `(listener instance, handler method)` into an
//! [`EventExecutor`](relay_core::EventExecutor).
//!
//! Both strategies are observationally equivalent at dispatch time:
//!
//! | Factory                  | Binding                                   |
//! |--------------------------|-------------------------------------------|
//! | `DirectExecutorFactory`  | the descriptor's thunk, every time        |
//! | `CachingExecutorFactory` | one thunk per `(listener type, method)`   |
//!
//! The caching factory's cache belongs to the factory instance, so separate
//! adapters never share bindings.

use crate::error::BindError;
use crate::method::{HandlerMethod, Listener, MethodThunk};
use parking_lot::Mutex;
use relay_core::{AnyEvent, EventExecutor, EventType};
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Builds the executor that invokes `method` on `listener`.
pub trait ExecutorFactory: Send + Sync {
    fn create<L: Listener>(
        &self,
        listener: &Arc<L>,
        method: &HandlerMethod<L>,
    ) -> Result<Arc<dyn EventExecutor>, BindError>;
}

fn bind<L: Listener>(listener: &Arc<L>, thunk: MethodThunk<L>) -> Arc<dyn EventExecutor> {
    let listener = Arc::clone(listener);
    Arc::new(move |event: &dyn AnyEvent| thunk(&*listener, event))
}

/// Binds each handler's own thunk, with no caching.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectExecutorFactory;

impl ExecutorFactory for DirectExecutorFactory {
    fn create<L: Listener>(
        &self,
        listener: &Arc<L>,
        method: &HandlerMethod<L>,
    ) -> Result<Arc<dyn EventExecutor>, BindError> {
        Ok(bind(listener, Arc::clone(method.thunk())))
    }
}

struct CachedThunk {
    event: EventType,
    /// A `MethodThunk<L>` for the listener type in the key.
    thunk: Box<dyn Any + Send + Sync>,
}

/// Binds one thunk per handler method and reuses it for every instance.
#[derive(Default)]
pub struct CachingExecutorFactory {
    cache: Mutex<HashMap<(TypeId, &'static str), CachedThunk>>,
}

impl CachingExecutorFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handler methods with a cached binding.
    #[must_use]
    pub fn cached_methods(&self) -> usize {
        self.cache.lock().len()
    }
}

impl ExecutorFactory for CachingExecutorFactory {
    fn create<L: Listener>(
        &self,
        listener: &Arc<L>,
        method: &HandlerMethod<L>,
    ) -> Result<Arc<dyn EventExecutor>, BindError> {
        let key = (TypeId::of::<L>(), method.name());
        let declared = method.event_type();

        let mut cache = self.cache.lock();
        let hit = cache.get(&key).map(|cached| {
            (
                cached.event,
                cached.thunk.downcast_ref::<MethodThunk<L>>().cloned(),
            )
        });

        let thunk = match hit {
            Some((cached, _)) if cached != declared => {
                return Err(BindError::ShapeConflict {
                    listener: type_name::<L>(),
                    method: method.name(),
                    cached: cached.name(),
                    declared: declared.name(),
                });
            }
            Some((_, Some(thunk))) => {
                trace!(method = method.name(), "Reusing cached handler binding");
                thunk
            }
            _ => {
                let thunk = Arc::clone(method.thunk());
                cache.insert(
                    key,
                    CachedThunk {
                        event: declared,
                        thunk: Box::new(Arc::clone(&thunk)),
                    },
                );
                debug!(
                    listener = type_name::<L>(),
                    method = method.name(),
                    event = %declared,
                    "Cached handler binding"
                );
                thunk
            }
        };
        drop(cache);

        Ok(bind(listener, thunk))
    }
}

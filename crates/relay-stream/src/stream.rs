//! # Event Streams
//!
//! Bridges the synchronous bus to async consumers.
//!
//! ```text
//! post(&event) ──▶ forwarding subscriber ──clone──▶ unbounded channel ──▶ EventStream<T>
//!                        ▲                                                    │
//!                        └──────────── unregistered on close / drop ◀─────────┘
//! ```
//!
//! ## Lifecycle
//!
//! - Dropping (or [`close`](EventStream::close)-ing) the stream unregisters the
//!   forwarding subscriber, once.
//! - When the bus drops the forwarding subscriber itself (`unregister_all`,
//!   predicate removal), the stream ends after yielding what it buffered.

use relay_core::{
    BusError, Event, EventBus, EventType, ExecutorId, HandlerError, PostOrder, Subscriber,
    TypedExecutor,
};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio_stream::Stream;
use tracing::debug;

/// The receiving end of an event stream is gone.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Event stream closed")]
pub struct StreamClosed;

/// Opens event streams on a shared bus.
pub trait EventStreamExt {
    /// Stream of every `T` (and subtype of `T`) posted from now on, forwarded
    /// at normal priority.
    fn event_stream<T: Event + Clone>(&self) -> Result<EventStream<T>, BusError> {
        self.event_stream_at(PostOrder::Normal)
    }

    /// Like [`event_stream`](Self::event_stream), forwarding at `order`.
    fn event_stream_at<T: Event + Clone>(
        &self,
        order: PostOrder,
    ) -> Result<EventStream<T>, BusError>;
}

impl<B: EventBus + 'static> EventStreamExt for Arc<B> {
    fn event_stream_at<T: Event + Clone>(
        &self,
        order: PostOrder,
    ) -> Result<EventStream<T>, BusError> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let forward = TypedExecutor::new(move |event: &T| -> Result<(), HandlerError> {
            sender.send(event.clone()).map_err(|_| StreamClosed)?;
            Ok(())
        });

        let id = ExecutorId::unique();
        let subscriber = Subscriber::to::<T>()
            .order(order)
            .build(id, Arc::new(forward));
        self.register(&subscriber)?;

        let event = EventType::of::<T>();
        debug!(event = %event, order = %order, "Event stream opened");

        let bus: Arc<dyn EventBus> = Arc::<B>::clone(self);
        Ok(EventStream {
            receiver,
            bus,
            id,
            event,
            registered: true,
        })
    }
}

/// Events of type `T` delivered by a bus.
///
/// Implements [`Stream`] for use with stream combinators.
pub struct EventStream<T> {
    receiver: mpsc::UnboundedReceiver<T>,
    bus: Arc<dyn EventBus>,
    id: ExecutorId,
    event: EventType,
    registered: bool,
}

impl<T> EventStream<T> {
    /// Receive the next event.
    ///
    /// # Returns
    ///
    /// - `Some(event)` - The next event
    /// - `None` - The forwarding subscriber is gone and the buffer is drained
    pub async fn recv(&mut self) -> Option<T> {
        self.receiver.recv().await
    }

    /// Try to receive the next event without waiting.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(event))` - An event was buffered
    /// - `Ok(None)` - Nothing buffered yet
    /// - `Err(StreamClosed)` - The stream has ended
    pub fn try_recv(&mut self) -> Result<Option<T>, StreamClosed> {
        match self.receiver.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(StreamClosed),
        }
    }

    /// Unregisters the forwarding subscriber.
    ///
    /// Events already buffered can still be received. Calling this more than
    /// once has no further effect.
    pub fn close(&mut self) {
        if !self.registered {
            return;
        }
        self.registered = false;

        let id = self.id;
        let removed = self
            .bus
            .unregister_matching(&|subscriber: &Subscriber| subscriber.executor_id() == id);
        debug!(event = %self.event, removed, "Event stream closed");
    }

    /// Whether [`close`](Self::close) has not been called yet.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// The event type this stream was opened for.
    #[must_use]
    pub fn event_type(&self) -> EventType {
        self.event
    }
}

impl<T> Stream for EventStream<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().receiver.poll_recv(cx)
    }
}

impl<T> Drop for EventStream<T> {
    fn drop(&mut self) {
        self.close();
    }
}

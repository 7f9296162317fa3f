//! Change publishing/subscription abstraction (mechanics only).
//!
//! The bus is the notification half of a live query: the store publishes one
//! message per committed write, every registered subscription receives a copy,
//! and each subscriber decides whether the change is relevant to it.
//!
//! ## Delivery
//!
//! - **Broadcast**: each subscription gets every message published after it registered
//! - **Ordered per publisher**: a single publisher's messages arrive in publish order
//! - **No persistence**: the bus is for distribution, not storage
//!
//! Subscriptions are released by dropping them; implementations prune closed
//! registrations lazily.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::error::TryRecvError;

/// A subscription to a change stream.
///
/// ## Usage Pattern
///
/// ```ignore
/// let bus: Arc<dyn EventBus<ChangeEnvelope<ItemChange>>> = ...;
/// let mut subscription = bus.subscribe();
///
/// while let Some(change) = subscription.recv().await {
///     rerun_query_if_relevant(&change).await?;
/// }
/// // `None`: the bus was dropped.
/// ```
///
/// Subscriptions are designed for single-task consumption.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: UnboundedReceiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: UnboundedReceiver<M>) -> Self {
        Self { receiver }
    }

    /// Wait until the next message is available.
    ///
    /// Returns `None` once every publisher handle has been dropped.
    pub async fn recv(&mut self) -> Option<M> {
        self.receiver.recv().await
    }

    /// Try to receive a message without waiting.
    pub fn try_recv(&mut self) -> Result<M, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Drain every message that is already queued, without waiting.
    pub fn drain_ready(&mut self) -> Vec<M> {
        let mut drained = Vec::new();
        while let Ok(message) = self.receiver.try_recv() {
            drained.push(message);
        }
        drained
    }
}

/// Domain-agnostic change bus (pub/sub abstraction).
///
/// ```text
/// write → backend commit → EventBus::publish → Subscription → live query re-run
/// ```
///
/// Changes are **committed first**, then **published**. A failed publish never
/// undoes the write; it only means no subscriber heard about it.
///
/// The trait requires `Send + Sync` so a single bus can be shared by every
/// writer and every live query in the process.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;

    /// Number of live (not yet dropped) subscriptions.
    fn subscriber_count(&self) -> usize;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }

    fn subscriber_count(&self) -> usize {
        (**self).subscriber_count()
    }
}

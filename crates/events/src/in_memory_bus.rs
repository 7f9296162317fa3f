//! In-process change bus.

use std::sync::Mutex;

use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::bus::{EventBus, Subscription};

#[derive(Debug, Error)]
pub enum InMemoryBusError {
    /// Publish failed due to internal lock poisoning.
    #[error("subscriber registry lock poisoned")]
    Poisoned,
}

/// In-memory pub/sub bus.
///
/// - No IO; publishing never waits
/// - Unbounded per-subscriber queues
/// - Closed subscriptions are dropped on the next publish
#[derive(Debug)]
pub struct InMemoryEventBus<M> {
    subscribers: Mutex<Vec<UnboundedSender<M>>>,
}

impl<M> InMemoryEventBus<M> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<M> Default for InMemoryEventBus<M> {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }
}

impl<M> EventBus<M> for InMemoryEventBus<M>
where
    M: Clone + Send + 'static,
{
    type Error = InMemoryBusError;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        let mut subs = self
            .subscribers
            .lock()
            .map_err(|_| InMemoryBusError::Poisoned)?;

        // Drop any dead subscribers while publishing.
        subs.retain(|tx| tx.send(message.clone()).is_ok());

        Ok(())
    }

    fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::unbounded_channel();

        // If the lock is poisoned, we still return a subscription;
        // it just never receives messages.
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }

        Subscription::new(rx)
    }

    fn subscriber_count(&self) -> usize {
        match self.subscribers.lock() {
            Ok(mut subs) => {
                subs.retain(|tx| !tx.is_closed());
                subs.len()
            }
            Err(_) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_subscriber_receives_each_message_in_order() {
        let bus = InMemoryEventBus::<u32>::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.publish(1).unwrap();
        bus.publish(2).unwrap();

        assert_eq!(a.recv().await, Some(1));
        assert_eq!(a.recv().await, Some(2));
        assert_eq!(b.drain_ready(), vec![1, 2]);
    }

    #[tokio::test]
    async fn late_subscribers_miss_earlier_messages() {
        let bus = InMemoryEventBus::<&'static str>::new();
        bus.publish("before").unwrap();

        let mut sub = bus.subscribe();
        assert!(sub.try_recv().is_err());

        bus.publish("after").unwrap();
        assert_eq!(sub.recv().await, Some("after"));
    }

    #[test]
    fn dropped_subscriptions_release_their_registration() {
        let bus = InMemoryEventBus::<u8>::new();
        let keep = bus.subscribe();
        let gone = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        drop(gone);
        assert_eq!(bus.subscriber_count(), 1);

        bus.publish(7).unwrap();
        drop(keep);
        bus.publish(8).unwrap();
        assert_eq!(bus.subscriber_count(), 0);
    }
}

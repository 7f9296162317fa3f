//! The item store: serialized writes, change publication, live reads.
//!
//! ```text
//! insert/update/delete ──► write lane ──► ItemRepository ──► EventBus::publish
//!                                                                   │
//! list_all()/get(id) ◄── LiveQuery (re-run on relevant change) ◄────┘
//! ```
//!
//! ## Ordering
//!
//! Writes run one at a time on the write lane. A change is published while the
//! lane is still held, so subscribers see changes in commit order and every
//! envelope carries the next sequence number.
//!
//! ## Cancellation
//!
//! Each write runs as its own tokio task. Dropping the caller's future does not
//! stop the write: once started it commits and publishes as a unit.

use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::Mutex;
use tracing::{Instrument, debug, instrument, warn};

use itemstore_core::{ChangeId, Entity};
use itemstore_events::{ChangeEnvelope, Event, EventBus, InMemoryEventBus};
use itemstore_inventory::{Item, ItemChange, ItemId};

use crate::error::{StoreError, StoreResult};
use crate::live_query::LiveQuery;
use crate::repository::{InMemoryItemRepository, ItemRepository};

/// Name of the persisted collection; stamped on every change envelope.
pub const ITEMS_TABLE: &str = "items";

/// A committed item change as carried on the bus.
pub type ItemEnvelope = ChangeEnvelope<ItemChange>;

struct Shared {
    repository: Arc<dyn ItemRepository>,
    bus: InMemoryEventBus<ItemEnvelope>,
    /// Guards the commit sequence; holding it is the write lane.
    write_lane: Mutex<u64>,
}

impl Shared {
    async fn insert(self: Arc<Self>, item: Item) -> StoreResult<Option<ItemId>> {
        let mut sequence = self.write_lane.lock().await;
        match self.repository.insert_or_ignore(&item).await? {
            Some(stored) => {
                let id = stored.id();
                self.publish(&mut sequence, ItemChange::inserted(stored));
                debug!(%id, "item inserted");
                Ok(Some(id))
            }
            None => {
                debug!("insert ignored: key already present");
                Ok(None)
            }
        }
    }

    async fn update(self: Arc<Self>, item: Item) -> StoreResult<bool> {
        let mut sequence = self.write_lane.lock().await;
        if self.repository.update(&item).await? == 0 {
            debug!("update matched no row");
            return Ok(false);
        }
        self.publish(&mut sequence, ItemChange::updated(item));
        debug!("item updated");
        Ok(true)
    }

    async fn delete(self: Arc<Self>, id: ItemId) -> StoreResult<bool> {
        let mut sequence = self.write_lane.lock().await;
        if self.repository.delete(id).await? == 0 {
            debug!("delete matched no row");
            return Ok(false);
        }
        self.publish(&mut sequence, ItemChange::deleted(id));
        debug!("item deleted");
        Ok(true)
    }

    fn publish(&self, sequence: &mut u64, change: ItemChange) {
        *sequence += 1;
        let envelope = ChangeEnvelope::new(ChangeId::new(), ITEMS_TABLE, *sequence, change);
        debug!(
            change_id = %envelope.change_id(),
            sequence = *sequence,
            event = envelope.payload().event_type(),
            version = envelope.payload().version(),
            occurred_at = %envelope.payload().occurred_at(),
            "publishing item change"
        );
        if let Err(err) = self.bus.publish(envelope) {
            // The write already committed; only live queries miss this change.
            warn!(?err, sequence = *sequence, "failed to publish item change");
        }
    }
}

/// Process-wide item store.
///
/// Cheap to clone; clones share the backend, the bus and the write lane.
/// Writes require a running tokio runtime.
#[derive(Clone)]
pub struct ItemStore {
    shared: Arc<Shared>,
}

impl core::fmt::Debug for ItemStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ItemStore")
            .field("subscribers", &self.subscriber_count())
            .finish_non_exhaustive()
    }
}

impl ItemStore {
    pub fn new(repository: Arc<dyn ItemRepository>) -> Self {
        Self {
            shared: Arc::new(Shared {
                repository,
                bus: InMemoryEventBus::new(),
                write_lane: Mutex::new(0),
            }),
        }
    }

    /// Store backed by a fresh in-memory table.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryItemRepository::new()))
    }

    /// Every item, sorted by name, re-delivered after each committed write.
    pub fn list_all(&self) -> LiveQuery<Vec<Item>> {
        let subscription = self.shared.bus.subscribe();
        let repository = self.shared.repository.clone();

        LiveQuery::watch(
            subscription,
            |_change| true,
            move || {
                let repository = repository.clone();
                async move { repository.list_by_name().await.map(Some) }.boxed()
            },
        )
    }

    /// The item keyed by `id`, re-delivered whenever that row changes.
    ///
    /// Emits nothing while no such row exists.
    pub fn get(&self, id: impl Into<ItemId>) -> LiveQuery<Item> {
        let id = id.into();
        let subscription = self.shared.bus.subscribe();
        let repository = self.shared.repository.clone();

        LiveQuery::watch(
            subscription,
            move |change| change.item_id() == id,
            move || {
                let repository = repository.clone();
                async move { repository.find(id).await }.boxed()
            },
        )
    }

    /// One-shot read of the current name-sorted listing.
    pub async fn snapshot(&self) -> StoreResult<Vec<Item>> {
        self.shared.repository.list_by_name().await
    }

    /// One-shot read of a single item.
    pub async fn find(&self, id: impl Into<ItemId>) -> StoreResult<Option<Item>> {
        self.shared.repository.find(id.into()).await
    }

    /// Insert-or-ignore.
    ///
    /// Returns the key of the written row, or `None` when a row with the same
    /// key already existed (that row is left untouched and nobody is notified).
    #[instrument(skip(self, item), fields(item_id = %item.id))]
    pub async fn insert(&self, item: &Item) -> StoreResult<Option<ItemId>> {
        item.validate()?;
        self.run_write(self.shared.clone().insert(item.clone()))
            .await
    }

    /// Replace the stored row keyed by `item.id` with `item`.
    ///
    /// Returns `true` if a row was replaced; a missing row is a silent no-op.
    #[instrument(skip(self, item), fields(item_id = %item.id))]
    pub async fn update(&self, item: &Item) -> StoreResult<bool> {
        item.validate()?;
        self.run_write(self.shared.clone().update(item.clone()))
            .await
    }

    /// Remove the row keyed by `item.id`. Returns `true` if a row was removed.
    pub async fn delete(&self, item: &Item) -> StoreResult<bool> {
        self.delete_by_id(item.id()).await
    }

    #[instrument(skip(self))]
    pub async fn delete_by_id(&self, id: ItemId) -> StoreResult<bool> {
        self.run_write(self.shared.clone().delete(id)).await
    }

    /// Number of live queries currently registered.
    pub fn subscriber_count(&self) -> usize {
        self.shared.bus.subscriber_count()
    }

    async fn run_write<T, Fut>(&self, write: Fut) -> StoreResult<T>
    where
        Fut: Future<Output = StoreResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let task = tokio::spawn(write.in_current_span());
        task.await
            .map_err(|err| StoreError::WriteAborted(err.to_string()))?
    }
}

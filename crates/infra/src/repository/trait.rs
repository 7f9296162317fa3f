use std::sync::Arc;

use async_trait::async_trait;

use itemstore_inventory::{Item, ItemId};

use crate::error::StoreResult;

/// Statement-level access to the `items` table.
///
/// Each method is one atomic operation against the backend. Implementations
/// do not notify anyone; change publication is the job of
/// [`ItemStore`](crate::item_store::ItemStore), which serializes writes.
///
/// ## Identifier policy
///
/// An item carrying [`ItemId::UNASSIGNED`] gets the next key the backend
/// hands out. Keys are never reused, even after the highest row is deleted.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// `SELECT * FROM items ORDER BY name ASC` (ties broken by id).
    async fn list_by_name(&self) -> StoreResult<Vec<Item>>;

    /// `SELECT * FROM items WHERE id = ?`.
    async fn find(&self, id: ItemId) -> StoreResult<Option<Item>>;

    /// Insert-or-ignore.
    ///
    /// Returns the stored row (with its assigned key) when a row was written,
    /// `None` when an existing row with the same key made this a no-op.
    async fn insert_or_ignore(&self, item: &Item) -> StoreResult<Option<Item>>;

    /// Replace every column of the row keyed by `item.id`. Returns rows affected.
    async fn update(&self, item: &Item) -> StoreResult<u64>;

    /// Remove the row keyed by `id`. Returns rows affected.
    async fn delete(&self, id: ItemId) -> StoreResult<u64>;
}

#[async_trait]
impl<R> ItemRepository for Arc<R>
where
    R: ItemRepository + ?Sized,
{
    async fn list_by_name(&self) -> StoreResult<Vec<Item>> {
        (**self).list_by_name().await
    }

    async fn find(&self, id: ItemId) -> StoreResult<Option<Item>> {
        (**self).find(id).await
    }

    async fn insert_or_ignore(&self, item: &Item) -> StoreResult<Option<Item>> {
        (**self).insert_or_ignore(item).await
    }

    async fn update(&self, item: &Item) -> StoreResult<u64> {
        (**self).update(item).await
    }

    async fn delete(&self, id: ItemId) -> StoreResult<u64> {
        (**self).delete(id).await
    }
}

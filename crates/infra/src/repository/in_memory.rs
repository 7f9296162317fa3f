use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use itemstore_core::Entity;
use itemstore_inventory::{Item, ItemId};

use super::r#trait::ItemRepository;
use crate::error::{StoreError, StoreResult};

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<ItemId, Item>,
    /// Largest key ever written; auto-assigned keys continue from here.
    high_water: i64,
}

/// In-memory `items` table.
///
/// Intended for tests/dev and for consumers that do not need durability.
/// Locks are held only for the map operation itself, never across an await.
#[derive(Debug, Default)]
pub struct InMemoryItemRepository {
    table: RwLock<Table>,
}

impl InMemoryItemRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItemRepository for InMemoryItemRepository {
    async fn list_by_name(&self) -> StoreResult<Vec<Item>> {
        let table = self.table.read().map_err(|_| StoreError::Poisoned)?;
        let mut items: Vec<Item> = table.rows.values().cloned().collect();
        items.sort_by(Item::cmp_by_name);
        Ok(items)
    }

    async fn find(&self, id: ItemId) -> StoreResult<Option<Item>> {
        let table = self.table.read().map_err(|_| StoreError::Poisoned)?;
        Ok(table.rows.get(&id).cloned())
    }

    async fn insert_or_ignore(&self, item: &Item) -> StoreResult<Option<Item>> {
        let mut table = self.table.write().map_err(|_| StoreError::Poisoned)?;

        let id = if item.id().is_assigned() {
            item.id()
        } else {
            let next = table
                .high_water
                .checked_add(1)
                .ok_or(StoreError::KeySpaceExhausted)?;
            ItemId::from(next)
        };

        if table.rows.contains_key(&id) {
            return Ok(None);
        }

        let stored = item.clone().with_id(id);
        table.high_water = table.high_water.max(id.get());
        table.rows.insert(id, stored.clone());
        Ok(Some(stored))
    }

    async fn update(&self, item: &Item) -> StoreResult<u64> {
        let mut table = self.table.write().map_err(|_| StoreError::Poisoned)?;
        match table.rows.get_mut(&item.id()) {
            Some(row) => {
                *row = item.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: ItemId) -> StoreResult<u64> {
        let mut table = self.table.write().map_err(|_| StoreError::Poisoned)?;
        Ok(u64::from(table.rows.remove(&id).is_some()))
    }
}

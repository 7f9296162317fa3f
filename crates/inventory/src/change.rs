use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use itemstore_events::Event;

use crate::item::{Item, ItemId};

/// Event: ItemInserted (a row was written; ignored inserts emit nothing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemInserted {
    pub item: Item,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemUpdated (full-record replace of an existing row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemUpdated {
    pub item: Item,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemDeleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDeleted {
    pub item_id: ItemId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemChange {
    Inserted(ItemInserted),
    Updated(ItemUpdated),
    Deleted(ItemDeleted),
}

impl ItemChange {
    pub fn inserted(item: Item) -> Self {
        Self::Inserted(ItemInserted {
            item,
            occurred_at: Utc::now(),
        })
    }

    pub fn updated(item: Item) -> Self {
        Self::Updated(ItemUpdated {
            item,
            occurred_at: Utc::now(),
        })
    }

    pub fn deleted(item_id: ItemId) -> Self {
        Self::Deleted(ItemDeleted {
            item_id,
            occurred_at: Utc::now(),
        })
    }

    /// The record this change touched.
    pub fn item_id(&self) -> ItemId {
        match self {
            ItemChange::Inserted(e) => e.item.id,
            ItemChange::Updated(e) => e.item.id,
            ItemChange::Deleted(e) => e.item_id,
        }
    }
}

impl Event for ItemChange {
    fn event_type(&self) -> &'static str {
        match self {
            ItemChange::Inserted(_) => "inventory.item.inserted",
            ItemChange::Updated(_) => "inventory.item.updated",
            ItemChange::Deleted(_) => "inventory.item.deleted",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ItemChange::Inserted(e) => e.occurred_at,
            ItemChange::Updated(e) => e.occurred_at,
            ItemChange::Deleted(e) => e.occurred_at,
        }
    }
}

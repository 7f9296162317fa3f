use serde::{Deserialize, Serialize};

use itemstore_core::{DomainError, DomainResult, Entity, RecordId};

/// Inventory item identifier (integer primary key of the `items` table).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub RecordId);

impl ItemId {
    /// Ask the store to assign the key on insert.
    pub const UNASSIGNED: ItemId = ItemId(RecordId::UNASSIGNED);

    pub fn new(id: RecordId) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0.get()
    }

    pub fn is_assigned(self) -> bool {
        self.0.is_assigned()
    }
}

impl From<i64> for ItemId {
    fn from(value: i64) -> Self {
        Self(RecordId::new(value))
    }
}

impl From<i32> for ItemId {
    fn from(value: i32) -> Self {
        Self(RecordId::new(i64::from(value)))
    }
}

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// An inventory record.
///
/// Callers hold transient copies; the store owns the persisted state. An
/// `update` replaces every field of the stored record with these values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub price: f64,
    pub quantity: i32,
}

impl Item {
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>, quantity: i32, price: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            quantity,
        }
    }

    /// An item whose key the store assigns on insert.
    pub fn unsaved(name: impl Into<String>, quantity: i32, price: f64) -> Self {
        Self::new(ItemId::UNASSIGNED, name, quantity, price)
    }

    /// Copy of this item carrying `id`.
    pub fn with_id(mut self, id: impl Into<ItemId>) -> Self {
        self.id = id.into();
        self
    }

    /// Check the record-level rules a store enforces before writing.
    pub fn validate(&self) -> DomainResult<()> {
        if self.id.get() < 0 {
            return Err(DomainError::invalid_id("item id cannot be negative"));
        }
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if self.quantity < 0 {
            return Err(DomainError::validation("quantity cannot be negative"));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(DomainError::validation(
                "price must be a finite, non-negative number",
            ));
        }
        Ok(())
    }

    /// Ordering used by name-sorted listings: name, then id for equal names.
    pub fn cmp_by_name(&self, other: &Self) -> core::cmp::Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> ItemId {
        self.id
    }
}

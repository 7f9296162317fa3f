//! Inventory domain module.
//!
//! The `Item` record, its validation rules and the change events a store
//! emits when items are written. Pure domain logic (no IO, no storage).

pub mod change;
pub mod item;

pub use change::{ItemChange, ItemDeleted, ItemInserted, ItemUpdated};
pub use item::{Item, ItemId};

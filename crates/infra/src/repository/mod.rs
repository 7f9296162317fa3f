//! Item persistence backends.

pub mod in_memory;
pub mod sqlite;
pub mod r#trait;

pub use in_memory::InMemoryItemRepository;
pub use sqlite::SqliteItemRepository;
pub use r#trait::ItemRepository;

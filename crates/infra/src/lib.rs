//! Infrastructure layer: item persistence, change notification, live queries, config.

pub mod config;
pub mod error;
pub mod item_store;
pub mod live_query;
pub mod repository;

mod integration_tests;

pub use config::{Backend, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use item_store::{ItemEnvelope, ItemStore, ITEMS_TABLE};
pub use live_query::LiveQuery;
pub use repository::{InMemoryItemRepository, ItemRepository, SqliteItemRepository};

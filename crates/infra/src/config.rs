//! Store configuration loading.
//!
//! Read from the process environment:
//!
//! - `ITEMSTORE_DATABASE_URL`: unset, empty or `memory` selects the in-memory
//!   backend; a `sqlite:` URL selects SQLite.
//! - `ITEMSTORE_MAX_CONNECTIONS`: SQLite pool size (default 5).

use std::sync::Arc;

use tracing::info;

use crate::error::{StoreError, StoreResult};
use crate::item_store::ItemStore;
use crate::repository::sqlite::is_memory_url;
use crate::repository::{InMemoryItemRepository, SqliteItemRepository};

pub const DATABASE_URL_VAR: &str = "ITEMSTORE_DATABASE_URL";
pub const MAX_CONNECTIONS_VAR: &str = "ITEMSTORE_MAX_CONNECTIONS";

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Which persistence backend an [`ItemStore`] runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    InMemory,
    Sqlite { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: Backend,
    pub max_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: Backend::InMemory,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl StoreConfig {
    /// Load from the process environment.
    pub fn from_env() -> StoreResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` in place of the environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> StoreResult<Self> {
        let backend = match lookup(DATABASE_URL_VAR).map(|v| v.trim().to_string()) {
            None => Backend::InMemory,
            Some(url) if url.is_empty() || url.eq_ignore_ascii_case("memory") => Backend::InMemory,
            Some(url) if url.starts_with("sqlite:") => Backend::Sqlite { url },
            Some(url) => {
                return Err(StoreError::config(format!(
                    "{DATABASE_URL_VAR} must be `memory` or a sqlite: URL, got `{url}`"
                )));
            }
        };

        let max_connections = match lookup(MAX_CONNECTIONS_VAR) {
            None => DEFAULT_MAX_CONNECTIONS,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(StoreError::config(format!(
                        "{MAX_CONNECTIONS_VAR} must be a positive integer, got `{raw}`"
                    )));
                }
            },
        };

        Ok(Self {
            backend,
            max_connections,
        })
    }

    /// Pool size actually used: shared in-memory SQLite needs a single connection.
    pub fn effective_max_connections(&self) -> u32 {
        match &self.backend {
            Backend::Sqlite { url } if is_memory_url(url) => 1,
            _ => self.max_connections,
        }
    }

    /// Open the configured backend and wrap it in an [`ItemStore`].
    pub async fn open(&self) -> StoreResult<ItemStore> {
        match &self.backend {
            Backend::InMemory => {
                info!("opening in-memory item store");
                Ok(ItemStore::new(Arc::new(InMemoryItemRepository::new())))
            }
            Backend::Sqlite { url } => {
                let repo =
                    SqliteItemRepository::connect(url, self.effective_max_connections()).await?;
                Ok(ItemStore::new(Arc::new(repo)))
            }
        }
    }
}

//! SQLite-backed `items` table.
//!
//! Uses an sqlx connection pool; every method is a single statement, so each
//! write is its own implicit transaction.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::info;

use itemstore_core::Entity;
use itemstore_inventory::{Item, ItemId};

use super::r#trait::ItemRepository;
use crate::error::StoreResult;

const CREATE_ITEMS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS items (
        id       INTEGER PRIMARY KEY AUTOINCREMENT,
        name     TEXT    NOT NULL CHECK (length(trim(name)) > 0),
        price    REAL    NOT NULL CHECK (price >= 0),
        quantity INTEGER NOT NULL CHECK (quantity >= 0)
    )
"#;

/// SQLite-backed item repository.
///
/// ## Thread Safety
///
/// `SqlitePool` is `Send + Sync`; the repository can be shared behind an `Arc`.
///
/// ## In-memory databases
///
/// Every connection to `sqlite::memory:` opens its own empty database, so
/// [`SqliteItemRepository::connect`] pins such URLs to a single connection
/// that is never recycled.
#[derive(Debug, Clone)]
pub struct SqliteItemRepository {
    pool: SqlitePool,
}

impl SqliteItemRepository {
    /// Wrap an existing pool. Call [`Self::migrate`] before first use.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool for `url` and make sure the `items` table exists.
    pub async fn connect(url: &str, max_connections: u32) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        let pool = if is_memory_url(url) {
            SqlitePoolOptions::new()
                .min_connections(1)
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(max_connections.max(1))
                .acquire_timeout(Duration::from_secs(30))
                .connect_with(options)
                .await?
        };

        let repo = Self::new(pool);
        repo.migrate().await?;
        info!(url, "opened sqlite item repository");
        Ok(repo)
    }

    /// Create the `items` table if it is missing.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::query(CREATE_ITEMS_TABLE).execute(&self.pool).await?;
        Ok(())
    }
}

pub(crate) fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

fn item_from_row(row: &SqliteRow) -> Result<Item, sqlx::Error> {
    let id: i64 = row.try_get("id")?;
    Ok(Item {
        id: ItemId::from(id),
        name: row.try_get("name")?,
        price: row.try_get("price")?,
        quantity: row.try_get("quantity")?,
    })
}

#[async_trait]
impl ItemRepository for SqliteItemRepository {
    async fn list_by_name(&self) -> StoreResult<Vec<Item>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, price, quantity
            FROM items
            ORDER BY name ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .iter()
            .map(item_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    async fn find(&self, id: ItemId) -> StoreResult<Option<Item>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, price, quantity
            FROM items
            WHERE id = ?1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(item_from_row).transpose()?)
    }

    async fn insert_or_ignore(&self, item: &Item) -> StoreResult<Option<Item>> {
        // NULL lets SQLite pick the next AUTOINCREMENT key.
        let requested: Option<i64> = item.id().is_assigned().then(|| item.id().get());

        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO items (id, name, price, quantity)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(requested)
        .bind(&item.name)
        .bind(item.price)
        .bind(item.quantity)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(Some(item.clone().with_id(result.last_insert_rowid())))
    }

    async fn update(&self, item: &Item) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE items
            SET name = ?2, price = ?3, quantity = ?4
            WHERE id = ?1
            "#,
        )
        .bind(item.id().get())
        .bind(&item.name)
        .bind(item.price)
        .bind(item.quantity)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: ItemId) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM items WHERE id = ?1")
            .bind(id.get())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

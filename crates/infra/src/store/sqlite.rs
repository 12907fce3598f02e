//! SQLite-backed item store and audit log.
//!
//! Both adapters share one `SqlitePool`. Ids and timestamps are stored as TEXT
//! (UUID string / RFC 3339 with microseconds, UTC) so rows stay readable from
//! the `sqlite3` shell and timestamps sort lexically.

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use inventario_core::{ActorId, ItemId, MovementId};
use inventario_inventory::{Item, ItemPatch, MovementRecord, NewItem, NewMovement, Quantity};

use super::{AuditLog, ItemStore, StoreError};

fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(format!("{operation}: {err}"))
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::ColumnNotFound(_) | sqlx::Error::Decode(_) => {
            StoreError::Decode(format!("{operation}: {err}"))
        }
        other => StoreError::backend(operation, other.to_string()),
    }
}

fn timestamp_text(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Open a pool for `url` and create the tables if they do not exist.
///
/// `sqlite::memory:` gets a single, never-recycled connection so the database
/// lives as long as the pool.
pub async fn connect(url: &str) -> Result<SqlitePool, StoreError> {
    let options = SqliteConnectOptions::from_str(url)
        .map_err(|e| StoreError::Unavailable(format!("invalid database url '{url}': {e}")))?
        .create_if_missing(true);

    let in_memory = url.contains(":memory:") || url.contains("mode=memory");
    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(4)
    };

    let pool = pool_options
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await
        .map_err(|e| map_sqlx_error("connect", e))?;

    migrate(&pool).await?;
    tracing::debug!(url, "sqlite store ready");
    Ok(pool)
}

async fn migrate(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS inventario (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            code        TEXT NOT NULL,
            quantity    INTEGER NOT NULL CHECK (quantity >= 0),
            created_at  TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| map_sqlx_error("create table inventario", e))?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS salidas (
            id               TEXT PRIMARY KEY,
            item_id          TEXT NOT NULL,
            name             TEXT NOT NULL,
            code             TEXT NOT NULL,
            quantity_exited  INTEGER NOT NULL CHECK (quantity_exited > 0),
            observation      TEXT NOT NULL,
            timestamp        TEXT NOT NULL,
            actor_id         TEXT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| map_sqlx_error("create table salidas", e))?;

    sqlx::query("CREATE INDEX IF NOT EXISTS salidas_timestamp_idx ON salidas (timestamp DESC)")
        .execute(pool)
        .await
        .map_err(|e| map_sqlx_error("create index salidas_timestamp_idx", e))?;

    Ok(())
}

/// Item store over the `inventario` table.
#[derive(Debug, Clone)]
pub struct SqliteItemStore {
    pool: SqlitePool,
}

impl SqliteItemStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ItemStore for SqliteItemStore {
    async fn list_all(&self) -> Result<Vec<Item>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, code, quantity
            FROM inventario
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list items", e))?;

        rows.into_iter().map(row_to_item).collect()
    }

    async fn create(&self, item: NewItem) -> Result<ItemId, StoreError> {
        let id = ItemId::new();
        sqlx::query(
            r#"
            INSERT INTO inventario (id, name, code, quantity, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(id.to_string())
        .bind(&item.name)
        .bind(&item.code)
        .bind(item.quantity.value())
        .bind(timestamp_text(Utc::now()))
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create item", e))?;

        Ok(id)
    }

    async fn delete(&self, id: ItemId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM inventario WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete item", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::item_not_found(id));
        }
        Ok(())
    }

    async fn update(&self, id: ItemId, patch: ItemPatch) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE inventario
            SET name = COALESCE(?2, name),
                code = COALESCE(?3, code),
                quantity = COALESCE(?4, quantity)
            WHERE id = ?1
            "#,
        )
        .bind(id.to_string())
        .bind(patch.name)
        .bind(patch.code)
        .bind(patch.quantity.map(Quantity::value))
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update item", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::item_not_found(id));
        }
        Ok(())
    }
}

/// Audit log over the `salidas` table. Only ever INSERTs and SELECTs.
#[derive(Debug, Clone)]
pub struct SqliteAuditLog {
    pool: SqlitePool,
}

impl SqliteAuditLog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AuditLog for SqliteAuditLog {
    async fn append(&self, movement: NewMovement) -> Result<MovementRecord, StoreError> {
        let record = movement.into_record(MovementId::new(), Utc::now());

        sqlx::query(
            r#"
            INSERT INTO salidas (
                id,
                item_id,
                name,
                code,
                quantity_exited,
                observation,
                timestamp,
                actor_id
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(record.id.to_string())
        .bind(record.item_id.to_string())
        .bind(&record.name)
        .bind(&record.code)
        .bind(record.quantity_exited.value())
        .bind(&record.observation)
        .bind(timestamp_text(record.timestamp))
        .bind(record.actor_id.map(|a| a.to_string()))
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("append movement", e))?;

        Ok(record)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<MovementRecord>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query(
            r#"
            SELECT
                id,
                item_id,
                name,
                code,
                quantity_exited,
                observation,
                timestamp,
                actor_id
            FROM salidas
            ORDER BY timestamp DESC, id DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list movements", e))?;

        rows.into_iter().map(row_to_movement).collect()
    }
}

fn decode<T>(row: &SqliteRow, column: &'static str) -> Result<T, StoreError>
where
    T: for<'r> sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column).map_err(|e| map_sqlx_error(column, e))
}

fn parse_text<T>(text: &str, column: &'static str) -> Result<T, StoreError>
where
    T: FromStr,
    T::Err: core::fmt::Display,
{
    text.parse::<T>()
        .map_err(|e| StoreError::Decode(format!("invalid {column} '{text}': {e}")))
}

fn quantity_column(row: &SqliteRow, column: &'static str) -> Result<Quantity, StoreError> {
    let value: i64 = decode(row, column)?;
    Quantity::new(value).map_err(|e| StoreError::Decode(format!("{column}: {e}")))
}

fn row_to_item(row: SqliteRow) -> Result<Item, StoreError> {
    let id: String = decode(&row, "id")?;
    Ok(Item {
        id: parse_text::<ItemId>(&id, "id")?,
        name: decode(&row, "name")?,
        code: decode(&row, "code")?,
        quantity: quantity_column(&row, "quantity")?,
    })
}

fn row_to_movement(row: SqliteRow) -> Result<MovementRecord, StoreError> {
    let id: String = decode(&row, "id")?;
    let item_id: String = decode(&row, "item_id")?;
    let timestamp: String = decode(&row, "timestamp")?;
    let actor_id: Option<String> = decode(&row, "actor_id")?;

    let timestamp = DateTime::parse_from_rfc3339(&timestamp)
        .map_err(|e| StoreError::Decode(format!("invalid timestamp '{timestamp}': {e}")))?
        .with_timezone(&Utc);

    Ok(MovementRecord {
        id: parse_text::<MovementId>(&id, "id")?,
        item_id: parse_text::<ItemId>(&item_id, "item_id")?,
        name: decode(&row, "name")?,
        code: decode(&row, "code")?,
        quantity_exited: quantity_column(&row, "quantity_exited")?,
        observation: decode(&row, "observation")?,
        timestamp,
        actor_id: actor_id
            .as_deref()
            .map(|a| parse_text::<ActorId>(a, "actor_id"))
            .transpose()?,
    })
}

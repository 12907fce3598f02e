//! Persistence boundary of the ledger: the item store and the movement audit log.
//!
//! Both are remote collaborators in production (a document database), so every
//! call is `async` and every call can fail with a [`StoreError`]. Nothing in this
//! layer retries.

pub mod in_memory;
pub mod sqlite;

use std::sync::Arc;

use thiserror::Error;

use inventario_core::ItemId;
use inventario_inventory::{Item, ItemPatch, MovementRecord, NewItem, NewMovement};

pub use in_memory::{InMemoryAuditLog, InMemoryItemStore};
pub use sqlite::{SqliteAuditLog, SqliteItemStore};

/// Collection holding inventory items.
pub const ITEMS_COLLECTION: &str = "inventario";

/// Collection holding stock-out movement records.
pub const MOVEMENTS_COLLECTION: &str = "salidas";

/// Failure reported by a store or audit backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{collection}/{id} does not exist")]
    NotFound { collection: &'static str, id: String },

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("{operation} failed: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },

    #[error("malformed stored data: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn item_not_found(id: ItemId) -> Self {
        Self::NotFound {
            collection: ITEMS_COLLECTION,
            id: id.to_string(),
        }
    }

    pub fn backend(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Backend {
            operation,
            message: message.into(),
        }
    }
}

/// CRUD over inventory items.
#[async_trait::async_trait]
pub trait ItemStore: Send + Sync {
    /// The full collection, in the store's natural order.
    async fn list_all(&self) -> Result<Vec<Item>, StoreError>;

    /// Persist a new item; the store assigns and returns its id.
    async fn create(&self, item: NewItem) -> Result<ItemId, StoreError>;

    async fn delete(&self, id: ItemId) -> Result<(), StoreError>;

    /// Overwrite the fields set in `patch`.
    async fn update(&self, id: ItemId, patch: ItemPatch) -> Result<(), StoreError>;
}

/// Append-only log of stock-out movements.
#[async_trait::async_trait]
pub trait AuditLog: Send + Sync {
    /// Append a movement; the log assigns id and timestamp.
    async fn append(&self, movement: NewMovement) -> Result<MovementRecord, StoreError>;

    /// Up to `limit` records, newest first.
    async fn list_recent(&self, limit: usize) -> Result<Vec<MovementRecord>, StoreError>;
}

#[async_trait::async_trait]
impl<S> ItemStore for Arc<S>
where
    S: ItemStore + ?Sized,
{
    async fn list_all(&self) -> Result<Vec<Item>, StoreError> {
        (**self).list_all().await
    }

    async fn create(&self, item: NewItem) -> Result<ItemId, StoreError> {
        (**self).create(item).await
    }

    async fn delete(&self, id: ItemId) -> Result<(), StoreError> {
        (**self).delete(id).await
    }

    async fn update(&self, id: ItemId, patch: ItemPatch) -> Result<(), StoreError> {
        (**self).update(id, patch).await
    }
}

#[async_trait::async_trait]
impl<A> AuditLog for Arc<A>
where
    A: AuditLog + ?Sized,
{
    async fn append(&self, movement: NewMovement) -> Result<MovementRecord, StoreError> {
        (**self).append(movement).await
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<MovementRecord>, StoreError> {
        (**self).list_recent(limit).await
    }
}

use std::sync::RwLock;

use chrono::Utc;

use inventario_core::{Entity, ItemId, MovementId};
use inventario_inventory::{Item, ItemPatch, MovementRecord, NewItem, NewMovement};

use super::{AuditLog, ItemStore, StoreError};

fn poisoned(what: &str) -> StoreError {
    StoreError::Unavailable(format!("{what} lock poisoned"))
}

/// In-memory item store for tests/dev. Keeps insertion order.
#[derive(Debug, Default)]
pub struct InMemoryItemStore {
    items: RwLock<Vec<Item>>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ItemStore for InMemoryItemStore {
    async fn list_all(&self) -> Result<Vec<Item>, StoreError> {
        let items = self.items.read().map_err(|_| poisoned("item store"))?;
        Ok(items.clone())
    }

    async fn create(&self, item: NewItem) -> Result<ItemId, StoreError> {
        let id = ItemId::new();
        let mut items = self.items.write().map_err(|_| poisoned("item store"))?;
        items.push(item.into_item(id));
        Ok(id)
    }

    async fn delete(&self, id: ItemId) -> Result<(), StoreError> {
        let mut items = self.items.write().map_err(|_| poisoned("item store"))?;
        let before = items.len();
        items.retain(|item| item.id() != &id);
        if items.len() == before {
            return Err(StoreError::item_not_found(id));
        }
        Ok(())
    }

    async fn update(&self, id: ItemId, patch: ItemPatch) -> Result<(), StoreError> {
        let mut items = self.items.write().map_err(|_| poisoned("item store"))?;
        let item = items
            .iter_mut()
            .find(|item| item.id() == &id)
            .ok_or_else(|| StoreError::item_not_found(id))?;
        patch.apply_to(item);
        Ok(())
    }
}

/// In-memory movement log for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    records: RwLock<Vec<MovementRecord>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record in append order.
    pub fn all(&self) -> Vec<MovementRecord> {
        self.records.read().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl AuditLog for InMemoryAuditLog {
    async fn append(&self, movement: NewMovement) -> Result<MovementRecord, StoreError> {
        let record = movement.into_record(MovementId::new(), Utc::now());
        let mut records = self.records.write().map_err(|_| poisoned("audit log"))?;
        records.push(record.clone());
        Ok(record)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<MovementRecord>, StoreError> {
        let records = self.records.read().map_err(|_| poisoned("audit log"))?;
        let mut recent = records.clone();
        recent.sort_by(|a, b| (b.timestamp, b.id.as_uuid()).cmp(&(a.timestamp, a.id.as_uuid())));
        recent.truncate(limit);
        Ok(recent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inventario_inventory::{ItemDraft, Observation, Quantity};

    fn new_item(name: &str, code: &str, qty: &str) -> NewItem {
        ItemDraft::new(name, code, qty).validate().unwrap()
    }

    #[tokio::test]
    async fn create_assigns_ids_and_keeps_order() {
        let store = InMemoryItemStore::new();
        let a = store.create(new_item("A", "C1", "5")).await.unwrap();
        let b = store.create(new_item("B", "C2", "1")).await.unwrap();
        assert_ne!(a, b);

        let ids: Vec<_> = store.list_all().await.unwrap().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[tokio::test]
    async fn update_and_delete_of_missing_item_is_not_found() {
        let store = InMemoryItemStore::new();
        let id = ItemId::new();

        let err = store.update(id, ItemPatch::quantity(Quantity::ZERO)).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));

        let err = store.delete(id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn recent_movements_are_newest_first_and_limited() {
        let log = InMemoryAuditLog::new();
        let item = new_item("A", "C1", "9").into_item(ItemId::new());
        for n in 1..=3 {
            let movement = NewMovement::snapshot(
                &item,
                Quantity::positive(n).unwrap(),
                Observation::or_default(None, "-"),
                None,
            );
            log.append(movement).await.unwrap();
        }

        let recent = log.list_recent(2).await.unwrap();
        let exited: Vec<i64> = recent.iter().map(|r| r.quantity_exited.value()).collect();
        assert_eq!(exited, vec![3, 2]);
    }
}

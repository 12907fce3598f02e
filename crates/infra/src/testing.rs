//! Store wrappers for tests: call counting and fault injection.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use inventario_core::ItemId;
use inventario_inventory::{Item, ItemPatch, MovementRecord, NewItem, NewMovement};

use crate::store::{AuditLog, InMemoryAuditLog, InMemoryItemStore, ItemStore, StoreError};

fn injected(operation: &'static str) -> StoreError {
    StoreError::backend(operation, "injected failure")
}

/// Item store that counts every call and can be told to fail.
#[derive(Debug)]
pub struct RecordingItemStore {
    inner: InMemoryItemStore,
    calls: AtomicUsize,
    creates: AtomicUsize,
    fail_creates_after: AtomicUsize,
    fail_updates: AtomicBool,
    fail_lists: AtomicBool,
}

impl RecordingItemStore {
    pub fn new(inner: InMemoryItemStore) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            creates: AtomicUsize::new(0),
            fail_creates_after: AtomicUsize::new(usize::MAX),
            fail_updates: AtomicBool::new(false),
            fail_lists: AtomicBool::new(false),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn reset_calls(&self) {
        self.calls.store(0, Ordering::SeqCst);
    }

    /// Let `n` more creates succeed, then fail the rest.
    pub fn fail_creates_after(&self, n: usize) {
        let done = self.creates.load(Ordering::SeqCst);
        self.fail_creates_after.store(done.saturating_add(n), Ordering::SeqCst);
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    pub fn fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    fn tick(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl ItemStore for RecordingItemStore {
    async fn list_all(&self) -> Result<Vec<Item>, StoreError> {
        self.tick();
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(injected("list items"));
        }
        self.inner.list_all().await
    }

    async fn create(&self, item: NewItem) -> Result<ItemId, StoreError> {
        self.tick();
        let attempt = self.creates.fetch_add(1, Ordering::SeqCst);
        if attempt >= self.fail_creates_after.load(Ordering::SeqCst) {
            return Err(injected("create item"));
        }
        self.inner.create(item).await
    }

    async fn delete(&self, id: ItemId) -> Result<(), StoreError> {
        self.tick();
        self.inner.delete(id).await
    }

    async fn update(&self, id: ItemId, patch: ItemPatch) -> Result<(), StoreError> {
        self.tick();
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(injected("update item"));
        }
        self.inner.update(id, patch).await
    }
}

/// Audit log that counts append attempts and can be told to fail them.
#[derive(Debug)]
pub struct FlakyAuditLog {
    inner: InMemoryAuditLog,
    appends: AtomicUsize,
    fail_appends: AtomicBool,
}

impl FlakyAuditLog {
    pub fn new(inner: InMemoryAuditLog) -> Self {
        Self {
            inner,
            appends: AtomicUsize::new(0),
            fail_appends: AtomicBool::new(false),
        }
    }

    pub fn inner(&self) -> &InMemoryAuditLog {
        &self.inner
    }

    pub fn appends(&self) -> usize {
        self.appends.load(Ordering::SeqCst)
    }

    pub fn fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl AuditLog for FlakyAuditLog {
    async fn append(&self, movement: NewMovement) -> Result<MovementRecord, StoreError> {
        self.appends.fetch_add(1, Ordering::SeqCst);
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(injected("append movement"));
        }
        self.inner.append(movement).await
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<MovementRecord>, StoreError> {
        self.inner.list_recent(limit).await
    }
}

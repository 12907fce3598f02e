//! The inventory ledger: validation and ordering rules around every
//! quantity-affecting write.
//!
//! ```text
//! validate (no IO) → persist item change → (stock-out only) append movement → reload cache
//! ```
//!
//! Stores are remote and non-transactional. Two consequences follow:
//!
//! - A stock-out writes the new quantity first and the movement second. If the
//!   second write fails the quantity stays changed and the caller gets
//!   [`LedgerError::AuditAppend`]. Nothing rolls back or retries.
//! - A stock-out trusts the caller's `current_quantity`. Two stock-outs computed
//!   from the same stale snapshot will overwrite each other (lost update);
//!   callers should `refresh()` right before offering a stock-out.
//!
//! Deletions are not written to the audit log.

use std::collections::HashMap;

use thiserror::Error;

use inventario_auth::Session;
use inventario_core::{DomainError, ItemId};
use inventario_inventory::{
    BatchOutcome, DEFAULT_OBSERVATION, ImportRow, Item, ItemDraft, ItemPatch, MovementRecord,
    NewMovement, Observation, Quantity, StockOutRequest, StockOutRow, parse_quantity,
    remaining_after_stock_out,
};

use crate::config::LedgerConfig;
use crate::store::{AuditLog, ItemStore, StoreError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Input rejected before any store call.
    #[error("{0}")]
    Validation(String),

    /// A store or audit call failed; nothing after it was attempted.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The quantity was written but the movement record was not.
    #[error(
        "quantity of item {item_id} was set to {new_quantity} but the movement was not recorded: {source}"
    )]
    AuditAppend {
        item_id: ItemId,
        new_quantity: Quantity,
        source: StoreError,
    },
}

impl LedgerError {
    pub fn is_validation(&self) -> bool {
        matches!(self, LedgerError::Validation(_))
    }

    /// True for every failure raised by a collaborator, including the audit window.
    pub fn is_store(&self) -> bool {
        matches!(self, LedgerError::Store(_) | LedgerError::AuditAppend { .. })
    }
}

impl From<DomainError> for LedgerError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => LedgerError::Validation(msg),
            DomainError::NotFound => {
                LedgerError::Validation("item is not in the current list; reload and retry".to_string())
            }
        }
    }
}

/// Validates and applies inventory operations against an item store and an
/// audit log, keeping an advisory copy of the last-loaded item list.
///
/// Mutating operations take `&mut self`, so one operation (including its
/// awaited store calls) finishes before the next starts on the same ledger.
#[derive(Debug)]
pub struct InventoryLedger<S, A, P> {
    store: S,
    audit: A,
    session: P,
    items: Vec<Item>,
    observation_placeholder: String,
    recent_limit: usize,
}

impl<S, A, P> InventoryLedger<S, A, P> {
    pub fn new(store: S, audit: A, session: P) -> Self {
        Self {
            store,
            audit,
            session,
            items: Vec::new(),
            observation_placeholder: DEFAULT_OBSERVATION.to_string(),
            recent_limit: LedgerConfig::default().recent_movements,
        }
    }

    pub fn with_config(mut self, config: &LedgerConfig) -> Self {
        self.observation_placeholder = config.observation_placeholder().to_string();
        self.recent_limit = config.recent_movements;
        self
    }

    /// Last-loaded item list. Advisory: the store is the source of truth.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn find(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// First cached item whose code matches `code` (trimmed, exact).
    pub fn find_by_code(&self, code: &str) -> Option<&Item> {
        let code = code.trim();
        self.items.iter().find(|item| item.code == code)
    }

    /// Cached item by id or, failing that, by code.
    pub fn resolve(&self, reference: &str) -> Option<&Item> {
        reference
            .trim()
            .parse::<ItemId>()
            .ok()
            .and_then(|id| self.find(id))
            .or_else(|| self.find_by_code(reference))
    }

    /// Turn a sheet line into a request against the cached quantity.
    fn request_for_row(&self, row: &StockOutRow) -> Result<StockOutRequest, LedgerError> {
        let item = self.resolve(&row.item).ok_or_else(|| {
            LedgerError::Validation(format!("no item with id or code '{}'", row.item.trim()))
        })?;
        let exited = parse_quantity(&row.quantity)?;

        let request = StockOutRequest::new(item.id, item.quantity.value(), exited);
        Ok(match &row.observation {
            Some(observation) => request.with_observation(observation.clone()),
            None => request,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn audit(&self) -> &A {
        &self.audit
    }
}

impl<S, A, P> InventoryLedger<S, A, P>
where
    S: ItemStore,
    A: AuditLog,
    P: Session,
{
    /// Replace the cached list with the store's current collection.
    pub async fn refresh(&mut self) -> Result<&[Item], LedgerError> {
        let items = self.store.list_all().await.map_err(|e| {
            tracing::error!(error = %e, "failed to load items");
            LedgerError::from(e)
        })?;
        self.items = items;
        Ok(&self.items)
    }

    /// Reload after a successful write. The write already happened, so a failed
    /// reload only leaves the cache stale.
    async fn reload_after_write(&mut self) {
        if let Err(e) = self.refresh().await {
            tracing::warn!(error = %e, "item list is stale after a successful write");
        }
    }

    #[tracing::instrument(skip_all, fields(name = %draft.name, code = %draft.code))]
    pub async fn create_item(&mut self, draft: &ItemDraft) -> Result<ItemId, LedgerError> {
        let id = self.create_unreloaded(draft).await?;
        self.reload_after_write().await;
        Ok(id)
    }

    async fn create_unreloaded(&mut self, draft: &ItemDraft) -> Result<ItemId, LedgerError> {
        let new_item = draft.validate().map_err(|e| {
            tracing::warn!(error = %e, "rejected new item");
            LedgerError::from(e)
        })?;
        let quantity = new_item.quantity;

        let id = self.store.create(new_item).await.map_err(|e| {
            tracing::error!(error = %e, "failed to create item");
            LedgerError::from(e)
        })?;

        tracing::info!(item_id = %id, %quantity, "item created");
        Ok(id)
    }

    #[tracing::instrument(skip_all, fields(item_id = %id))]
    pub async fn delete_item(&mut self, id: ItemId) -> Result<(), LedgerError> {
        self.store.delete(id).await.map_err(|e| {
            tracing::error!(error = %e, "failed to delete item");
            LedgerError::from(e)
        })?;

        tracing::info!("item deleted");
        self.reload_after_write().await;
        Ok(())
    }

    /// Overwrite the quantity. No bound against the previous value and no
    /// movement record: this is the correction path.
    #[tracing::instrument(skip_all, fields(item_id = %id, new_quantity = new_quantity))]
    pub async fn edit_quantity(&mut self, id: ItemId, new_quantity: i64) -> Result<Quantity, LedgerError> {
        let quantity = Quantity::new(new_quantity).map_err(|e| {
            tracing::warn!(error = %e, "rejected quantity edit");
            LedgerError::from(e)
        })?;

        self.write_quantity(id, quantity).await?;
        self.reload_after_write().await;
        Ok(quantity)
    }

    async fn write_quantity(&self, id: ItemId, quantity: Quantity) -> Result<(), LedgerError> {
        self.store
            .update(id, ItemPatch::quantity(quantity))
            .await
            .map_err(|e| {
                tracing::error!(item_id = %id, error = %e, "failed to update quantity");
                LedgerError::from(e)
            })?;
        tracing::info!(item_id = %id, %quantity, "quantity updated");
        Ok(())
    }

    /// Take `exited_quantity` units out of an item and record the movement.
    #[tracing::instrument(
        skip_all,
        fields(
            item_id = %request.item_id,
            current = request.current_quantity,
            exited = request.exited_quantity
        )
    )]
    pub async fn record_stock_out(&mut self, request: &StockOutRequest) -> Result<MovementRecord, LedgerError> {
        let result = self.stock_out_unreloaded(request).await;
        // The quantity changed in every outcome except a rejected or failed update.
        if matches!(result, Ok(_) | Err(LedgerError::AuditAppend { .. })) {
            self.reload_after_write().await;
        }
        result.map(|(record, _)| record)
    }

    /// Returns the movement and the quantity the item was left at.
    async fn stock_out_unreloaded(
        &self,
        request: &StockOutRequest,
    ) -> Result<(MovementRecord, Quantity), LedgerError> {
        let remaining = remaining_after_stock_out(request.current_quantity, request.exited_quantity)
            .map_err(|e| {
                tracing::warn!(error = %e, "rejected stock-out");
                LedgerError::from(e)
            })?;
        let exited = Quantity::positive(request.exited_quantity)?;

        let item = self.find(request.item_id).ok_or_else(|| {
            tracing::warn!("stock-out for an item missing from the loaded list");
            LedgerError::from(DomainError::not_found())
        })?;
        let movement = NewMovement::snapshot(
            item,
            exited,
            Observation::or_default(request.observation.as_deref(), &self.observation_placeholder),
            self.session.current_actor_id(),
        );

        self.write_quantity(request.item_id, remaining).await?;

        match self.audit.append(movement).await {
            Ok(record) => {
                tracing::info!(movement_id = %record.id, "stock-out recorded");
                Ok((record, remaining))
            }
            Err(source) => {
                tracing::error!(
                    error = %source,
                    new_quantity = %remaining,
                    "quantity updated but movement record was not written"
                );
                Err(LedgerError::AuditAppend {
                    item_id: request.item_id,
                    new_quantity: remaining,
                    source,
                })
            }
        }
    }

    /// Apply stock-outs one at a time, counting outcomes; a failure does not
    /// stop the remaining lines.
    ///
    /// A line's `current_quantity` is trusted only for the first line touching
    /// that item. Later lines for the same item start from the quantity the
    /// batch itself wrote.
    #[tracing::instrument(skip_all, fields(lines = requests.len()))]
    pub async fn record_stock_out_batch(&mut self, requests: &[StockOutRequest]) -> BatchOutcome {
        let lines = requests.iter().cloned().map(Ok).collect();
        self.apply_stock_out_lines(lines).await
    }

    /// Stock-out lines from a sheet. Each line is resolved by id or code
    /// against the loaded list; lines that name no loaded item or carry no
    /// quantity count as errors and the rest still run.
    #[tracing::instrument(skip_all, fields(lines = rows.len()))]
    pub async fn record_stock_out_rows(&mut self, rows: &[StockOutRow]) -> BatchOutcome {
        let lines = rows.iter().map(|row| self.request_for_row(row)).collect();
        self.apply_stock_out_lines(lines).await
    }

    async fn apply_stock_out_lines(
        &mut self,
        lines: Vec<Result<StockOutRequest, LedgerError>>,
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        let mut written: HashMap<ItemId, Quantity> = HashMap::new();

        for line in lines {
            let result = match line {
                Ok(mut request) => {
                    if let Some(quantity) = written.get(&request.item_id) {
                        request.current_quantity = quantity.value();
                    }
                    let result = self.stock_out_unreloaded(&request).await;
                    match &result {
                        Ok((_, remaining)) => {
                            written.insert(request.item_id, *remaining);
                        }
                        Err(LedgerError::AuditAppend { item_id, new_quantity, .. }) => {
                            written.insert(*item_id, *new_quantity);
                        }
                        Err(_) => {}
                    }
                    result.map(|_| ())
                }
                Err(e) => Err(e),
            };

            match result {
                Ok(()) => outcome.record_success(),
                Err(e) => {
                    tracing::warn!(error = %e, "stock-out line failed");
                    outcome.record_error();
                }
            }
        }

        if !written.is_empty() {
            self.reload_after_write().await;
        }
        tracing::info!(
            successes = outcome.successes,
            errors = outcome.errors,
            "stock-out batch finished"
        );
        outcome
    }

    /// Create one item per valid row. Invalid or failing rows are counted as
    /// errors and skipped.
    #[tracing::instrument(skip_all, fields(rows = rows.len()))]
    pub async fn bulk_import(&mut self, rows: &[ImportRow]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for row in rows {
            match self.create_unreloaded(&row.to_draft()).await {
                Ok(_) => outcome.record_success(),
                Err(_) => outcome.record_error(),
            }
        }

        if outcome.successes > 0 {
            self.reload_after_write().await;
        }
        tracing::info!(successes = outcome.successes, errors = outcome.errors, "import finished");
        outcome
    }

    /// Newest movements first; `None` uses the configured default limit.
    pub async fn recent_movements(&self, limit: Option<usize>) -> Result<Vec<MovementRecord>, LedgerError> {
        let limit = limit.unwrap_or(self.recent_limit);
        self.audit.list_recent(limit).await.map_err(|e| {
            tracing::error!(error = %e, "failed to load movements");
            LedgerError::from(e)
        })
    }
}

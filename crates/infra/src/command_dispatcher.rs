//! Single entry point for front-ends: one typed command in, one outcome and one
//! notice out.
//!
//! ```text
//! LedgerCommand
//!   ↓
//! InventoryLedger (validate → persist → audit → reload)
//!   ↓
//! CommandOutcome / LedgerError  ──→  Notice on the bus (auto-dismissing)
//! ```
//!
//! The dispatcher adds no semantics of its own: every rule lives in the ledger.
//! Publishing a notice is best-effort; a bus failure is logged and never turns
//! a completed write into an error.

use serde::Serialize;

use inventario_auth::Session;
use inventario_core::ItemId;
use inventario_events::{EventBus, Notice};
use inventario_inventory::{BatchOutcome, LedgerCommand, MovementRecord, Quantity};

use crate::config::LedgerConfig;
use crate::ledger::{InventoryLedger, LedgerError};
use crate::store::{AuditLog, ItemStore};

/// What a successfully dispatched command did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandOutcome {
    Created { item_id: ItemId },
    Deleted { item_id: ItemId },
    QuantitySet { item_id: ItemId, quantity: Quantity },
    StockedOut { movement: MovementRecord },
    Batch { outcome: BatchOutcome },
}

impl CommandOutcome {
    fn summary(&self) -> String {
        match self {
            CommandOutcome::Created { .. } => "Item added.".to_string(),
            CommandOutcome::Deleted { .. } => "Item deleted.".to_string(),
            CommandOutcome::QuantitySet { quantity, .. } => format!("Quantity set to {quantity}."),
            CommandOutcome::StockedOut { movement } => format!(
                "Recorded stock-out of {} x {} ({}).",
                movement.quantity_exited, movement.name, movement.code
            ),
            CommandOutcome::Batch { outcome } => format!(
                "Completed {} lines: {} succeeded, {} failed.",
                outcome.total(),
                outcome.successes,
                outcome.errors
            ),
        }
    }
}

/// Notice lifetimes, in milliseconds.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct NoticeTimings {
    pub error_ms: u64,
    pub info_ms: u64,
}

impl From<&LedgerConfig> for NoticeTimings {
    fn from(config: &LedgerConfig) -> Self {
        Self {
            error_ms: config.error_notice_ms,
            info_ms: config.info_notice_ms,
        }
    }
}

impl Default for NoticeTimings {
    fn default() -> Self {
        Self::from(&LedgerConfig::default())
    }
}

/// Routes [`LedgerCommand`]s to an [`InventoryLedger`] and reports each result
/// on a notice bus.
#[derive(Debug)]
pub struct CommandDispatcher<S, A, P, B> {
    ledger: InventoryLedger<S, A, P>,
    bus: B,
    timings: NoticeTimings,
}

impl<S, A, P, B> CommandDispatcher<S, A, P, B> {
    pub fn new(ledger: InventoryLedger<S, A, P>, bus: B) -> Self {
        Self {
            ledger,
            bus,
            timings: NoticeTimings::default(),
        }
    }

    pub fn with_timings(mut self, timings: NoticeTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn ledger(&self) -> &InventoryLedger<S, A, P> {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut InventoryLedger<S, A, P> {
        &mut self.ledger
    }

    pub fn into_parts(self) -> (InventoryLedger<S, A, P>, B) {
        (self.ledger, self.bus)
    }
}

impl<S, A, P, B> CommandDispatcher<S, A, P, B>
where
    S: ItemStore,
    A: AuditLog,
    P: Session,
    B: EventBus<Notice>,
{
    /// Execute one command and publish its notice.
    ///
    /// Batch commands always return `Ok` with their counts; a batch where some
    /// lines failed is reported as an error notice.
    pub async fn dispatch(&mut self, command: LedgerCommand) -> Result<CommandOutcome, LedgerError> {
        let source = command.kind();
        tracing::debug!(command = source, "dispatching");

        let result = match command {
            LedgerCommand::Create(draft) => self
                .ledger
                .create_item(&draft)
                .await
                .map(|item_id| CommandOutcome::Created { item_id }),
            LedgerCommand::Delete(item_id) => self
                .ledger
                .delete_item(item_id)
                .await
                .map(|()| CommandOutcome::Deleted { item_id }),
            LedgerCommand::EditQuantity { item_id, new_quantity } => self
                .ledger
                .edit_quantity(item_id, new_quantity)
                .await
                .map(|quantity| CommandOutcome::QuantitySet { item_id, quantity }),
            LedgerCommand::StockOut(request) => self
                .ledger
                .record_stock_out(&request)
                .await
                .map(|movement| CommandOutcome::StockedOut { movement }),
            LedgerCommand::StockOutBatch(requests) => Ok(CommandOutcome::Batch {
                outcome: self.ledger.record_stock_out_batch(&requests).await,
            }),
            LedgerCommand::StockOutSheet(rows) => Ok(CommandOutcome::Batch {
                outcome: self.ledger.record_stock_out_rows(&rows).await,
            }),
            LedgerCommand::BulkImport(rows) => Ok(CommandOutcome::Batch {
                outcome: self.ledger.bulk_import(&rows).await,
            }),
        };

        self.notify(source, &result);
        result
    }

    fn notify(&self, source: &'static str, result: &Result<CommandOutcome, LedgerError>) {
        let notice = match result {
            Ok(outcome @ CommandOutcome::Batch { outcome: counts }) if counts.errors > 0 => {
                Notice::error(source, outcome.summary(), self.timings.error_ms)
            }
            Ok(outcome) => Notice::info(source, outcome.summary(), self.timings.info_ms),
            Err(e) => Notice::error(source, e.to_string(), self.timings.error_ms),
        };

        if let Err(e) = self.bus.publish(notice) {
            tracing::warn!(command = source, error = ?e, "failed to publish notice");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use inventario_auth::StaticSession;
    use inventario_events::{InMemoryEventBus, NoticeLevel};
    use inventario_inventory::{ImportRow, ItemDraft, StockOutRequest, StockOutRow};

    use crate::store::{InMemoryAuditLog, InMemoryItemStore};

    type TestDispatcher = CommandDispatcher<
        InMemoryItemStore,
        InMemoryAuditLog,
        StaticSession,
        Arc<InMemoryEventBus<Notice>>,
    >;

    fn dispatcher() -> (TestDispatcher, Arc<InMemoryEventBus<Notice>>) {
        let bus = Arc::new(InMemoryEventBus::new());
        let ledger = InventoryLedger::new(
            InMemoryItemStore::new(),
            InMemoryAuditLog::new(),
            StaticSession::anonymous(),
        );
        let timings = NoticeTimings { error_ms: 3_000, info_ms: 5_000 };
        (CommandDispatcher::new(ledger, bus.clone()).with_timings(timings), bus)
    }

    #[tokio::test]
    async fn success_publishes_info_notice() {
        let (mut dispatcher, bus) = dispatcher();
        let notices = bus.subscribe();

        let outcome = dispatcher
            .dispatch(LedgerCommand::Create(ItemDraft::new("Martillo", "MT-1", "3")))
            .await
            .unwrap();

        let CommandOutcome::Created { item_id } = outcome else {
            panic!("expected Created, got {outcome:?}");
        };
        assert!(dispatcher.ledger().find(item_id).is_some());

        let notice = notices.try_recv().unwrap();
        assert_eq!(notice.level, NoticeLevel::Info);
        assert_eq!(notice.source, "inventory.item.create");
        assert_eq!(notice.dismiss_after_ms, 5_000);
    }

    #[tokio::test]
    async fn rejection_publishes_error_notice_with_reason() {
        let (mut dispatcher, bus) = dispatcher();
        let notices = bus.subscribe();

        let err = dispatcher
            .dispatch(LedgerCommand::Create(ItemDraft::new("", "MT-1", "3")))
            .await
            .unwrap_err();

        let notice = notices.try_recv().unwrap();
        assert!(notice.is_error());
        assert_eq!(notice.message, err.to_string());
        assert_eq!(notice.dismiss_after_ms, 3_000);
    }

    #[tokio::test]
    async fn stock_out_outcome_carries_the_movement() {
        let (mut dispatcher, bus) = dispatcher();
        let id = dispatcher.ledger_mut().create_item(&ItemDraft::new("A", "C1", "4")).await.unwrap();
        let notices = bus.subscribe();

        let outcome = dispatcher
            .dispatch(LedgerCommand::StockOut(StockOutRequest::new(id, 4, 1)))
            .await
            .unwrap();

        match outcome {
            CommandOutcome::StockedOut { movement } => assert_eq!(movement.item_id, id),
            other => panic!("expected StockedOut, got {other:?}"),
        }
        assert_eq!(notices.drain().len(), 1);
    }

    #[tokio::test]
    async fn partially_failed_batch_is_ok_but_raises_error_notice() {
        let (mut dispatcher, bus) = dispatcher();
        let notices = bus.subscribe();

        let outcome = dispatcher
            .dispatch(LedgerCommand::BulkImport(vec![
                ImportRow::new("A", "C1", "5"),
                ImportRow::new("", "C2", "3"),
            ]))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            CommandOutcome::Batch {
                outcome: BatchOutcome { successes: 1, errors: 1 }
            }
        );
        let notice = notices.try_recv().unwrap();
        assert!(notice.is_error());
        assert!(notice.message.contains("1 succeeded, 1 failed"));
    }

    #[tokio::test]
    async fn stock_out_sheet_runs_the_lines_it_can_resolve() {
        let (mut dispatcher, bus) = dispatcher();
        let id = dispatcher.ledger_mut().create_item(&ItemDraft::new("A", "TD-1", "10")).await.unwrap();
        let notices = bus.subscribe();

        let outcome = dispatcher
            .dispatch(LedgerCommand::StockOutSheet(vec![
                StockOutRow::new("TD-1", "2"),
                StockOutRow::new("NOPE", "1"),
                StockOutRow::new("TD-1", "3"),
            ]))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            CommandOutcome::Batch {
                outcome: BatchOutcome { successes: 2, errors: 1 }
            }
        );
        assert_eq!(dispatcher.ledger().find(id).unwrap().quantity.value(), 5);

        let notice = notices.try_recv().unwrap();
        assert_eq!(notice.source, "inventory.item.stock_out_sheet");
        assert!(notice.message.starts_with("Completed 3 lines"));
    }

    #[tokio::test]
    async fn outcome_serializes_with_kind_tag() {
        let outcome = CommandOutcome::Batch {
            outcome: BatchOutcome { successes: 2, errors: 0 },
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["kind"], "batch");
        assert_eq!(json["outcome"]["successes"], 2);
    }
}

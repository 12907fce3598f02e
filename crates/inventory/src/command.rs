use serde::{Deserialize, Serialize};

use inventario_core::ItemId;

use crate::import::{ImportRow, StockOutRow};
use crate::item::ItemDraft;

/// Stock-out of one item, computed from the caller's last-known quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockOutRequest {
    pub item_id: ItemId,
    pub current_quantity: i64,
    pub exited_quantity: i64,
    pub observation: Option<String>,
}

impl StockOutRequest {
    pub fn new(item_id: ItemId, current_quantity: i64, exited_quantity: i64) -> Self {
        Self {
            item_id,
            current_quantity,
            exited_quantity,
            observation: None,
        }
    }

    pub fn with_observation(mut self, observation: impl Into<String>) -> Self {
        self.observation = Some(observation.into());
        self
    }
}

/// Everything a front-end can ask the ledger to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerCommand {
    Create(ItemDraft),
    Delete(ItemId),
    EditQuantity { item_id: ItemId, new_quantity: i64 },
    StockOut(StockOutRequest),
    /// Stock-outs applied one after another; a failing line does not stop the rest.
    StockOutBatch(Vec<StockOutRequest>),
    /// Like `StockOutBatch`, but lines name items by id or code and carry raw
    /// quantity text; they are resolved against the loaded item list.
    StockOutSheet(Vec<StockOutRow>),
    /// Data rows only (no header).
    BulkImport(Vec<ImportRow>),
}

impl LedgerCommand {
    /// Stable command name, used in logs and notices.
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerCommand::Create(_) => "inventory.item.create",
            LedgerCommand::Delete(_) => "inventory.item.delete",
            LedgerCommand::EditQuantity { .. } => "inventory.item.edit_quantity",
            LedgerCommand::StockOut(_) => "inventory.item.stock_out",
            LedgerCommand::StockOutBatch(_) => "inventory.item.stock_out_batch",
            LedgerCommand::StockOutSheet(_) => "inventory.item.stock_out_sheet",
            LedgerCommand::BulkImport(_) => "inventory.item.bulk_import",
        }
    }
}

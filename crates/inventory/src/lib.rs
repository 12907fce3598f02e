//! Inventory domain module.
//!
//! Business rules for items, stock-outs and spreadsheet import rows, implemented
//! as deterministic domain logic (no IO, no storage, no clock).

pub mod command;
pub mod import;
pub mod item;
pub mod movement;

pub use command::{LedgerCommand, StockOutRequest};
pub use import::{BatchOutcome, ImportRow, SheetRows, StockOutRow};
pub use item::{
    Item, ItemDraft, ItemPatch, NewItem, Quantity, parse_quantity, remaining_after_stock_out,
};
pub use movement::{DEFAULT_OBSERVATION, MovementRecord, NewMovement, Observation};

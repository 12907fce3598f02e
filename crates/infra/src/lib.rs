//! Infrastructure layer: store adapters, configuration, the inventory ledger
//! and the command dispatcher that front-ends talk to.

pub mod command_dispatcher;
pub mod config;
pub mod ledger;
pub mod store;

#[cfg(test)]
mod testing;

pub use command_dispatcher::{CommandDispatcher, CommandOutcome, NoticeTimings};
pub use config::{ConfigError, LedgerConfig};
pub use ledger::{InventoryLedger, LedgerError};
pub use store::{
    AuditLog, InMemoryAuditLog, InMemoryItemStore, ItemStore, SqliteAuditLog, SqliteItemStore,
    StoreError,
};

//! Notification plumbing between the ledger and its presenters.

pub mod bus;
pub mod in_memory_bus;
pub mod notice;

pub use bus::{EventBus, Subscription};
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
pub use notice::{Notice, NoticeLevel};

//! `inventario-auth`: the authentication boundary seen by the ledger.
//!
//! Only actor attribution crosses this boundary; credentials and sign-in flows
//! stay with the host application.

pub mod session;

pub use session::{InMemorySession, Session, StaticSession};

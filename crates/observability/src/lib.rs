//! Process-wide logging setup shared by the binaries.

pub mod tracing;

pub use tracing::LogFormat;

/// Initialize tracing with the format named by `INVENTARIO_LOG_FORMAT`.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init(LogFormat::from_env());
}

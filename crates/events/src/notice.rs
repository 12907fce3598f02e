//! User-facing notifications raised by ledger commands.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A transient message for the person operating the front-end.
///
/// Notices dismiss themselves: a presenter shows one until `expires_at()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    /// Command that produced the notice (e.g. `inventory.item.create`).
    pub source: String,
    pub message: String,
    pub raised_at: DateTime<Utc>,
    pub dismiss_after_ms: u64,
}

impl Notice {
    pub fn info(source: impl Into<String>, message: impl Into<String>, dismiss_after_ms: u64) -> Self {
        Self::new(NoticeLevel::Info, source, message, dismiss_after_ms)
    }

    pub fn error(source: impl Into<String>, message: impl Into<String>, dismiss_after_ms: u64) -> Self {
        Self::new(NoticeLevel::Error, source, message, dismiss_after_ms)
    }

    fn new(
        level: NoticeLevel,
        source: impl Into<String>,
        message: impl Into<String>,
        dismiss_after_ms: u64,
    ) -> Self {
        Self {
            level,
            source: source.into(),
            message: message.into(),
            raised_at: Utc::now(),
            dismiss_after_ms,
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        let ms = i64::from(u32::try_from(self.dismiss_after_ms).unwrap_or(u32::MAX));
        self.raised_at + Duration::milliseconds(ms)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_expires_after_its_lifetime() {
        let notice = Notice::error("inventory.item.create", "name and code are required", 3_000);
        assert!(notice.is_error());
        assert!(!notice.is_expired(notice.raised_at));
        assert!(notice.is_expired(notice.raised_at + Duration::milliseconds(3_000)));
    }
}

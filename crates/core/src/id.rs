//! Strongly-typed identifiers used across the domain.
//!
//! All ids are UUIDv7, so ids minted later sort after earlier ones. That is
//! what the stores use as a tie-breaker when two records share a timestamp.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Mint a fresh, time-ordered id.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0.hyphenated(), f)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$name> for Uuid {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        /// Accepts the hyphenated or simple UUID form; surrounding whitespace
        /// (pasted ids, sheet cells) is ignored.
        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let text = s.trim();
                if text.is_empty() {
                    return Err(DomainError::invalid_id(concat!(stringify!($name), " is empty")));
                }
                Uuid::try_parse(text).map(Self).map_err(|e| {
                    DomainError::invalid_id(format!("{}: '{text}' ({e})", stringify!($name)))
                })
            }
        }
    };
}

uuid_id! {
    /// Identifier of an inventory item, assigned by the item store on creation.
    ItemId
}

uuid_id! {
    /// Identifier of a movement record, assigned by the audit log on append.
    MovementId
}

uuid_id! {
    /// Identifier of an authenticated actor (movement attribution).
    ActorId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_its_own_display_form() {
        let id = ItemId::new();
        let parsed: ItemId = format!("  {id}\n").parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn malformed_id_is_invalid_id_error() {
        for text in ["not-a-uuid", "   "] {
            match text.parse::<ActorId>().unwrap_err() {
                DomainError::InvalidId(msg) => assert!(msg.starts_with("ActorId"), "{msg}"),
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn later_ids_sort_after_earlier_ones() {
        let first = MovementId::new();
        let second = MovementId::new();
        assert!(first < second);
    }
}

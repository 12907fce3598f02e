use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use inventario_core::{ActorId, Entity, ItemId, MovementId, ValueObject};

use crate::item::{Item, Quantity};

/// Observation stored when the caller leaves it empty.
pub const DEFAULT_OBSERVATION: &str = "Sin observación";

/// Free-text note attached to a stock-out. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Observation(String);

impl Observation {
    /// Use `input` when it has visible text, `default` otherwise.
    pub fn or_default(input: Option<&str>, default: &str) -> Self {
        match input.map(str::trim) {
            Some(text) if !text.is_empty() => Self(text.to_string()),
            _ => Self(default.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl ValueObject for Observation {}

/// A stock-out ready to be appended; the audit log assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMovement {
    pub item_id: ItemId,
    pub name: String,
    pub code: String,
    pub quantity_exited: Quantity,
    pub observation: Observation,
    pub actor_id: Option<ActorId>,
}

impl NewMovement {
    /// Snapshot `item`'s identity for a stock-out of `exited` units.
    pub fn snapshot(
        item: &Item,
        exited: Quantity,
        observation: Observation,
        actor_id: Option<ActorId>,
    ) -> Self {
        Self {
            item_id: item.id,
            name: item.name.clone(),
            code: item.code.clone(),
            quantity_exited: exited,
            observation,
            actor_id,
        }
    }

    pub fn into_record(self, id: MovementId, timestamp: DateTime<Utc>) -> MovementRecord {
        MovementRecord {
            id,
            item_id: self.item_id,
            name: self.name,
            code: self.code,
            quantity_exited: self.quantity_exited,
            observation: self.observation.into_inner(),
            timestamp,
            actor_id: self.actor_id,
        }
    }
}

/// One completed stock-out ("salida"). Append-only.
///
/// `item_id` is a weak reference: the item may since have been edited or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementRecord {
    pub id: MovementId,
    pub item_id: ItemId,
    pub name: String,
    pub code: String,
    pub quantity_exited: Quantity,
    pub observation: String,
    pub timestamp: DateTime<Utc>,
    pub actor_id: Option<ActorId>,
}

impl Entity for MovementRecord {
    type Id = MovementId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

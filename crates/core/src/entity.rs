//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Items and movement records are entities: two snapshots with the same id are
/// the same thing even if their fields differ (a stale cache entry vs. the store).
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects carry no identity and are compared by their attributes only
/// (a validated quantity, an observation text). They are immutable: "changing"
/// one means building a new value.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

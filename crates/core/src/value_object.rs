//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: two instances
/// with the same attribute values are interchangeable. To "modify" one,
/// construct a new value. Contrast with aggregates/entities, whose identity
/// persists across state changes.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

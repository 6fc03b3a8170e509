//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values; identity
/// does not matter. A `TagId` is a value object, a `Student` is an entity.
///
/// The bounds keep value objects cheap to copy, comparable and debuggable.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

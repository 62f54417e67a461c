//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have **no identity**: two instances holding the same values
/// are the same thing (`TaxRate(10)`, an email address, a media type). They are
/// immutable; "changing" one means building a new one.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq)]
/// struct TaxRate(Decimal);
///
/// impl ValueObject for TaxRate {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

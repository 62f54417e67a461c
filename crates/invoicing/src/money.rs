//! Monetary value objects.
//!
//! Amounts are exact decimals end to end. Rounding to cents happens only when
//! a value is rendered, never while computing.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use charterwise_core::{DomainError, DomainResult, ValueObject};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Monetary amount wrapper used at presentation boundaries.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Amount rounded to cents (half away from zero).
    pub fn rounded(&self) -> Decimal {
        self.0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

impl ValueObject for Money {}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let rounded = self.rounded();
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
        f.pad(&format!("{sign}${:.2}", rounded.abs()))
    }
}

/// Tax rate expressed as a percentage.
///
/// Construction never fails: drafts may hold out-of-range values while the
/// user is typing. [`TaxRate::validate`] is the submission-time check.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxRate(Decimal);

impl TaxRate {
    pub fn new(percent: Decimal) -> Self {
        Self(percent)
    }

    pub fn percent(&self) -> Decimal {
        self.0
    }

    /// Rate must lie in `[0, 100]`.
    pub fn validate(&self) -> DomainResult<()> {
        if self.0.is_sign_negative() && !self.0.is_zero() {
            return Err(DomainError::validation("Tax rate cannot be negative"));
        }
        if self.0 > HUNDRED {
            return Err(DomainError::validation("Tax rate cannot exceed 100%"));
        }
        Ok(())
    }

    /// `subtotal * rate / 100`, exact.
    pub fn tax_on(&self, subtotal: Decimal) -> DomainResult<Decimal> {
        subtotal
            .checked_mul(self.0)
            .and_then(|v| v.checked_div(HUNDRED))
            .ok_or_else(|| DomainError::invalid_operation("tax amount out of range"))
    }
}

impl ValueObject for TaxRate {}

impl From<Decimal> for TaxRate {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl core::fmt::Display for TaxRate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}%", self.0.normalize())
    }
}

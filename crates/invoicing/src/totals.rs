//! Derived invoice totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use charterwise_core::{DomainError, DomainResult};

use crate::line_item::LineItem;
use crate::money::{Money, TaxRate};

/// `subtotal`, `tax` and `total` for a set of line items at a tax rate.
///
/// Values are unrounded; see [`Money`] for presentation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl Totals {
    /// - `subtotal = Σ amount`
    /// - `tax = subtotal * rate / 100`
    /// - `total = subtotal + tax`
    ///
    /// The rate is used as given; range checks belong to submission.
    pub fn calculate<'a, I>(items: I, tax_rate: TaxRate) -> DomainResult<Self>
    where
        I: IntoIterator<Item = &'a LineItem>,
    {
        let subtotal = items
            .into_iter()
            .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.amount()))
            .ok_or_else(|| DomainError::invalid_operation("subtotal out of range"))?;
        let tax = tax_rate.tax_on(subtotal)?;
        let total = subtotal
            .checked_add(tax)
            .ok_or_else(|| DomainError::invalid_operation("total out of range"))?;

        Ok(Self {
            subtotal,
            tax,
            total,
        })
    }

    pub fn subtotal_money(&self) -> Money {
        Money::new(self.subtotal)
    }

    pub fn tax_money(&self) -> Money {
        Money::new(self.tax)
    }

    pub fn total_money(&self) -> Money {
        Money::new(self.total)
    }
}

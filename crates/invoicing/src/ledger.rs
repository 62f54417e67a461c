//! Line items bound to a tax rate, with totals that are never stale.

use rust_decimal::Decimal;
use serde::Serialize;

use charterwise_core::DomainResult;

use crate::line_item::{LineItem, LineItemStore};
use crate::money::TaxRate;
use crate::totals::Totals;

/// A [`LineItemStore`] plus tax rate plus the [`Totals`] derived from both.
///
/// Each mutator works on a scratch copy and only commits once the new totals
/// have been computed, so readers see either the old state or the new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItemLedger {
    items: LineItemStore,
    tax_rate: TaxRate,
    totals: Totals,
}

impl LineItemLedger {
    pub fn new(items: LineItemStore, tax_rate: TaxRate) -> DomainResult<Self> {
        let totals = Totals::calculate(items.items(), tax_rate)?;
        Ok(Self {
            items,
            tax_rate,
            totals,
        })
    }

    /// Single blank row; totals are zero at any rate.
    pub fn blank(tax_rate: TaxRate) -> Self {
        Self::restore(LineItemStore::new(), tax_rate, Totals::default())
    }

    /// Rebuild from values previously produced by this type.
    pub(crate) fn restore(items: LineItemStore, tax_rate: TaxRate, totals: Totals) -> Self {
        Self {
            items,
            tax_rate,
            totals,
        }
    }

    pub fn store(&self) -> &LineItemStore {
        &self.items
    }

    pub fn items(&self) -> &[LineItem] {
        self.items.items()
    }

    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    pub fn totals(&self) -> Totals {
        self.totals
    }

    pub fn add_item(&mut self) -> DomainResult<usize> {
        let mut next = self.items.clone();
        let index = next.add_item();
        self.commit(next, self.tax_rate)?;
        Ok(index)
    }

    pub fn remove_item(&mut self, index: usize) -> DomainResult<LineItem> {
        let mut next = self.items.clone();
        let removed = next.remove_item(index)?;
        self.commit(next, self.tax_rate)?;
        Ok(removed)
    }

    pub fn update_item(
        &mut self,
        index: usize,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> DomainResult<()> {
        let mut next = self.items.clone();
        next.update_item(index, quantity, unit_price)?;
        self.commit(next, self.tax_rate)
    }

    /// Descriptions do not affect totals.
    pub fn update_description(
        &mut self,
        index: usize,
        description: impl Into<String>,
    ) -> DomainResult<()> {
        self.items.update_description(index, description)?;
        Ok(())
    }

    pub fn set_tax_rate(&mut self, tax_rate: TaxRate) -> DomainResult<()> {
        let items = self.items.clone();
        self.commit(items, tax_rate)
    }

    fn commit(&mut self, items: LineItemStore, tax_rate: TaxRate) -> DomainResult<()> {
        let totals = Totals::calculate(items.items(), tax_rate)?;
        self.items = items;
        self.tax_rate = tax_rate;
        self.totals = totals;
        Ok(())
    }
}

impl Default for LineItemLedger {
    fn default() -> Self {
        Self::blank(TaxRate::default())
    }
}

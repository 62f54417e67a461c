//! Line items and the ordered store that owns them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use charterwise_core::{DomainError, DomainResult};

/// `quantity * unit_price`, checked.
pub fn line_amount(quantity: Decimal, unit_price: Decimal) -> DomainResult<Decimal> {
    quantity
        .checked_mul(unit_price)
        .ok_or_else(|| DomainError::invalid_operation("line amount out of range"))
}

/// One billable entry on an invoice.
///
/// `amount` is always `quantity * unit_price`; there is no way to set it
/// directly, and deserialisation recomputes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "LineItemInput")]
pub struct LineItem {
    description: String,
    quantity: Decimal,
    unit_price: Decimal,
    amount: Decimal,
}

impl LineItem {
    pub fn new(
        description: impl Into<String>,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> DomainResult<Self> {
        Ok(Self {
            description: description.into(),
            quantity,
            unit_price,
            amount: line_amount(quantity, unit_price)?,
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Submission-time checks for a single line.
    pub fn validate(&self, position: usize) -> Vec<String> {
        let mut problems = Vec::new();
        let line = position + 1;
        if self.description.trim().is_empty() {
            problems.push(format!("item {line}: Description is required"));
        }
        if self.quantity <= Decimal::ZERO {
            problems.push(format!("item {line}: Quantity must be greater than 0"));
        }
        if self.unit_price < Decimal::ZERO {
            problems.push(format!("item {line}: Unit price cannot be negative"));
        }
        problems
    }

    fn set_pricing(&mut self, quantity: Decimal, unit_price: Decimal) -> DomainResult<()> {
        let amount = line_amount(quantity, unit_price)?;
        self.quantity = quantity;
        self.unit_price = unit_price;
        self.amount = amount;
        Ok(())
    }
}

impl Default for LineItem {
    /// Blank row: one unit at zero price.
    fn default() -> Self {
        Self {
            description: String::new(),
            quantity: Decimal::ONE,
            unit_price: Decimal::ZERO,
            amount: Decimal::ZERO,
        }
    }
}

/// Wire shape of a line item as received from collaborators.
///
/// Any `amount` supplied here is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemInput {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    #[serde(default)]
    pub amount: Option<Decimal>,
}

impl TryFrom<LineItemInput> for LineItem {
    type Error = DomainError;

    fn try_from(input: LineItemInput) -> Result<Self, Self::Error> {
        LineItem::new(input.description, input.quantity, input.unit_price)
    }
}

/// Ordered, never-empty list of line items.
///
/// Every mutation either fully succeeds or leaves the store untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<LineItem>", try_from = "Vec<LineItem>")]
pub struct LineItemStore {
    items: Vec<LineItem>,
}

impl LineItemStore {
    /// Store holding a single blank row.
    pub fn new() -> Self {
        Self {
            items: vec![LineItem::default()],
        }
    }

    pub fn from_items(items: Vec<LineItem>) -> DomainResult<Self> {
        if items.is_empty() {
            return Err(DomainError::validation("At least one item is required"));
        }
        Ok(Self { items })
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter()
    }

    /// Append a blank row.
    pub fn add_item(&mut self) -> usize {
        self.items.push(LineItem::default());
        self.items.len() - 1
    }

    pub fn remove_item(&mut self, index: usize) -> DomainResult<LineItem> {
        self.ensure_index(index)?;
        if self.items.len() <= 1 {
            return Err(DomainError::invalid_operation(
                "at least one item required",
            ));
        }
        Ok(self.items.remove(index))
    }

    /// Set quantity and unit price; amount is recomputed in the same step.
    pub fn update_item(
        &mut self,
        index: usize,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> DomainResult<&LineItem> {
        self.ensure_index(index)?;
        let item = &mut self.items[index];
        item.set_pricing(quantity, unit_price)?;
        Ok(item)
    }

    pub fn update_description(
        &mut self,
        index: usize,
        description: impl Into<String>,
    ) -> DomainResult<&LineItem> {
        self.ensure_index(index)?;
        let item = &mut self.items[index];
        item.description = description.into();
        Ok(item)
    }

    fn ensure_index(&self, index: usize) -> DomainResult<()> {
        if index >= self.items.len() {
            return Err(DomainError::invalid_operation(format!(
                "no line item at position {index}"
            )));
        }
        Ok(())
    }
}

impl TryFrom<Vec<LineItem>> for LineItemStore {
    type Error = DomainError;

    fn try_from(items: Vec<LineItem>) -> Result<Self, Self::Error> {
        Self::from_items(items)
    }
}

impl From<LineItemStore> for Vec<LineItem> {
    fn from(store: LineItemStore) -> Self {
        store.items
    }
}

impl Default for LineItemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a LineItemStore {
    type Item = &'a LineItem;
    type IntoIter = core::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

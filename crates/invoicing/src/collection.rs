//! Ordered, in-memory set of invoices.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use charterwise_core::{Aggregate, DomainError, DomainResult};

use crate::invoice::{Invoice, InvoiceCommand, InvoiceEvent, InvoiceId};

/// Single source of truth for a session's invoices.
///
/// Insertion order is creation order. Every mutation goes through the
/// invoice aggregate, so totals are always re-derived and a rejected command
/// leaves the stored invoice exactly as it was.
#[derive(Debug, Default, Clone)]
pub struct InvoiceCollection {
    invoices: Vec<Invoice>,
    index: HashMap<InvoiceId, usize>,
}

impl InvoiceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a created invoice. Ids must be unique.
    pub fn add(&mut self, invoice: Invoice) -> DomainResult<()> {
        if !invoice.is_created() {
            return Err(DomainError::invalid_operation(
                "only created invoices can be stored",
            ));
        }
        let id = invoice.id_typed();
        if self.index.contains_key(&id) {
            return Err(DomainError::conflict(format!("duplicate invoice id {id}")));
        }
        self.index.insert(id, self.invoices.len());
        self.invoices.push(invoice);
        Ok(())
    }

    /// Mark an invoice verified.
    ///
    /// Unknown ids yield `NotFound` with nothing changed; an already verified
    /// invoice yields no events.
    pub fn verify(
        &mut self,
        id: InvoiceId,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Vec<InvoiceEvent>> {
        self.execute(id, &InvoiceCommand::Verify { occurred_at })
    }

    /// Run a command against a stored invoice in place.
    pub fn execute(
        &mut self,
        id: InvoiceId,
        command: &InvoiceCommand,
    ) -> DomainResult<Vec<InvoiceEvent>> {
        let position = *self.index.get(&id).ok_or_else(DomainError::not_found)?;
        self.invoices[position].execute(command)
    }

    pub fn find_by_id(&self, id: InvoiceId) -> Option<&Invoice> {
        self.index.get(&id).map(|&position| &self.invoices[position])
    }

    /// Invoice numbers are only softly unique; this returns every match.
    pub fn find_by_number<'a>(&'a self, invoice_number: &'a str) -> impl Iterator<Item = &'a Invoice> {
        self.invoices
            .iter()
            .filter(move |invoice| invoice.invoice_number() == invoice_number)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Invoice> {
        self.invoices.iter()
    }

    pub fn as_slice(&self) -> &[Invoice] {
        &self.invoices
    }

    pub fn len(&self) -> usize {
        self.invoices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invoices.is_empty()
    }
}

impl<'a> IntoIterator for &'a InvoiceCollection {
    type Item = &'a Invoice;
    type IntoIter = core::slice::Iter<'a, Invoice>;

    fn into_iter(self) -> Self::IntoIter {
        self.invoices.iter()
    }
}

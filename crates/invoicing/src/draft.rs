//! Editable invoice draft backing the creation form.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use rust_decimal::Decimal;

use charterwise_core::DomainResult;

use crate::invoice::{Invoice, InvoiceId, NewInvoice};
use crate::ledger::LineItemLedger;
use crate::line_item::LineItem;
use crate::money::TaxRate;
use crate::totals::Totals;

pub const DEFAULT_TAX_RATE_PERCENT: i64 = 10;
pub const DEFAULT_DUE_DAYS: u32 = 30;

/// `INV-YYYY-MMDD` for the given day.
pub fn default_invoice_number(today: NaiveDate) -> String {
    format!("INV-{}-{:02}{:02}", today.year(), today.month(), today.day())
}

/// A draft accepts any input while being edited; rules are applied only by
/// [`InvoiceDraft::submit`]. Totals track the items and tax rate at all times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDraft {
    invoice_number: String,
    date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
    client_name: String,
    client_email: String,
    client_address: String,
    ledger: LineItemLedger,
}

impl InvoiceDraft {
    pub fn new(today: NaiveDate) -> Self {
        Self::with_defaults(
            today,
            TaxRate::new(Decimal::from(DEFAULT_TAX_RATE_PERCENT)),
            DEFAULT_DUE_DAYS,
        )
    }

    pub fn with_defaults(today: NaiveDate, tax_rate: TaxRate, due_days: u32) -> Self {
        Self {
            invoice_number: default_invoice_number(today),
            date: Some(today),
            due_date: today.checked_add_days(Days::new(u64::from(due_days))),
            client_name: String::new(),
            client_email: String::new(),
            client_address: String::new(),
            ledger: LineItemLedger::blank(tax_rate),
        }
    }

    pub fn invoice_number(&self) -> &str {
        &self.invoice_number
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    pub fn client_address(&self) -> &str {
        &self.client_address
    }

    pub fn items(&self) -> &[LineItem] {
        self.ledger.items()
    }

    pub fn tax_rate(&self) -> TaxRate {
        self.ledger.tax_rate()
    }

    pub fn totals(&self) -> Totals {
        self.ledger.totals()
    }

    pub fn set_invoice_number(&mut self, value: impl Into<String>) {
        self.invoice_number = value.into();
    }

    pub fn set_date(&mut self, value: Option<NaiveDate>) {
        self.date = value;
    }

    pub fn set_due_date(&mut self, value: Option<NaiveDate>) {
        self.due_date = value;
    }

    pub fn set_client_name(&mut self, value: impl Into<String>) {
        self.client_name = value.into();
    }

    pub fn set_client_email(&mut self, value: impl Into<String>) {
        self.client_email = value.into();
    }

    pub fn set_client_address(&mut self, value: impl Into<String>) {
        self.client_address = value.into();
    }

    pub fn add_item(&mut self) -> DomainResult<usize> {
        self.ledger.add_item()
    }

    pub fn remove_item(&mut self, index: usize) -> DomainResult<LineItem> {
        self.ledger.remove_item(index)
    }

    pub fn update_item(
        &mut self,
        index: usize,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> DomainResult<()> {
        self.ledger.update_item(index, quantity, unit_price)
    }

    pub fn update_description(
        &mut self,
        index: usize,
        description: impl Into<String>,
    ) -> DomainResult<()> {
        self.ledger.update_description(index, description)
    }

    /// Accepts out-of-range rates; they fail at submission.
    pub fn set_tax_rate(&mut self, tax_rate: TaxRate) -> DomainResult<()> {
        self.ledger.set_tax_rate(tax_rate)
    }

    pub fn to_new_invoice(&self) -> NewInvoice {
        NewInvoice {
            invoice_number: self.invoice_number.clone(),
            date: self.date,
            due_date: self.due_date,
            client_name: self.client_name.clone(),
            client_email: Some(self.client_email.clone()),
            client_address: Some(self.client_address.clone()),
            items: self.ledger.items().to_vec(),
            tax_rate: self.ledger.tax_rate(),
        }
    }

    /// Validate and turn the draft into a `Pending` invoice.
    ///
    /// The draft itself is left untouched either way.
    pub fn submit(&self, invoice_id: InvoiceId, occurred_at: DateTime<Utc>) -> DomainResult<Invoice> {
        Invoice::create(invoice_id, self.to_new_invoice(), occurred_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::InvoiceStatus;
    use charterwise_core::DomainError;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 7).unwrap()
    }

    #[test]
    fn new_draft_is_prefilled() {
        let draft = InvoiceDraft::new(today());
        assert_eq!(draft.invoice_number(), "INV-2026-0307");
        assert_eq!(draft.date(), Some(today()));
        assert_eq!(draft.due_date(), NaiveDate::from_ymd_opt(2026, 4, 6));
        assert_eq!(draft.tax_rate(), TaxRate::new(dec!(10)));
        assert_eq!(draft.items().len(), 1);
        assert_eq!(draft.totals(), Totals::default());
    }

    #[test]
    fn totals_track_edits() {
        let mut draft = InvoiceDraft::new(today());
        draft.update_item(0, dec!(2), dec!(100)).unwrap();
        assert_eq!(draft.totals().total, dec!(220));

        let idx = draft.add_item().unwrap();
        draft.update_item(idx, dec!(1), dec!(50)).unwrap();
        assert_eq!(draft.totals().subtotal, dec!(250));

        draft.set_tax_rate(TaxRate::new(dec!(0))).unwrap();
        assert_eq!(draft.totals().total, dec!(250));

        draft.remove_item(0).unwrap();
        assert_eq!(draft.totals().total, dec!(50));
    }

    #[test]
    fn removing_last_row_is_rejected() {
        let mut draft = InvoiceDraft::new(today());
        let err = draft.remove_item(0).unwrap_err();
        assert_eq!(err, DomainError::invalid_operation("at least one item required"));
        assert_eq!(draft.items().len(), 1);
    }

    #[test]
    fn untouched_draft_fails_submission() {
        let draft = InvoiceDraft::new(today());
        let err = draft.submit(InvoiceId::generate(), Utc::now()).unwrap_err();
        match err {
            DomainError::Validation(msg) => {
                assert!(msg.contains("Client name is required"));
                assert!(msg.contains("item 1: Description is required"));
            }
            other => panic!("Expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_rate_is_held_until_submit() {
        let mut draft = InvoiceDraft::new(today());
        draft.set_client_name("Acme");
        draft.update_description(0, "Audit").unwrap();
        draft.update_item(0, dec!(1), dec!(10)).unwrap();
        draft.set_tax_rate(TaxRate::new(dec!(150))).unwrap();
        assert_eq!(draft.totals().total, dec!(25));

        let err = draft.submit(InvoiceId::generate(), Utc::now()).unwrap_err();
        assert_eq!(err, DomainError::validation("Tax rate cannot exceed 100%"));
    }

    #[test]
    fn submit_creates_pending_invoice() {
        let mut draft = InvoiceDraft::new(today());
        draft.set_client_name("Acme Ltd");
        draft.set_client_email("ops@acme.test");
        draft.update_description(0, "Service A").unwrap();
        draft.update_item(0, dec!(2), dec!(100)).unwrap();

        let id = InvoiceId::generate();
        let invoice = draft.submit(id, Utc::now()).unwrap();
        assert_eq!(invoice.id_typed(), id);
        assert_eq!(invoice.status(), InvoiceStatus::Pending);
        assert_eq!(invoice.total(), dec!(220));
        assert_eq!(invoice.file_name(), "invoice-INV-2026-0307.pdf");
        assert_eq!(invoice.client().address, None);
    }

    #[test]
    fn cleared_dates_fail_submission() {
        let mut draft = InvoiceDraft::new(today());
        draft.set_client_name("Acme");
        draft.update_description(0, "Audit").unwrap();
        draft.set_date(None);
        let err = draft.submit(InvoiceId::generate(), Utc::now()).unwrap_err();
        assert_eq!(err, DomainError::validation("Date is required"));
    }
}

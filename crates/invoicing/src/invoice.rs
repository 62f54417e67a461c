use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use charterwise_core::{Aggregate, AggregateId, AggregateRoot, DomainError};
use charterwise_events::Event;

use crate::email::EmailAddress;
use crate::extraction::ExtractedInvoice;
use crate::ledger::LineItemLedger;
use crate::line_item::{LineItem, LineItemStore};
use crate::money::TaxRate;
use crate::totals::Totals;

/// Invoice identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(pub AggregateId);

impl InvoiceId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }

    /// Fresh time-ordered id.
    pub fn generate() -> Self {
        Self(AggregateId::new())
    }
}

impl core::fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl core::str::FromStr for InvoiceId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Invoice status lifecycle.
///
/// `Pending` (manual entry) and `Processed` (extracted from a file) are entry
/// states. Both move forward to `Verified`, which is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Processed,
    Verified,
}

impl InvoiceStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, InvoiceStatus::Verified)
    }

    pub fn can_transition_to(&self, next: InvoiceStatus) -> bool {
        matches!(
            (self, next),
            (InvoiceStatus::Pending, InvoiceStatus::Verified)
                | (InvoiceStatus::Processed, InvoiceStatus::Verified)
        )
    }

    /// Position along the lifecycle; never decreases for a given invoice.
    pub fn rank(&self) -> u8 {
        match self {
            InvoiceStatus::Pending | InvoiceStatus::Processed => 0,
            InvoiceStatus::Verified => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Processed => "processed",
            InvoiceStatus::Verified => "verified",
        }
    }
}

impl core::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who the invoice is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClientDetails {
    pub name: String,
    pub email: Option<EmailAddress>,
    pub address: Option<String>,
}

/// Candidate payload for the manual creation path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInvoice {
    pub invoice_number: String,
    pub date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub client_name: String,
    pub client_email: Option<String>,
    pub client_address: Option<String>,
    pub items: Vec<LineItem>,
    pub tax_rate: TaxRate,
}

/// Command: CreateInvoice (manual path, lands in `Pending`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateInvoice {
    pub invoice_id: InvoiceId,
    pub payload: NewInvoice,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordExtraction (upload path, lands in `Processed`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordExtraction {
    pub invoice_id: InvoiceId,
    pub invoice_number: String,
    pub tax_rate: TaxRate,
    pub extracted: ExtractedInvoice,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceCommand {
    Create(CreateInvoice),
    RecordExtraction(RecordExtraction),
    AddItem {
        occurred_at: DateTime<Utc>,
    },
    RemoveItem {
        index: usize,
        occurred_at: DateTime<Utc>,
    },
    UpdateItem {
        index: usize,
        quantity: Decimal,
        unit_price: Decimal,
        occurred_at: DateTime<Utc>,
    },
    UpdateDescription {
        index: usize,
        description: String,
        occurred_at: DateTime<Utc>,
    },
    SetTaxRate {
        tax_rate: TaxRate,
        occurred_at: DateTime<Utc>,
    },
    Verify {
        occurred_at: DateTime<Utc>,
    },
}

/// Event: InvoiceCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceCreated {
    pub invoice_id: InvoiceId,
    pub invoice_number: String,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    pub client: ClientDetails,
    pub items: LineItemStore,
    pub tax_rate: TaxRate,
    pub totals: Totals,
    pub status: InvoiceStatus,
    pub file_name: String,
    pub occurred_at: DateTime<Utc>,
}

/// Which line-item mutation produced a [`LineItemsChanged`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum LineItemChange {
    Added { index: usize },
    Removed { index: usize },
    Repriced { index: usize },
    Described { index: usize },
    TaxRateChanged,
}

/// Event: LineItemsChanged. Carries the full post-change snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemsChanged {
    pub invoice_id: InvoiceId,
    pub change: LineItemChange,
    pub items: LineItemStore,
    pub tax_rate: TaxRate,
    pub totals: Totals,
    pub occurred_at: DateTime<Utc>,
}

/// Event: InvoiceVerified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceVerified {
    pub invoice_id: InvoiceId,
    pub previous_status: InvoiceStatus,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceEvent {
    InvoiceCreated(InvoiceCreated),
    LineItemsChanged(LineItemsChanged),
    InvoiceVerified(InvoiceVerified),
}

impl Event for InvoiceEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InvoiceEvent::InvoiceCreated(_) => "invoicing.invoice.created",
            InvoiceEvent::LineItemsChanged(_) => "invoicing.invoice.line_items_changed",
            InvoiceEvent::InvoiceVerified(_) => "invoicing.invoice.verified",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InvoiceEvent::InvoiceCreated(e) => e.occurred_at,
            InvoiceEvent::LineItemsChanged(e) => e.occurred_at,
            InvoiceEvent::InvoiceVerified(e) => e.occurred_at,
        }
    }
}

/// Aggregate root: Invoice.
///
/// Owns its line items and derived totals as one consistency unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    id: InvoiceId,
    invoice_number: String,
    date: NaiveDate,
    due_date: NaiveDate,
    client: ClientDetails,
    ledger: LineItemLedger,
    status: InvoiceStatus,
    file_name: String,
    version: u64,
    created: bool,
}

impl Invoice {
    /// Create an empty, not-yet-created aggregate instance.
    pub fn empty(id: InvoiceId) -> Self {
        Self {
            id,
            invoice_number: String::new(),
            date: NaiveDate::default(),
            due_date: NaiveDate::default(),
            client: ClientDetails::default(),
            ledger: LineItemLedger::default(),
            status: InvoiceStatus::Pending,
            file_name: String::new(),
            version: 0,
            created: false,
        }
    }

    /// Manual path: validate `payload` and build a `Pending` invoice.
    pub fn create(
        id: InvoiceId,
        payload: NewInvoice,
        occurred_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let mut invoice = Self::empty(id);
        invoice.execute(&InvoiceCommand::Create(CreateInvoice {
            invoice_id: id,
            payload,
            occurred_at,
        }))?;
        Ok(invoice)
    }

    /// Upload path: build a `Processed` invoice from extracted data.
    pub fn from_extraction(
        id: InvoiceId,
        invoice_number: impl Into<String>,
        tax_rate: TaxRate,
        extracted: ExtractedInvoice,
        occurred_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let mut invoice = Self::empty(id);
        invoice.execute(&InvoiceCommand::RecordExtraction(RecordExtraction {
            invoice_id: id,
            invoice_number: invoice_number.into(),
            tax_rate,
            extracted,
            occurred_at,
        }))?;
        Ok(invoice)
    }

    pub fn id_typed(&self) -> InvoiceId {
        self.id
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    pub fn invoice_number(&self) -> &str {
        &self.invoice_number
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    pub fn client(&self) -> &ClientDetails {
        &self.client
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

    pub fn subtotal(&self) -> Decimal {
        self.ledger.totals().subtotal
    }

    pub fn tax(&self) -> Decimal {
        self.ledger.totals().tax
    }

    pub fn total(&self) -> Decimal {
        self.ledger.totals().total
    }

    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl AggregateRoot for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl Aggregate for Invoice {
    type Command = InvoiceCommand;
    type Event = InvoiceEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            InvoiceEvent::InvoiceCreated(e) => {
                self.id = e.invoice_id;
                self.invoice_number = e.invoice_number.clone();
                self.date = e.date;
                self.due_date = e.due_date;
                self.client = e.client.clone();
                self.ledger = LineItemLedger::restore(e.items.clone(), e.tax_rate, e.totals);
                self.status = e.status;
                self.file_name = e.file_name.clone();
                self.created = true;
            }
            InvoiceEvent::LineItemsChanged(e) => {
                self.ledger = LineItemLedger::restore(e.items.clone(), e.tax_rate, e.totals);
            }
            InvoiceEvent::InvoiceVerified(_) => {
                self.status = InvoiceStatus::Verified;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            InvoiceCommand::Create(cmd) => self.handle_create(cmd),
            InvoiceCommand::RecordExtraction(cmd) => self.handle_record_extraction(cmd),
            InvoiceCommand::AddItem { occurred_at } => {
                self.change_items(*occurred_at, |ledger| {
                    ledger
                        .add_item()
                        .map(|index| LineItemChange::Added { index })
                })
            }
            InvoiceCommand::RemoveItem { index, occurred_at } => {
                self.change_items(*occurred_at, |ledger| {
                    ledger
                        .remove_item(*index)
                        .map(|_| LineItemChange::Removed { index: *index })
                })
            }
            InvoiceCommand::UpdateItem {
                index,
                quantity,
                unit_price,
                occurred_at,
            } => self.change_items(*occurred_at, |ledger| {
                ledger
                    .update_item(*index, *quantity, *unit_price)
                    .map(|_| LineItemChange::Repriced { index: *index })
            }),
            InvoiceCommand::UpdateDescription {
                index,
                description,
                occurred_at,
            } => self.change_items(*occurred_at, |ledger| {
                ledger
                    .update_description(*index, description.clone())
                    .map(|_| LineItemChange::Described { index: *index })
            }),
            InvoiceCommand::SetTaxRate {
                tax_rate,
                occurred_at,
            } => {
                tax_rate.validate()?;
                self.change_items(*occurred_at, |ledger| {
                    ledger
                        .set_tax_rate(*tax_rate)
                        .map(|_| LineItemChange::TaxRateChanged)
                })
            }
            InvoiceCommand::Verify { occurred_at } => self.handle_verify(*occurred_at),
        }
    }
}

fn required(value: &str, message: &str, problems: &mut Vec<String>) {
    if value.trim().is_empty() {
        problems.push(message.to_string());
    }
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl Invoice {
    fn ensure_not_created(&self) -> Result<(), DomainError> {
        if self.created {
            return Err(DomainError::conflict("invoice already exists"));
        }
        Ok(())
    }

    fn ensure_invoice_id(&self, invoice_id: InvoiceId) -> Result<(), DomainError> {
        if self.id != invoice_id {
            return Err(DomainError::invalid_id("invoice_id mismatch"));
        }
        Ok(())
    }

    fn ensure_mutable(&self) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        if self.status.is_terminal() {
            return Err(DomainError::invalid_operation(
                "verified invoices are read-only",
            ));
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateInvoice) -> Result<Vec<InvoiceEvent>, DomainError> {
        self.ensure_not_created()?;
        self.ensure_invoice_id(cmd.invoice_id)?;

        let p = &cmd.payload;
        let mut problems = Vec::new();

        required(&p.invoice_number, "Invoice number is required", &mut problems);
        if p.date.is_none() {
            problems.push("Date is required".to_string());
        }
        if p.due_date.is_none() {
            problems.push("Due date is required".to_string());
        }
        required(&p.client_name, "Client name is required", &mut problems);

        let email = match EmailAddress::parse_optional(p.client_email.as_deref()) {
            Ok(email) => email,
            Err(_) => {
                problems.push("Invalid email".to_string());
                None
            }
        };

        if p.items.is_empty() {
            problems.push("At least one item is required".to_string());
        }
        for (position, item) in p.items.iter().enumerate() {
            problems.extend(item.validate(position));
        }

        if let Err(DomainError::Validation(msg)) = p.tax_rate.validate() {
            problems.push(msg);
        }

        let (Some(date), Some(due_date)) = (p.date, p.due_date) else {
            return Err(DomainError::validation(problems.join("; ")));
        };
        if !problems.is_empty() {
            return Err(DomainError::validation(problems.join("; ")));
        }

        let ledger = LineItemLedger::new(LineItemStore::from_items(p.items.clone())?, p.tax_rate)?;
        let invoice_number = p.invoice_number.trim().to_string();

        Ok(vec![InvoiceEvent::InvoiceCreated(InvoiceCreated {
            invoice_id: cmd.invoice_id,
            file_name: format!("invoice-{invoice_number}.pdf"),
            invoice_number,
            date,
            due_date,
            client: ClientDetails {
                name: p.client_name.trim().to_string(),
                email,
                address: non_blank(p.client_address.as_ref()),
            },
            items: ledger.store().clone(),
            tax_rate: ledger.tax_rate(),
            totals: ledger.totals(),
            status: InvoiceStatus::Pending,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_record_extraction(
        &self,
        cmd: &RecordExtraction,
    ) -> Result<Vec<InvoiceEvent>, DomainError> {
        self.ensure_not_created()?;
        self.ensure_invoice_id(cmd.invoice_id)?;

        let x = &cmd.extracted;
        let mut problems = Vec::new();
        required(&x.file_name, "file name is required", &mut problems);
        required(&cmd.invoice_number, "Invoice number is required", &mut problems);
        required(&x.client_name, "Client name is required", &mut problems);
        if x.items.is_empty() {
            problems.push("At least one item is required".to_string());
        }
        if let Err(DomainError::Validation(msg)) = cmd.tax_rate.validate() {
            problems.push(msg);
        }
        if !problems.is_empty() {
            return Err(DomainError::validation(problems.join("; ")));
        }

        // Supplied amounts are dropped here; LineItem recomputes them.
        let items = x
            .items
            .iter()
            .cloned()
            .map(LineItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let ledger = LineItemLedger::new(LineItemStore::from_items(items)?, cmd.tax_rate)?;

        Ok(vec![InvoiceEvent::InvoiceCreated(InvoiceCreated {
            invoice_id: cmd.invoice_id,
            invoice_number: cmd.invoice_number.trim().to_string(),
            date: x.date,
            due_date: x.due_date,
            client: ClientDetails {
                name: x.client_name.trim().to_string(),
                email: None,
                address: non_blank(x.client_address.as_ref()),
            },
            items: ledger.store().clone(),
            tax_rate: ledger.tax_rate(),
            totals: ledger.totals(),
            status: InvoiceStatus::Processed,
            file_name: x.file_name.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn change_items<F>(
        &self,
        occurred_at: DateTime<Utc>,
        mutate: F,
    ) -> Result<Vec<InvoiceEvent>, DomainError>
    where
        F: FnOnce(&mut LineItemLedger) -> Result<LineItemChange, DomainError>,
    {
        self.ensure_mutable()?;

        let mut next = self.ledger.clone();
        let change = mutate(&mut next)?;

        Ok(vec![InvoiceEvent::LineItemsChanged(LineItemsChanged {
            invoice_id: self.id,
            change,
            items: next.store().clone(),
            tax_rate: next.tax_rate(),
            totals: next.totals(),
            occurred_at,
        })])
    }

    fn handle_verify(&self, occurred_at: DateTime<Utc>) -> Result<Vec<InvoiceEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }

        // Already verified: idempotent no-op.
        if !self.status.can_transition_to(InvoiceStatus::Verified) {
            return Ok(vec![]);
        }

        Ok(vec![InvoiceEvent::InvoiceVerified(InvoiceVerified {
            invoice_id: self.id,
            previous_status: self.status,
            occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_item::LineItemInput;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn test_invoice_id() -> InvoiceId {
        InvoiceId::generate()
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn service_a() -> NewInvoice {
        NewInvoice {
            invoice_number: "INV-2026-1019".to_string(),
            date: Some(day(2026, 10, 19)),
            due_date: Some(day(2026, 11, 18)),
            client_name: "Acme Ltd".to_string(),
            client_email: Some("billing@acme.test".to_string()),
            client_address: Some("".to_string()),
            items: vec![LineItem::new("Service A", dec!(2), dec!(100)).unwrap()],
            tax_rate: TaxRate::new(dec!(10)),
        }
    }

    fn sample_extraction() -> ExtractedInvoice {
        ExtractedInvoice {
            file_name: "scan.pdf".to_string(),
            invoice_number: None,
            client_name: "Example Client Ltd.".to_string(),
            client_address: Some("123 Business Street, City, Country".to_string()),
            date: day(2026, 10, 19),
            due_date: day(2026, 11, 18),
            items: vec![
                LineItemInput {
                    description: "Accounting Services".to_string(),
                    quantity: dec!(1),
                    unit_price: dec!(500),
                    amount: Some(dec!(500)),
                },
                LineItemInput {
                    description: "Tax Consultation".to_string(),
                    quantity: dec!(2),
                    unit_price: dec!(250),
                    amount: Some(dec!(1)),
                },
            ],
            tax_rate: None,
        }
    }

    fn validation_message(err: DomainError) -> String {
        match err {
            DomainError::Validation(msg) => msg,
            other => panic!("Expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn create_emits_invoice_created_with_totals() {
        let id = test_invoice_id();
        let invoice = Invoice::empty(id);
        let events = invoice
            .handle(&InvoiceCommand::Create(CreateInvoice {
                invoice_id: id,
                payload: service_a(),
                occurred_at: test_time(),
            }))
            .unwrap();
        assert_eq!(events.len(), 1);

        match &events[0] {
            InvoiceEvent::InvoiceCreated(e) => {
                assert_eq!(e.invoice_id, id);
                assert_eq!(e.status, InvoiceStatus::Pending);
                assert_eq!(e.totals.subtotal, dec!(200));
                assert_eq!(e.totals.tax, dec!(20));
                assert_eq!(e.totals.total, dec!(220));
                assert_eq!(e.file_name, "invoice-INV-2026-1019.pdf");
                assert_eq!(e.client.address, None);
                assert_eq!(e.client.email.as_ref().unwrap().as_str(), "billing@acme.test");
            }
            _ => panic!("Expected InvoiceCreated event"),
        }
        assert_eq!(events[0].event_type(), "invoicing.invoice.created");
    }

    #[test]
    fn create_populates_pending_invoice() {
        let invoice = Invoice::create(test_invoice_id(), service_a(), test_time()).unwrap();
        assert!(invoice.is_created());
        assert_eq!(invoice.status(), InvoiceStatus::Pending);
        assert_eq!(invoice.subtotal(), dec!(200));
        assert_eq!(invoice.tax(), dec!(20));
        assert_eq!(invoice.total(), dec!(220));
        assert_eq!(invoice.version(), 1);
    }

    #[test]
    fn create_collects_every_validation_problem() {
        let payload = NewInvoice {
            invoice_number: " ".to_string(),
            date: None,
            due_date: None,
            client_name: String::new(),
            client_email: Some("not-an-email".to_string()),
            client_address: None,
            items: vec![LineItem::new("", dec!(0), dec!(-1)).unwrap()],
            tax_rate: TaxRate::new(dec!(101)),
        };
        let msg = validation_message(
            Invoice::create(test_invoice_id(), payload, test_time()).unwrap_err(),
        );
        for expected in [
            "Invoice number is required",
            "Date is required",
            "Due date is required",
            "Client name is required",
            "Invalid email",
            "item 1: Description is required",
            "item 1: Quantity must be greater than 0",
            "item 1: Unit price cannot be negative",
            "Tax rate cannot exceed 100%",
        ] {
            assert!(msg.contains(expected), "missing {expected:?} in {msg:?}");
        }
    }

    #[test]
    fn create_rejects_empty_items() {
        let mut payload = service_a();
        payload.items.clear();
        let msg = validation_message(
            Invoice::create(test_invoice_id(), payload, test_time()).unwrap_err(),
        );
        assert_eq!(msg, "At least one item is required");
    }

    #[test]
    fn create_accepts_blank_email_and_due_date_before_date() {
        let mut payload = service_a();
        payload.client_email = Some(String::new());
        payload.due_date = Some(day(2026, 1, 1));
        let invoice = Invoice::create(test_invoice_id(), payload, test_time()).unwrap();
        assert_eq!(invoice.client().email, None);
        assert!(invoice.due_date() < invoice.date());
    }

    #[test]
    fn cannot_create_twice() {
        let id = test_invoice_id();
        let invoice = Invoice::create(id, service_a(), test_time()).unwrap();
        let err = invoice
            .handle(&InvoiceCommand::Create(CreateInvoice {
                invoice_id: id,
                payload: service_a(),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert_eq!(err, DomainError::conflict("invoice already exists"));
    }

    #[test]
    fn update_item_recomputes_amount_and_totals() {
        let mut invoice = Invoice::create(test_invoice_id(), service_a(), test_time()).unwrap();
        let events = invoice
            .execute(&InvoiceCommand::UpdateItem {
                index: 0,
                quantity: dec!(3),
                unit_price: dec!(50),
                occurred_at: test_time(),
            })
            .unwrap();

        match &events[0] {
            InvoiceEvent::LineItemsChanged(e) => {
                assert_eq!(e.change, LineItemChange::Repriced { index: 0 });
            }
            _ => panic!("Expected LineItemsChanged event"),
        }
        assert_eq!(invoice.items()[0].amount(), dec!(150));
        assert_eq!(invoice.subtotal(), dec!(150));
        assert_eq!(invoice.tax(), dec!(15));
        assert_eq!(invoice.total(), dec!(165));
        assert_eq!(invoice.version(), 2);
    }

    #[test]
    fn removing_only_item_is_rejected() {
        let mut invoice = Invoice::create(test_invoice_id(), service_a(), test_time()).unwrap();
        let before = invoice.clone();

        let err = invoice
            .execute(&InvoiceCommand::RemoveItem {
                index: 0,
                occurred_at: test_time(),
            })
            .unwrap_err();
        match err {
            DomainError::InvalidOperation(msg) if msg.contains("at least one item required") => {}
            _ => panic!("Expected InvalidOperation for removing the last item"),
        }
        assert_eq!(invoice, before);
        assert_eq!(invoice.items().len(), 1);
    }

    #[test]
    fn description_and_tax_rate_changes() {
        let mut invoice = Invoice::create(test_invoice_id(), service_a(), test_time()).unwrap();
        invoice
            .execute(&InvoiceCommand::UpdateDescription {
                index: 0,
                description: "Service B".to_string(),
                occurred_at: test_time(),
            })
            .unwrap();
        invoice
            .execute(&InvoiceCommand::SetTaxRate {
                tax_rate: TaxRate::new(dec!(20)),
                occurred_at: test_time(),
            })
            .unwrap();
        assert_eq!(invoice.items()[0].description(), "Service B");
        assert_eq!(invoice.total(), dec!(240));

        let err = invoice
            .execute(&InvoiceCommand::SetTaxRate {
                tax_rate: TaxRate::new(dec!(-1)),
                occurred_at: test_time(),
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(invoice.total(), dec!(240));
    }

    #[test]
    fn extraction_lands_processed_with_recomputed_amounts() {
        let invoice = Invoice::from_extraction(
            test_invoice_id(),
            "INV4821",
            TaxRate::new(dec!(20)),
            sample_extraction(),
            test_time(),
        )
        .unwrap();
        assert_eq!(invoice.status(), InvoiceStatus::Processed);
        assert_eq!(invoice.items()[1].amount(), dec!(500));
        assert_eq!(invoice.subtotal(), dec!(1000));
        assert_eq!(invoice.tax(), dec!(200));
        assert_eq!(invoice.total(), dec!(1200));
        assert_eq!(invoice.file_name(), "scan.pdf");
    }

    #[test]
    fn extraction_without_items_is_rejected() {
        let mut extracted = sample_extraction();
        extracted.items.clear();
        let err = Invoice::from_extraction(
            test_invoice_id(),
            "INV1",
            TaxRate::new(dec!(20)),
            extracted,
            test_time(),
        )
        .unwrap_err();
        assert_eq!(err, DomainError::validation("At least one item is required"));
    }

    #[test]
    fn verify_moves_to_terminal_and_is_idempotent() {
        let mut invoice = Invoice::create(test_invoice_id(), service_a(), test_time()).unwrap();
        let events = invoice
            .execute(&InvoiceCommand::Verify {
                occurred_at: test_time(),
            })
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(invoice.status(), InvoiceStatus::Verified);

        let snapshot = invoice.clone();
        let events = invoice
            .execute(&InvoiceCommand::Verify {
                occurred_at: test_time(),
            })
            .unwrap();
        assert!(events.is_empty());
        assert_eq!(invoice, snapshot);
    }

    #[test]
    fn verified_invoice_is_read_only() {
        let mut invoice = Invoice::create(test_invoice_id(), service_a(), test_time()).unwrap();
        invoice
            .execute(&InvoiceCommand::Verify {
                occurred_at: test_time(),
            })
            .unwrap();
        let err = invoice
            .execute(&InvoiceCommand::AddItem {
                occurred_at: test_time(),
            })
            .unwrap_err();
        assert_eq!(err, DomainError::invalid_operation("verified invoices are read-only"));
    }

    #[test]
    fn commands_on_uncreated_invoice_are_not_found() {
        let invoice = Invoice::empty(test_invoice_id());
        assert_eq!(
            invoice
                .handle(&InvoiceCommand::Verify {
                    occurred_at: test_time()
                })
                .unwrap_err(),
            DomainError::NotFound
        );
        assert_eq!(
            invoice
                .handle(&InvoiceCommand::AddItem {
                    occurred_at: test_time()
                })
                .unwrap_err(),
            DomainError::NotFound
        );
    }

    #[test]
    fn status_transitions() {
        use InvoiceStatus::*;
        assert!(Pending.can_transition_to(Verified));
        assert!(Processed.can_transition_to(Verified));
        assert!(!Verified.can_transition_to(Verified));
        assert!(!Verified.can_transition_to(Pending));
        assert!(!Processed.can_transition_to(Pending));
        assert!(Verified.is_terminal());
    }

    fn command_strategy() -> impl Strategy<Value = u8> {
        0u8..6
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Status never moves backward and items never become empty,
        /// whatever mix of commands is thrown at an invoice.
        #[test]
        fn status_is_monotonic_and_items_non_empty(
            start_processed in any::<bool>(),
            cmds in prop::collection::vec((command_strategy(), 0usize..4, 1i64..10_000), 0..30)
        ) {
            let mut invoice = if start_processed {
                Invoice::from_extraction(test_invoice_id(), "INV9", TaxRate::new(dec!(20)), sample_extraction(), test_time()).unwrap()
            } else {
                Invoice::create(test_invoice_id(), service_a(), test_time()).unwrap()
            };

            for (kind, index, value) in cmds {
                let occurred_at = test_time();
                let cmd = match kind {
                    0 => InvoiceCommand::AddItem { occurred_at },
                    1 => InvoiceCommand::RemoveItem { index, occurred_at },
                    2 => InvoiceCommand::UpdateItem { index, quantity: Decimal::new(value, 2), unit_price: Decimal::new(value, 1), occurred_at },
                    3 => InvoiceCommand::UpdateDescription { index, description: format!("line {value}"), occurred_at },
                    4 => InvoiceCommand::SetTaxRate { tax_rate: TaxRate::new(Decimal::new(value % 10_001, 2)), occurred_at },
                    _ => InvoiceCommand::Verify { occurred_at },
                };

                let before = invoice.status();
                let _ = invoice.execute(&cmd);
                prop_assert!(invoice.status().rank() >= before.rank());
                prop_assert!(!invoice.items().is_empty());
                let expected = Totals::calculate(invoice.items(), invoice.tax_rate()).unwrap();
                prop_assert_eq!(invoice.totals(), expected);
            }
        }
    }
}

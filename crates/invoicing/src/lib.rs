//! Invoice ledger engine.
//!
//! Line items, derived totals, the invoice lifecycle and the ordered
//! collection that owns every invoice of a session. Pure domain logic: no IO,
//! no clocks, no async.

pub mod collection;
pub mod draft;
pub mod email;
pub mod extraction;
pub mod invoice;
pub mod ledger;
pub mod line_item;
pub mod money;
pub mod totals;

pub use collection::InvoiceCollection;
pub use draft::{DEFAULT_DUE_DAYS, DEFAULT_TAX_RATE_PERCENT, InvoiceDraft, default_invoice_number};
pub use email::EmailAddress;
pub use extraction::{ExtractedInvoice, MediaType, UploadedFile};
pub use invoice::{
    ClientDetails, CreateInvoice, Invoice, InvoiceCommand, InvoiceCreated, InvoiceEvent,
    InvoiceId, InvoiceStatus, InvoiceVerified, LineItemChange, LineItemsChanged, NewInvoice,
    RecordExtraction,
};
pub use ledger::LineItemLedger;
pub use line_item::{LineItem, LineItemInput, LineItemStore};
pub use money::{Money, TaxRate};
pub use totals::Totals;

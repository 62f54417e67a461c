//! Session facade over the invoice collection.
//!
//! One `InvoiceWorkspace` per user session. It owns the collection, routes
//! every mutation through the invoice aggregate, drives the asynchronous
//! extraction and delivery collaborators, and publishes a [`Notice`] for each
//! user-visible outcome.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info, warn};

use charterwise_ai::{AdviceCatalog, AiError, ChatMessage, FeatureTag};
use charterwise_core::DomainError;
use charterwise_events::{Event, EventBus, InMemoryEventBus, Subscription};
use charterwise_invoicing::{
    EmailAddress, Invoice, InvoiceCollection, InvoiceCommand, InvoiceDraft, InvoiceEvent,
    InvoiceId, LineItemChange, NewInvoice, TaxRate, UploadedFile, default_invoice_number,
};

use crate::chat::ChatResponder;
use crate::config::WorkspaceConfig;
use crate::delivery::{DeliveryError, Mailer, OutgoingInvoice, SimulatedMailer};
use crate::extraction::{ExtractionError, Extractor, SimulatedExtractor};
use crate::in_flight::InFlight;
use crate::notice::Notice;
use crate::settings::{
    InMemorySettingsStore, JsonFileSettingsStore, SettingsError, SettingsService, SettingsStore,
};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("{0} already in progress")]
    Busy(&'static str),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Ai(#[from] AiError),

    #[error("invoice collection lock poisoned")]
    Poisoned,
}

impl WorkflowError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Domain(DomainError::NotFound))
    }
}

pub struct InvoiceWorkspace {
    config: WorkspaceConfig,
    invoices: RwLock<InvoiceCollection>,
    notices: InMemoryEventBus<Notice>,
    settings: SettingsService,
    extractor: Arc<dyn Extractor>,
    mailer: Arc<dyn Mailer>,
    advice: AdviceCatalog,
    chat: ChatResponder,
    uploading: InFlight,
    sending: InFlight,
}

impl InvoiceWorkspace {
    pub fn new(
        config: WorkspaceConfig,
        settings: SettingsService,
        extractor: Arc<dyn Extractor>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let chat = ChatResponder::new(config.chat_reply_delay);
        Self {
            config,
            invoices: RwLock::new(InvoiceCollection::new()),
            notices: InMemoryEventBus::new(),
            settings,
            extractor,
            mailer,
            advice: AdviceCatalog::standard(),
            chat,
            uploading: InFlight::new(),
            sending: InFlight::new(),
        }
    }

    /// Simulated collaborators; settings go to `config.settings_path` when set.
    pub fn simulated(config: WorkspaceConfig) -> Self {
        let store: Arc<dyn SettingsStore> = match &config.settings_path {
            Some(path) => Arc::new(JsonFileSettingsStore::new(path.clone())),
            None => Arc::new(InMemorySettingsStore::new()),
        };
        let extractor = SimulatedExtractor::new(config.processing_delay)
            .with_due_days(config.default_due_days);
        let mailer = SimulatedMailer::new(config.send_delay);
        Self::new(
            config,
            SettingsService::load(store),
            Arc::new(extractor),
            Arc::new(mailer),
        )
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    pub fn settings(&self) -> &SettingsService {
        &self.settings
    }

    /// Receive every notice published after this call.
    pub fn subscribe(&self) -> Subscription<Notice> {
        self.notices.subscribe()
    }

    // ---- creation ----

    /// A creation form pre-filled from configuration.
    pub fn new_draft(&self, today: NaiveDate) -> InvoiceDraft {
        InvoiceDraft::with_defaults(today, self.config.default_tax_rate, self.config.default_due_days)
    }

    pub fn create_from_draft(&self, draft: &InvoiceDraft) -> Result<InvoiceId, WorkflowError> {
        self.create(draft.to_new_invoice())
    }

    /// Manual path: validate, create as `Pending`, append.
    pub fn create(&self, payload: NewInvoice) -> Result<InvoiceId, WorkflowError> {
        let id = InvoiceId::generate();
        let invoice = Invoice::create(id, payload, Utc::now()).inspect_err(|error| {
            debug!(%error, "invoice creation rejected");
        })?;
        let number = invoice.invoice_number().to_string();
        self.insert(invoice)?;

        info!(invoice = %id, number = %number, "invoice created");
        self.publish(Notice::success(
            "Invoice Created",
            format!("Invoice #{number} has been created successfully."),
        ));
        Ok(id)
    }

    /// Check the declared media type before anything is processed.
    pub fn accept_upload(
        &self,
        name: &str,
        mime: &str,
        size_bytes: u64,
    ) -> Result<UploadedFile, WorkflowError> {
        UploadedFile::new(name, mime, size_bytes).map_err(|error| {
            warn!(file = name, mime, "upload rejected");
            if let DomainError::Validation(reason) = &error {
                self.publish(Notice::error("Invalid file type", reason.clone()));
            }
            WorkflowError::from(error)
        })
    }

    /// Extraction path: one upload at a time; the new invoice is `Processed`.
    ///
    /// Any failure leaves the collection untouched and publishes a
    /// "Processing Failed" notice.
    pub async fn process_upload(
        &self,
        file: &UploadedFile,
        today: NaiveDate,
    ) -> Result<InvoiceId, WorkflowError> {
        let Some(_guard) = self.uploading.try_acquire() else {
            warn!(file = file.name(), "upload ignored, another is processing");
            return Err(WorkflowError::Busy("invoice processing"));
        };

        let result = self.extract_and_store(file, today).await;
        match &result {
            Ok(id) => info!(invoice = %id, file = file.name(), "upload processed"),
            Err(error) => {
                warn!(file = file.name(), %error, "upload processing failed");
                self.publish(Notice::error(
                    "Processing Failed",
                    "There was an error processing your invoice. Please try again.",
                ));
            }
        }
        result
    }

    async fn extract_and_store(
        &self,
        file: &UploadedFile,
        today: NaiveDate,
    ) -> Result<InvoiceId, WorkflowError> {
        let extracted = self.extractor.extract(file, today).await?;

        let number = extracted
            .invoice_number
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| default_invoice_number(today));
        let tax_rate = extracted.tax_rate.unwrap_or(self.config.default_tax_rate);

        let id = InvoiceId::generate();
        let invoice = Invoice::from_extraction(id, number.clone(), tax_rate, extracted, Utc::now())?;
        self.insert(invoice)?;

        self.publish(Notice::success(
            "Invoice Processed",
            format!("Invoice #{number} has been processed successfully."),
        ));
        Ok(id)
    }

    // ---- lifecycle ----

    /// Mark an invoice verified. Verifying twice is a silent no-op; an
    /// unknown id is `NotFound` with nothing changed.
    pub fn verify(&self, id: InvoiceId) -> Result<(), WorkflowError> {
        let events = self.write()?.verify(id, Utc::now()).inspect_err(|error| {
            debug!(invoice = %id, %error, "verify rejected");
        })?;

        if events.is_empty() {
            debug!(invoice = %id, "already verified");
            return Ok(());
        }
        info!(invoice = %id, "invoice verified");
        self.publish(Notice::success(
            "Invoice Verified",
            "The invoice data has been verified and saved.",
        ));
        Ok(())
    }

    // ---- line items ----

    /// Appends a blank row and returns its index.
    pub fn add_item(&self, id: InvoiceId) -> Result<usize, WorkflowError> {
        let events = self.run(id, InvoiceCommand::AddItem {
            occurred_at: Utc::now(),
        })?;
        events
            .iter()
            .find_map(|event| match event {
                InvoiceEvent::LineItemsChanged(changed) => match changed.change {
                    LineItemChange::Added { index } => Some(index),
                    _ => None,
                },
                _ => None,
            })
            .ok_or_else(|| DomainError::invalid_operation("no line item was added").into())
    }

    /// Refuses to drop the last item of an editable invoice and tells the
    /// user why.
    pub fn remove_item(&self, id: InvoiceId, index: usize) -> Result<(), WorkflowError> {
        let last_editable_item = self
            .find(id)
            .is_some_and(|invoice| invoice.items().len() == 1 && !invoice.status().is_terminal());
        let result = self
            .run(id, InvoiceCommand::RemoveItem {
                index,
                occurred_at: Utc::now(),
            })
            .map(|_| ());
        if last_editable_item
            && matches!(result, Err(WorkflowError::Domain(DomainError::InvalidOperation(_))))
        {
            self.publish(Notice::error(
                "Cannot Remove Item",
                "An invoice must have at least one item.",
            ));
        }
        result
    }

    pub fn update_item(
        &self,
        id: InvoiceId,
        index: usize,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Result<(), WorkflowError> {
        self.run(id, InvoiceCommand::UpdateItem {
            index,
            quantity,
            unit_price,
            occurred_at: Utc::now(),
        })
        .map(|_| ())
    }

    pub fn update_description(
        &self,
        id: InvoiceId,
        index: usize,
        description: impl Into<String>,
    ) -> Result<(), WorkflowError> {
        self.run(id, InvoiceCommand::UpdateDescription {
            index,
            description: description.into(),
            occurred_at: Utc::now(),
        })
        .map(|_| ())
    }

    pub fn set_tax_rate(&self, id: InvoiceId, tax_rate: TaxRate) -> Result<(), WorkflowError> {
        self.run(id, InvoiceCommand::SetTaxRate {
            tax_rate,
            occurred_at: Utc::now(),
        })
        .map(|_| ())
    }

    fn run(&self, id: InvoiceId, command: InvoiceCommand) -> Result<Vec<InvoiceEvent>, WorkflowError> {
        let events: Vec<InvoiceEvent> = self.write()?.execute(id, &command).inspect_err(|error| {
            warn!(invoice = %id, %error, "line item change rejected");
        })?;
        for event in &events {
            debug!(invoice = %id, event = event.event_type(), "applied");
        }
        Ok(events)
    }

    // ---- delivery ----

    /// Email an invoice. The invoice itself is not changed by sending.
    pub async fn send_invoice(
        &self,
        id: InvoiceId,
        recipient: &str,
        message: &str,
    ) -> Result<(), WorkflowError> {
        let recipient = EmailAddress::parse(recipient)?;
        let invoice_number = self
            .find(id)
            .map(|invoice| invoice.invoice_number().to_string())
            .ok_or(DomainError::NotFound)?;

        let Some(_guard) = self.sending.try_acquire() else {
            return Err(WorkflowError::Busy("invoice delivery"));
        };

        let mail = OutgoingInvoice {
            invoice_id: id,
            invoice_number,
            recipient,
            message: message.to_string(),
        };
        if let Err(error) = self.mailer.send(&mail).await {
            warn!(invoice = %id, %error, "send failed");
            self.publish(Notice::error(
                "Sending Failed",
                "There was an error sending your invoice. Please try again.",
            ));
            return Err(error.into());
        }

        info!(invoice = %id, recipient = mail.recipient.as_str(), "invoice sent");
        self.publish(Notice::success(
            "Invoice Sent",
            format!("Invoice has been sent to {}.", mail.recipient),
        ));
        Ok(())
    }

    // ---- reads ----

    /// Snapshot of every invoice in creation order.
    pub fn invoices(&self) -> Result<Vec<Invoice>, WorkflowError> {
        Ok(self.read()?.iter().cloned().collect())
    }

    /// `None` for an unknown id, and also when the collection lock is
    /// poisoned (logged).
    pub fn find(&self, id: InvoiceId) -> Option<Invoice> {
        match self.read() {
            Ok(invoices) => invoices.find_by_id(id).cloned(),
            Err(error) => {
                warn!(invoice = %id, %error, "invoice lookup failed");
                None
            }
        }
    }

    pub fn find_by_number(&self, invoice_number: &str) -> Result<Vec<Invoice>, WorkflowError> {
        Ok(self.read()?.find_by_number(invoice_number).cloned().collect())
    }

    pub fn len(&self) -> Result<usize, WorkflowError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, WorkflowError> {
        Ok(self.read()?.is_empty())
    }

    // ---- assistant ----

    /// Advice for a screen; `None` while advice is switched off.
    pub fn advice(&self, tag: FeatureTag) -> Option<&'static str> {
        self.settings
            .current()
            .advice_enabled
            .then(|| self.advice.advice_for(tag))
    }

    /// Ask the assistant. Blank questions are ignored (`Ok(None)`).
    pub async fn chat(&self, text: &str) -> Result<Option<ChatMessage>, WorkflowError> {
        if !self.settings.current().chatbot_enabled {
            return Err(AiError::Disabled("chat assistant").into());
        }
        let reply = self.chat.ask(text).await?;
        if reply.is_some() {
            self.publish(Notice::info("AI Assistant", "New AI response received"));
        }
        Ok(reply)
    }

    pub fn chat_history(&self) -> Vec<ChatMessage> {
        self.chat.messages()
    }

    // ---- internals ----

    fn insert(&self, invoice: Invoice) -> Result<(), WorkflowError> {
        let mut invoices = self.write()?;
        if invoices.find_by_number(invoice.invoice_number()).next().is_some() {
            warn!(number = invoice.invoice_number(), "duplicate invoice number");
        }
        invoices.add(invoice)?;
        Ok(())
    }

    fn publish(&self, notice: Notice) {
        if let Err(error) = self.notices.publish(notice) {
            warn!(?error, "notice dropped");
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, InvoiceCollection>, WorkflowError> {
        self.invoices.read().map_err(|_| {
            warn!("invoice collection lock poisoned");
            WorkflowError::Poisoned
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, InvoiceCollection>, WorkflowError> {
        self.invoices.write().map_err(|_| {
            warn!("invoice collection lock poisoned");
            WorkflowError::Poisoned
        })
    }
}

impl core::fmt::Debug for InvoiceWorkspace {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InvoiceWorkspace")
            .field("config", &self.config)
            .field("invoices", &self.len().ok())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

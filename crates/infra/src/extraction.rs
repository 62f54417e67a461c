//! Document extraction collaborator.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use charterwise_invoicing::{ExtractedInvoice, LineItemInput, TaxRate, UploadedFile};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("document could not be read: {0}")]
    Unreadable(String),

    #[error("extraction service unavailable: {0}")]
    Unavailable(String),
}

/// Turns an uploaded file into invoice data. Black box to the workspace.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(
        &self,
        file: &UploadedFile,
        today: NaiveDate,
    ) -> Result<ExtractedInvoice, ExtractionError>;
}

#[async_trait]
impl<E> Extractor for Arc<E>
where
    E: Extractor + ?Sized,
{
    async fn extract(
        &self,
        file: &UploadedFile,
        today: NaiveDate,
    ) -> Result<ExtractedInvoice, ExtractionError> {
        (**self).extract(file, today).await
    }
}

/// Waits, then returns the same two-line sample for any file.
#[derive(Debug)]
pub struct SimulatedExtractor {
    delay: Duration,
    due_days: u32,
    sequence: AtomicU32,
}

impl SimulatedExtractor {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            due_days: 30,
            sequence: AtomicU32::new(1),
        }
    }

    pub fn with_due_days(mut self, due_days: u32) -> Self {
        self.due_days = due_days;
        self
    }

    fn sample(&self, file: &UploadedFile, today: NaiveDate) -> Result<ExtractedInvoice, ExtractionError> {
        let due_date = today
            .checked_add_days(Days::new(u64::from(self.due_days)))
            .ok_or_else(|| ExtractionError::Unreadable("due date out of range".to_string()))?;
        let number = self.sequence.fetch_add(1, Ordering::Relaxed);

        Ok(ExtractedInvoice {
            file_name: file.name().to_string(),
            invoice_number: Some(format!("INV{number:04}")),
            client_name: "Example Client Ltd.".to_string(),
            client_address: Some("123 Business Street, City, Country".to_string()),
            date: today,
            due_date,
            items: vec![
                LineItemInput {
                    description: "Accounting Services".to_string(),
                    quantity: Decimal::ONE,
                    unit_price: Decimal::from(500),
                    amount: Some(Decimal::from(500)),
                },
                LineItemInput {
                    description: "Tax Consultation".to_string(),
                    quantity: Decimal::TWO,
                    unit_price: Decimal::from(250),
                    amount: Some(Decimal::from(500)),
                },
            ],
            tax_rate: Some(TaxRate::new(Decimal::from(20))),
        })
    }
}

#[async_trait]
impl Extractor for SimulatedExtractor {
    async fn extract(
        &self,
        file: &UploadedFile,
        today: NaiveDate,
    ) -> Result<ExtractedInvoice, ExtractionError> {
        debug!(file = file.name(), size = %file.size_label(), "extracting");
        tokio::time::sleep(self.delay).await;
        self.sample(file, today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn waits_then_returns_sample() {
        let extractor = SimulatedExtractor::new(Duration::from_secs(2));
        let file = UploadedFile::new("march.pdf", "application/pdf", 48_000).unwrap();

        let started = tokio::time::Instant::now();
        let extracted = extractor.extract(&file, today()).await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(2));

        assert_eq!(extracted.file_name, "march.pdf");
        assert_eq!(extracted.client_name, "Example Client Ltd.");
        assert_eq!(extracted.items.len(), 2);
        assert_eq!(extracted.due_date, NaiveDate::from_ymd_opt(2026, 11, 18).unwrap());
        assert_eq!(extracted.tax_rate, Some(TaxRate::new(Decimal::from(20))));
    }

    #[tokio::test(start_paused = true)]
    async fn invoice_numbers_differ_per_call() {
        let extractor = Arc::new(SimulatedExtractor::new(Duration::ZERO));
        let file = UploadedFile::new("a.png", "image/png", 1).unwrap();

        let first = extractor.extract(&file, today()).await.unwrap();
        let second = extractor.extract(&file, today()).await.unwrap();
        assert_ne!(first.invoice_number, second.invoice_number);
    }
}

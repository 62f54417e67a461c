//! Artifacts exchanged with the document-extraction collaborator.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use charterwise_core::{DomainError, DomainResult, ValueObject};

use crate::line_item::LineItemInput;
use crate::money::TaxRate;

/// Media types accepted for upload.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Pdf,
    Jpeg,
    Jpg,
    Png,
}

impl MediaType {
    pub fn parse(mime: &str) -> DomainResult<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "application/pdf" => Ok(Self::Pdf),
            "image/jpeg" => Ok(Self::Jpeg),
            "image/jpg" => Ok(Self::Jpg),
            "image/png" => Ok(Self::Png),
            _ => Err(DomainError::validation(
                "Please upload a PDF or image file (JPEG, PNG).",
            )),
        }
    }

    pub fn is_document(&self) -> bool {
        matches!(self, Self::Pdf)
    }
}

impl ValueObject for MediaType {}

/// A file handed in for extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    name: String,
    media_type: MediaType,
    size_bytes: u64,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, mime: &str, size_bytes: u64) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("file name is required"));
        }
        Ok(Self {
            name,
            media_type: MediaType::parse(mime)?,
            size_bytes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Size rounded to whole kilobytes, e.g. `"12 KB"`.
    pub fn size_label(&self) -> String {
        let kilobytes = self.size_bytes / 1024 + u64::from(self.size_bytes % 1024 >= 512);
        format!("{kilobytes} KB")
    }
}

/// What the extraction collaborator hands back.
///
/// Amounts on the items are not trusted; they are recomputed before the
/// invoice becomes visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedInvoice {
    pub file_name: String,
    #[serde(default)]
    pub invoice_number: Option<String>,
    pub client_name: String,
    #[serde(default)]
    pub client_address: Option<String>,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    pub items: Vec<LineItemInput>,
    #[serde(default)]
    pub tax_rate: Option<TaxRate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_pdf_and_images() {
        assert_eq!(MediaType::parse("application/pdf").unwrap(), MediaType::Pdf);
        assert_eq!(MediaType::parse("image/jpeg").unwrap(), MediaType::Jpeg);
        assert_eq!(MediaType::parse("image/jpg").unwrap(), MediaType::Jpg);
        assert_eq!(MediaType::parse(" IMAGE/PNG ").unwrap(), MediaType::Png);
    }

    #[test]
    fn rejects_other_types() {
        for mime in ["text/plain", "image/gif", "application/zip", ""] {
            let err = MediaType::parse(mime).unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)), "{mime}");
        }
    }

    #[test]
    fn uploaded_file_requires_name() {
        assert!(UploadedFile::new(" ", "application/pdf", 10).is_err());
        let file = UploadedFile::new("scan.png", "image/png", 20_000).unwrap();
        assert_eq!(file.media_type(), MediaType::Png);
        assert!(!file.media_type().is_document());
        assert_eq!(file.size_label(), "20 KB");
    }

    #[test]
    fn size_label_rounds_without_overflow() {
        let label = |bytes| UploadedFile::new("big.pdf", "application/pdf", bytes).unwrap().size_label();
        assert_eq!(label(511), "0 KB");
        assert_eq!(label(512), "1 KB");
        assert_eq!(label(1_535), "1 KB");
        assert_eq!(label(u64::MAX), format!("{} KB", u64::MAX / 1024 + 1));
    }

    #[test]
    fn extracted_invoice_reads_collaborator_json() {
        let json = r#"{
            "fileName": "march.pdf",
            "clientName": "Example Client Ltd.",
            "date": "2026-10-19",
            "dueDate": "2026-11-18",
            "items": [{"description": "Accounting Services", "quantity": 1, "unitPrice": 500, "amount": 500}]
        }"#;
        let extracted: ExtractedInvoice = serde_json::from_str(json).unwrap();
        assert_eq!(extracted.file_name, "march.pdf");
        assert_eq!(extracted.items.len(), 1);
        assert_eq!(extracted.invoice_number, None);
        assert_eq!(extracted.tax_rate, None);
    }
}

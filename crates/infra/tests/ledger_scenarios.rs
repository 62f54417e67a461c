//! End-to-end ledger scenarios through the public workspace API.

use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use charterwise_ai::FeatureTag;
use charterwise_core::DomainError;
use charterwise_infra::{InvoiceWorkspace, WorkflowError, WorkspaceConfig};
use charterwise_invoicing::{InvoiceId, InvoiceStatus, Money, TaxRate};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn workspace_with_service_a() -> (InvoiceWorkspace, InvoiceId) {
    let ws = InvoiceWorkspace::simulated(WorkspaceConfig::default());
    let mut draft = ws.new_draft(today());
    draft.set_client_name("Acme Ltd");
    draft.update_description(0, "Service A").unwrap();
    draft.update_item(0, dec!(2), dec!(100)).unwrap();
    draft.set_tax_rate(TaxRate::new(dec!(10))).unwrap();
    let id = ws.create_from_draft(&draft).unwrap();
    (ws, id)
}

#[test]
fn created_invoice_totals() {
    let (ws, id) = workspace_with_service_a();
    let invoice = ws.find(id).unwrap();

    assert_eq!(invoice.subtotal(), dec!(200));
    assert_eq!(invoice.tax(), dec!(20));
    assert_eq!(invoice.total(), dec!(220));
    assert_eq!(invoice.status(), InvoiceStatus::Pending);
    assert_eq!(Money::new(invoice.total()).to_string(), "$220.00");
}

#[test]
fn repricing_rederives_totals() {
    let (ws, id) = workspace_with_service_a();
    ws.update_item(id, 0, dec!(3), dec!(50)).unwrap();

    let invoice = ws.find(id).unwrap();
    assert_eq!(invoice.items()[0].amount(), dec!(150));
    assert_eq!(invoice.subtotal(), dec!(150));
    assert_eq!(invoice.tax(), dec!(15));
    assert_eq!(invoice.total(), dec!(165));
}

#[test]
fn last_item_cannot_be_removed() {
    let (ws, id) = workspace_with_service_a();
    let before = ws.find(id).unwrap();

    let err = ws.remove_item(id, 0).unwrap_err();
    assert!(matches!(err, WorkflowError::Domain(DomainError::InvalidOperation(_))));

    let after = ws.find(id).unwrap();
    assert_eq!(after.items().len(), 1);
    assert_eq!(after, before);
}

#[test]
fn verifying_unknown_invoice_is_not_found() {
    let (ws, _) = workspace_with_service_a();
    let before = ws.invoices().unwrap();

    let unknown: Result<InvoiceId, _> = "INV-404".parse();
    assert!(unknown.is_err());

    let err = ws.verify(InvoiceId::generate()).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(ws.invoices().unwrap(), before);
}

#[tokio::test(start_paused = true)]
async fn upload_verify_and_send_session() {
    let ws = InvoiceWorkspace::simulated(WorkspaceConfig::default());
    let notices = ws.subscribe();

    let file = ws.accept_upload("q3-statement.pdf", "application/pdf", 81_920).unwrap();
    let started = tokio::time::Instant::now();
    let id = ws.process_upload(&file, today()).await.unwrap();
    assert!(started.elapsed() >= Duration::from_secs(2));

    ws.verify(id).unwrap();
    ws.verify(id).unwrap();
    ws.send_invoice(id, "accounts@example.test", "Your invoice").await.unwrap();

    let invoice = ws.find(id).unwrap();
    assert_eq!(invoice.status(), InvoiceStatus::Verified);
    assert_eq!(invoice.total(), dec!(1200));

    let titles: Vec<String> = notices.drain().into_iter().map(|n| n.title).collect();
    assert_eq!(titles, vec!["Invoice Processed", "Invoice Verified", "Invoice Sent"]);
}

#[test]
fn settings_persist_across_workspaces() {
    let dir = tempfile::tempdir().unwrap();
    let config = WorkspaceConfig {
        settings_path: Some(dir.path().join("settings.json")),
        ..WorkspaceConfig::instant()
    };

    let first = InvoiceWorkspace::simulated(config.clone());
    first.settings().set_advice_enabled(false).unwrap();
    assert_eq!(first.advice(FeatureTag::Taxes), None);

    let second = InvoiceWorkspace::simulated(config);
    assert!(!second.settings().current().advice_enabled);
    assert!(second.settings().current().chatbot_enabled);
}

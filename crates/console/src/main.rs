//! Scripted CharterWise session: create, upload, verify, send, then print
//! the ledger and every notice raised along the way.

use anyhow::Context;
use chrono::Utc;
use rust_decimal::Decimal;

use charterwise_ai::FeatureTag;
use charterwise_infra::{InvoiceWorkspace, Notice, WorkspaceConfig};
use charterwise_invoicing::{Invoice, Money};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    charterwise_observability::init();

    let config = WorkspaceConfig::from_env().context("reading CHARTERWISE_* configuration")?;
    tracing::info!(?config, "starting session");

    let workspace = InvoiceWorkspace::simulated(config);
    let notices = workspace.subscribe();
    let today = Utc::now().date_naive();

    let mut draft = workspace.new_draft(today);
    draft.set_client_name("Acme Ltd");
    draft.set_client_email("billing@acme.example");
    draft.update_description(0, "Monthly bookkeeping")?;
    draft.update_item(0, Decimal::from(2), Decimal::from(100))?;
    let row = draft.add_item()?;
    draft.update_description(row, "Payroll run")?;
    draft.update_item(row, Decimal::ONE, Decimal::new(4_999, 2))?;
    let created = workspace
        .create_from_draft(&draft)
        .context("creating invoice from draft")?;

    let file = workspace.accept_upload("supplier-statement.pdf", "application/pdf", 81_920)?;
    let processed = workspace
        .process_upload(&file, today)
        .await
        .context("processing upload")?;

    workspace.verify(processed)?;
    workspace
        .send_invoice(created, "billing@acme.example", "Please find your invoice attached.")
        .await
        .context("sending invoice")?;

    if let Some(advice) = workspace.advice(FeatureTag::Invoices) {
        println!("Advice: {advice}\n");
    }
    if let Some(reply) = workspace.chat("When are quarterly taxes due?").await? {
        println!("Assistant: {}\n", reply.content);
    }

    for invoice in workspace.invoices()? {
        print_invoice(&invoice);
    }
    for notice in notices.drain() {
        print_notice(&notice);
    }
    Ok(())
}

fn print_invoice(invoice: &Invoice) {
    println!(
        "{}  {}  {}  due {}  [{}]  {}",
        invoice.invoice_number(),
        invoice.client().name,
        invoice.date(),
        invoice.due_date(),
        invoice.status(),
        invoice.file_name(),
    );
    for item in invoice.items() {
        println!(
            "    {:<28} {:>6} x {:>10} = {:>10}",
            item.description(),
            item.quantity(),
            Money::new(item.unit_price()),
            Money::new(item.amount()),
        );
    }
    let totals = invoice.totals();
    println!("    {:>48} {:>10}", "Subtotal", totals.subtotal_money());
    println!(
        "    {:>48} {:>10}",
        format!("Tax ({})", invoice.tax_rate()),
        totals.tax_money()
    );
    println!("    {:>48} {:>10}\n", "Total", totals.total_money());
}

fn print_notice(notice: &Notice) {
    println!("[{:?}] {}: {}", notice.severity, notice.title, notice.description);
}

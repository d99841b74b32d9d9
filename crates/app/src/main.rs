use anyhow::Context;

use facturier_core::InvoiceId;
use facturier_infra::{AppConfig, InvoicingSession, JsonFileSnapshotStore, PlainTextRenderer};
use facturier_invoicing::{DocumentType, format_eur};

fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("failed to load configuration")?;
    facturier_observability::init_with(&config.tracing);

    let path = config.snapshot_path();
    tracing::info!(snapshot = %path.display(), "opening invoicing session");
    let session = InvoicingSession::open(JsonFileSnapshotStore::new(path), PlainTextRenderer)
        .context("failed to open invoicing session")?;

    // `facturier render <id>` writes the document next to the snapshot.
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let [cmd, id] = args.as_slice() {
        if cmd == "render" {
            let id: InvoiceId = id.parse().context("invalid document id")?;
            let rendered = session
                .render(&id)
                .with_context(|| format!("failed to render {id}"))?;
            let target = config.data_dir.join(&rendered.file_name);
            std::fs::write(&target, &rendered.bytes)
                .with_context(|| format!("failed to write {}", target.display()))?;
            tracing::info!(invoice_id = %id, file = %target.display(), "document rendered");
            return Ok(());
        }
    }

    let stats = session.stats();
    tracing::info!(
        paid_invoices = stats.paid_invoices,
        pending_invoices = stats.pending_invoices,
        quotes = stats.quotes,
        revenue = %format_eur(stats.revenue),
        "dashboard"
    );

    for invoice in session.repository().invoices() {
        tracing::info!(
            invoice_id = %invoice.id,
            number = %invoice.number,
            status = %invoice.status,
            total_ttc = %format_eur(invoice.totals.total_ttc),
            sub_invoices = session.repository().sub_invoices_of(&invoice.id).count(),
            "document"
        );
    }

    for document_type in DocumentType::ALL {
        tracing::info!(
            document_type = %document_type,
            next_number = %session.next_number(document_type),
            "next number"
        );
    }

    Ok(())
}

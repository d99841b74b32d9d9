//! Document rendering boundary.
//!
//! Renderers turn a finalized document into bytes plus an artifact name.
//! They only read documents; a failed render leaves the repository as it was.

use std::fmt::Write as _;

use thiserror::Error;

use facturier_invoicing::money::format_percentage;
use facturier_invoicing::{Invoice, SubInvoice, format_eur};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("document {0} has no line items")]
    EmptyDocument(String),
    #[error("formatting failed: {0}")]
    Format(#[from] std::fmt::Error),
}

/// A document handed to a renderer.
#[derive(Debug, Clone, Copy)]
pub enum DocumentRef<'a> {
    Invoice(&'a Invoice),
    SubInvoice(&'a SubInvoice),
}

impl<'a> DocumentRef<'a> {
    pub fn invoice(&self) -> &'a Invoice {
        match *self {
            DocumentRef::Invoice(inv) => inv,
            DocumentRef::SubInvoice(sub) => &sub.invoice,
        }
    }

    /// `<type>_<number>.pdf`
    pub fn file_name(&self) -> String {
        self.invoice().file_name()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub trait DocumentRenderer: Send + Sync {
    fn render(&self, document: DocumentRef<'_>) -> Result<RenderedDocument, RenderError>;
}

/// UTF-8 text layout used for previews and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextRenderer;

impl PlainTextRenderer {
    pub fn new() -> Self {
        Self
    }

    fn write_document(&self, out: &mut String, document: DocumentRef<'_>) -> std::fmt::Result {
        let inv = document.invoice();

        writeln!(out, "{} {}", inv.document_type.as_str().to_uppercase(), inv.number)?;
        if let DocumentRef::SubInvoice(sub) = document {
            writeln!(
                out,
                "Part {} de {}",
                format_percentage(sub.split_percentage),
                sub.parent_id
            )?;
        }
        writeln!(out, "Date: {}", inv.date.format("%d/%m/%Y"))?;
        if let Some(due) = inv.due_date {
            writeln!(out, "Échéance: {}", due.format("%d/%m/%Y"))?;
        }
        writeln!(out, "Statut: {}", inv.status)?;
        writeln!(out)?;

        writeln!(out, "{}", inv.company.name)?;
        write_block(out, &inv.company.address)?;
        if let Some(siret) = &inv.company.siret {
            writeln!(out, "SIRET: {siret}")?;
        }
        if let Some(vat) = &inv.company.vat_number {
            writeln!(out, "TVA: {vat}")?;
        }
        writeln!(out)?;

        writeln!(out, "Client: {}", inv.client.name)?;
        write_block(out, &inv.client.address)?;
        writeln!(out, "{}", inv.client.email)?;
        writeln!(out)?;

        for item in &inv.items {
            writeln!(
                out,
                "- {} | {} x {} | TVA {}% | {}",
                item.designation,
                item.quantity,
                format_eur(item.unit_price),
                item.vat_rate,
                format_eur(item.net())
            )?;
        }
        writeln!(out)?;

        writeln!(out, "Total HT: {}", format_eur(inv.totals.total_ht))?;
        writeln!(out, "TVA: {}", format_eur(inv.totals.total_vat))?;
        writeln!(out, "Total TTC: {}", format_eur(inv.totals.total_ttc))?;

        if !inv.notes.trim().is_empty() {
            writeln!(out)?;
            writeln!(out, "Notes:")?;
            write_block(out, &inv.notes)?;
        }
        if !inv.terms.trim().is_empty() {
            writeln!(out)?;
            writeln!(out, "Conditions:")?;
            write_block(out, &inv.terms)?;
        }
        Ok(())
    }
}

fn write_block(out: &mut String, text: &str) -> std::fmt::Result {
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

impl DocumentRenderer for PlainTextRenderer {
    fn render(&self, document: DocumentRef<'_>) -> Result<RenderedDocument, RenderError> {
        let inv = document.invoice();
        if inv.items.is_empty() {
            return Err(RenderError::EmptyDocument(inv.number.clone()));
        }

        let mut out = String::new();
        self.write_document(&mut out, document)?;

        Ok(RenderedDocument {
            file_name: document.file_name(),
            bytes: out.into_bytes(),
        })
    }
}

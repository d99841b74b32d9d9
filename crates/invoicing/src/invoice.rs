use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use facturier_core::{Entity, InvoiceId};
use facturier_parties::{Client, Company};

use crate::line_item::LineItem;
use crate::totals::{Totals, calculate_totals};

/// Kind of billing document. Each kind has its own number sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Invoice,
    Quote,
    Proforma,
}

impl DocumentType {
    pub const ALL: [DocumentType; 3] = [
        DocumentType::Invoice,
        DocumentType::Quote,
        DocumentType::Proforma,
    ];

    /// Number prefix: `FA` (facture), `DE` (devis), `PR` (proforma).
    pub fn prefix(self) -> &'static str {
        match self {
            DocumentType::Invoice => "FA",
            DocumentType::Quote => "DE",
            DocumentType::Proforma => "PR",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentType::Invoice => "invoice",
            DocumentType::Quote => "quote",
            DocumentType::Proforma => "proforma",
        }
    }
}

impl core::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document status.
///
/// Transitions are not validated: any assignment is accepted. Only the
/// parent aggregation (`complet` / `incomplet`) is automated by the
/// repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Paid,
    Overdue,
    Split,
    /// Every sub-invoice of this invoice is paid.
    Complet,
    /// Not every sub-invoice is paid (any longer).
    Incomplet,
    Cancelled,
}

impl InvoiceStatus {
    pub fn is_paid(self) -> bool {
        self == InvoiceStatus::Paid
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Split => "split",
            InvoiceStatus::Complet => "complet",
            InvoiceStatus::Incomplet => "incomplet",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }
}

impl core::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A billing document (invoice, quote or proforma).
///
/// `client` and `company` are value copies taken when the document is saved.
/// `totals` is a cache of [`calculate_totals`] over `items`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: InvoiceId,
    #[serde(rename = "type")]
    pub document_type: DocumentType,
    pub number: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub client: Client,
    pub company: Company,
    pub items: Vec<LineItem>,
    /// Signature image, as a data URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub terms: String,
    pub status: InvoiceStatus,
    #[serde(flatten)]
    pub totals: Totals,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Recompute the cached totals from `items`.
    pub fn refresh_totals(&mut self) {
        self.totals = calculate_totals(&self.items);
    }

    /// Artifact name used by renderers: `<type>_<number>.pdf`.
    pub fn file_name(&self) -> String {
        format!("{}_{}.pdf", self.document_type, self.number)
    }

    pub(crate) fn apply_patch(&mut self, patch: InvoicePatch) {
        let InvoicePatch {
            document_type,
            number,
            date,
            due_date,
            client,
            company,
            items,
            signature,
            notes,
            terms,
            status,
            totals,
        } = patch;

        if let Some(v) = document_type {
            self.document_type = v;
        }
        if let Some(v) = number {
            self.number = v;
        }
        if let Some(v) = date {
            self.date = v;
        }
        if let Some(v) = due_date {
            self.due_date = v;
        }
        if let Some(v) = client {
            self.client = v;
        }
        if let Some(v) = company {
            self.company = v;
        }
        if let Some(v) = items {
            self.items = v;
        }
        if let Some(v) = signature {
            self.signature = v;
        }
        if let Some(v) = notes {
            self.notes = v;
        }
        if let Some(v) = terms {
            self.terms = v;
        }
        if let Some(v) = status {
            self.status = v;
        }
        if let Some(v) = totals {
            self.totals = v;
        }
    }
}

impl Entity for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// An installment share of a parent invoice.
///
/// Carries every invoice field (flattened) plus the owning parent and the
/// share percentage. Its totals are derived from the split amount, not from
/// its (scaled) items, so the two views may disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubInvoice {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub parent_id: InvoiceId,
    pub split_percentage: f64,
}

impl SubInvoice {
    pub fn id(&self) -> &InvoiceId {
        &self.invoice.id
    }

    pub fn status(&self) -> InvoiceStatus {
        self.invoice.status
    }

    pub fn number(&self) -> &str {
        &self.invoice.number
    }

    pub fn totals(&self) -> Totals {
        self.invoice.totals
    }
}

impl Entity for SubInvoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.invoice.id
    }
}

/// Partial update of an invoice or sub-invoice.
///
/// `None` keeps the current value. For optional fields, `Some(None)` clears.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoicePatch {
    pub document_type: Option<DocumentType>,
    pub number: Option<String>,
    pub date: Option<NaiveDate>,
    pub due_date: Option<Option<NaiveDate>>,
    pub client: Option<Client>,
    pub company: Option<Company>,
    pub items: Option<Vec<LineItem>>,
    pub signature: Option<Option<String>>,
    pub notes: Option<String>,
    pub terms: Option<String>,
    pub status: Option<InvoiceStatus>,
    pub totals: Option<Totals>,
}

impl InvoicePatch {
    pub fn status(status: InvoiceStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn items(items: Vec<LineItem>) -> Self {
        Self {
            items: Some(items),
            ..Self::default()
        }
    }
}

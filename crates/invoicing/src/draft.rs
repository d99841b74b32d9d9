//! Document being edited before it is saved.

use chrono::{DateTime, NaiveDate, Utc};

use facturier_core::{DomainError, DomainResult, InvoiceId, LineItemId};
use facturier_parties::{Client, Company};

use crate::invoice::{DocumentType, Invoice, InvoiceStatus};
use crate::line_item::LineItem;
use crate::totals::{Totals, calculate_totals};

/// Editable form state of an invoice, quote or proforma.
///
/// Unlike [`Invoice`], the client may still be missing and lines may still
/// lack a designation; [`InvoiceDraft::validate`] enforces the save-time
/// requirements.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDraft {
    /// Id of the document being edited; `None` for a new document.
    pub id: Option<InvoiceId>,
    pub document_type: DocumentType,
    /// Number typed by the user; the allocator fills it in when empty.
    pub number: Option<String>,
    pub date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub client: Option<Client>,
    pub items: Vec<LineItem>,
    pub signature: Option<String>,
    pub notes: String,
    pub terms: String,
    pub status: InvoiceStatus,
}

impl InvoiceDraft {
    pub const DEFAULT_TERMS: &'static str =
        "Paiement à 30 jours. Pénalités de retard : 3 fois le taux légal.";

    /// Blank invoice form dated `date`, with one empty line.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            id: None,
            document_type: DocumentType::Invoice,
            number: None,
            date,
            due_date: None,
            client: None,
            items: vec![LineItem::blank(LineItemId::new())],
            signature: None,
            notes: String::new(),
            terms: Self::DEFAULT_TERMS.to_string(),
            status: InvoiceStatus::Draft,
        }
    }

    /// Form state for editing an existing document.
    pub fn from_invoice(invoice: &Invoice) -> Self {
        Self {
            id: Some(invoice.id.clone()),
            document_type: invoice.document_type,
            number: Some(invoice.number.clone()),
            date: invoice.date,
            due_date: invoice.due_date,
            client: Some(invoice.client.clone()),
            items: invoice.items.clone(),
            signature: invoice.signature.clone(),
            notes: invoice.notes.clone(),
            terms: invoice.terms.clone(),
            status: invoice.status,
        }
    }

    pub fn add_item(&mut self) -> &mut LineItem {
        self.items.push(LineItem::blank(LineItemId::new()));
        let last = self.items.len() - 1;
        &mut self.items[last]
    }

    pub fn remove_item(&mut self, id: &LineItemId) {
        self.items.retain(|item| &item.id != id);
    }

    /// Live totals shown while editing.
    pub fn totals(&self) -> Totals {
        calculate_totals(&self.items)
    }

    /// Save-time requirements: a client, at least one line, and a
    /// designation on every line.
    pub fn validate(&self) -> DomainResult<()> {
        if self.client.is_none() {
            return Err(DomainError::validation("a client must be selected"));
        }
        if self.items.is_empty() || self.items.iter().any(|item| !item.has_designation()) {
            return Err(DomainError::validation(
                "at least one line item with a designation is required",
            ));
        }
        Ok(())
    }

    /// Turn the draft into a persisted-shape document.
    ///
    /// `fallback_number` is used when the draft carries no number;
    /// `created_at` is kept from the stored record when re-saving.
    pub fn finalize(
        self,
        id: InvoiceId,
        fallback_number: String,
        company: Company,
        created_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> DomainResult<Invoice> {
        self.validate()?;

        let number = self
            .number
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(fallback_number);
        let client = self
            .client
            .ok_or_else(|| DomainError::validation("a client must be selected"))?;
        let totals = calculate_totals(&self.items);

        Ok(Invoice {
            id,
            document_type: self.document_type,
            number,
            date: self.date,
            due_date: self.due_date,
            client,
            company,
            items: self.items,
            signature: self.signature,
            notes: self.notes,
            terms: self.terms,
            status: self.status,
            totals,
            created_at: created_at.unwrap_or(now),
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::fixtures::client;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()
    }

    fn filled_draft() -> InvoiceDraft {
        let mut draft = InvoiceDraft::new(date());
        draft.client = Some(client());
        draft.items[0].designation = "Développement".to_string();
        draft.items[0].unit_price = 100.0;
        draft
    }

    #[test]
    fn new_draft_has_form_defaults() {
        let draft = InvoiceDraft::new(date());
        assert_eq!(draft.status, InvoiceStatus::Draft);
        assert_eq!(draft.document_type, DocumentType::Invoice);
        assert_eq!(draft.items.len(), 1);
        assert_eq!(draft.terms, InvoiceDraft::DEFAULT_TERMS);
    }

    #[test]
    fn missing_client_is_rejected() {
        let mut draft = filled_draft();
        draft.client = None;
        let err = draft.validate().unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("client")));
    }

    #[test]
    fn empty_items_or_designation_are_rejected() {
        let mut draft = filled_draft();
        draft.add_item();
        assert!(matches!(draft.validate(), Err(DomainError::Validation(_))));

        let mut draft = filled_draft();
        draft.items.clear();
        assert!(matches!(draft.validate(), Err(DomainError::Validation(_))));

        let mut draft = filled_draft();
        draft.items[0].designation = "   ".to_string();
        assert!(draft.validate().is_err());
    }

    #[test]
    fn finalize_computes_totals_and_uses_fallback_number() {
        let now = Utc::now();
        let invoice = filled_draft()
            .finalize(
                InvoiceId::from("1"),
                "FA0001".to_string(),
                Company::default(),
                None,
                now,
            )
            .unwrap();

        assert_eq!(invoice.number, "FA0001");
        assert_eq!(invoice.totals.total_ht, 100.0);
        assert_eq!(invoice.totals.total_ttc, 120.0);
        assert_eq!(invoice.created_at, now);
        assert_eq!(invoice.updated_at, now);
    }

    #[test]
    fn finalize_keeps_typed_number_and_creation_time() {
        let created = Utc::now() - chrono::Duration::days(3);
        let mut draft = filled_draft();
        draft.number = Some("FA0042".to_string());

        let invoice = draft
            .finalize(
                InvoiceId::from("1"),
                "FA0001".to_string(),
                Company::default(),
                Some(created),
                Utc::now(),
            )
            .unwrap();

        assert_eq!(invoice.number, "FA0042");
        assert_eq!(invoice.created_at, created);
    }

    #[test]
    fn round_trips_an_existing_invoice() {
        let invoice = filled_draft()
            .finalize(
                InvoiceId::from("9"),
                "FA0009".to_string(),
                Company::default(),
                None,
                Utc::now(),
            )
            .unwrap();
        let draft = InvoiceDraft::from_invoice(&invoice);
        assert_eq!(draft.id, Some(InvoiceId::from("9")));
        assert_eq!(draft.totals(), invoice.totals);
    }
}

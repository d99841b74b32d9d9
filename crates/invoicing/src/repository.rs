//! Canonical in-memory store of invoices and sub-invoices.
//!
//! All mutations go through [`InvoiceRepository`] so that cached totals and
//! the parent/child payment aggregation stay consistent. Ids are unique
//! across both collections.

use chrono::{DateTime, Utc};

use facturier_core::{DomainError, DomainResult, InvoiceId, position_of};
use facturier_parties::Company;

use crate::draft::InvoiceDraft;
use crate::invoice::{DocumentType, Invoice, InvoicePatch, InvoiceStatus, SubInvoice};
use crate::numbering::generate_invoice_number;
use crate::totals::calculate_totals;

/// What a [`InvoiceRepository::delete_invoice`] call removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeleteOutcome {
    pub invoice_removed: bool,
    pub sub_invoices_removed: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceRepository {
    invoices: Vec<Invoice>,
    sub_invoices: Vec<SubInvoice>,
}

impl InvoiceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate from a loaded snapshot. Records are taken as-is.
    pub fn from_parts(invoices: Vec<Invoice>, sub_invoices: Vec<SubInvoice>) -> Self {
        Self {
            invoices,
            sub_invoices,
        }
    }

    pub fn into_parts(self) -> (Vec<Invoice>, Vec<SubInvoice>) {
        (self.invoices, self.sub_invoices)
    }

    pub fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }

    pub fn sub_invoices(&self) -> &[SubInvoice] {
        &self.sub_invoices
    }

    pub fn invoice(&self, id: &InvoiceId) -> Option<&Invoice> {
        self.invoices.iter().find(|inv| &inv.id == id)
    }

    pub fn sub_invoice(&self, id: &InvoiceId) -> Option<&SubInvoice> {
        self.sub_invoices.iter().find(|sub| sub.id() == id)
    }

    /// Top-level document or the invoice part of a sub-invoice.
    pub fn document(&self, id: &InvoiceId) -> Option<&Invoice> {
        self.invoice(id)
            .or_else(|| self.sub_invoice(id).map(|sub| &sub.invoice))
    }

    pub fn contains(&self, id: &InvoiceId) -> bool {
        self.document(id).is_some()
    }

    pub fn sub_invoices_of<'a>(
        &'a self,
        parent_id: &'a InvoiceId,
    ) -> impl Iterator<Item = &'a SubInvoice> + 'a {
        self.sub_invoices
            .iter()
            .filter(move |sub| &sub.parent_id == parent_id)
    }

    pub fn has_sub_invoices(&self, parent_id: &InvoiceId) -> bool {
        self.sub_invoices_of(parent_id).next().is_some()
    }

    /// Next sequential number for `document_type` (see [`generate_invoice_number`]).
    pub fn next_number(&self, document_type: DocumentType) -> String {
        generate_invoice_number(&self.invoices, document_type)
    }

    /// Append a complete document.
    ///
    /// The cached totals are recomputed from the items. The number is trusted
    /// as given (the allocator is responsible for it); the id must not be in
    /// use by any invoice or sub-invoice.
    pub fn add_invoice(&mut self, mut invoice: Invoice) -> DomainResult<()> {
        if self.contains(&invoice.id) {
            return Err(DomainError::conflict(format!(
                "document id '{}' already exists",
                invoice.id
            )));
        }
        invoice.refresh_totals();
        tracing::info!(
            invoice_id = %invoice.id,
            number = %invoice.number,
            document_type = %invoice.document_type,
            total_ttc = invoice.totals.total_ttc,
            "invoice added"
        );
        self.invoices.push(invoice);
        Ok(())
    }

    /// Form save: validate the draft, then create a new document or replace
    /// the fields of the one being edited. Returns the document id.
    ///
    /// A new document without a typed number gets the next number of its type.
    pub fn save_draft(
        &mut self,
        draft: InvoiceDraft,
        company: &Company,
        now: DateTime<Utc>,
    ) -> DomainResult<InvoiceId> {
        draft.validate()?;
        let fallback_number = self.next_number(draft.document_type);

        match draft.id.clone() {
            Some(id) if self.invoice(&id).is_some() => {
                let created_at = self.invoice(&id).map(|inv| inv.created_at);
                let saved =
                    draft.finalize(id.clone(), fallback_number, company.clone(), created_at, now)?;
                let patch = InvoicePatch {
                    document_type: Some(saved.document_type),
                    number: Some(saved.number),
                    date: Some(saved.date),
                    due_date: Some(saved.due_date),
                    client: Some(saved.client),
                    company: Some(saved.company),
                    items: Some(saved.items),
                    signature: Some(saved.signature),
                    notes: Some(saved.notes),
                    terms: Some(saved.terms),
                    status: Some(saved.status),
                    totals: Some(saved.totals),
                };
                self.update_invoice(&id, patch);
                Ok(id)
            }
            Some(id) if self.sub_invoice(&id).is_some() => Err(DomainError::conflict(format!(
                "'{id}' is a sub-invoice; edit it through update_invoice"
            ))),
            requested => {
                let id = requested.unwrap_or_default();
                let invoice = draft.finalize(id.clone(), fallback_number, company.clone(), None, now)?;
                self.add_invoice(invoice)?;
                Ok(id)
            }
        }
    }

    /// Merge `patch` into the invoice or sub-invoice with `id` and refresh
    /// `updated_at`.
    ///
    /// Unknown ids are a silent no-op (returns `false`). For top-level
    /// documents, a patch carrying `items` also recomputes the cached totals.
    /// Sub-invoice totals are split-derived and are only changed by an
    /// explicit `totals` in the patch. A status change to or from `paid` on a
    /// sub-invoice re-evaluates its parent.
    pub fn update_invoice(&mut self, id: &InvoiceId, patch: InvoicePatch) -> bool {
        let now = Utc::now();

        if let Some(idx) = position_of(&self.invoices, id) {
            let items_changed = patch.items.is_some();
            let invoice = &mut self.invoices[idx];
            invoice.apply_patch(patch);
            if items_changed {
                invoice.totals = calculate_totals(&invoice.items);
            }
            invoice.updated_at = now;
            tracing::info!(invoice_id = %id, status = %invoice.status, "invoice updated");
            return true;
        }

        if let Some(idx) = position_of(&self.sub_invoices, id) {
            let sub = &mut self.sub_invoices[idx];
            let was_paid = sub.status().is_paid();
            sub.invoice.apply_patch(patch);
            sub.invoice.updated_at = now;
            let paid_changed = was_paid != sub.status().is_paid();
            let parent_id = sub.parent_id.clone();
            tracing::info!(invoice_id = %id, parent_id = %parent_id, status = %sub.status(), "sub-invoice updated");
            if paid_changed {
                self.refresh_parent_status(&parent_id, now);
            }
            return true;
        }

        tracing::warn!(invoice_id = %id, "update of unknown invoice ignored");
        false
    }

    /// Remove the invoice with `id` and every sub-invoice it owns.
    ///
    /// Sub-invoices cannot be deleted on their own; passing a sub-invoice id
    /// removes nothing. Unknown ids are a silent no-op.
    pub fn delete_invoice(&mut self, id: &InvoiceId) -> DeleteOutcome {
        let before = self.invoices.len();
        self.invoices.retain(|inv| &inv.id != id);
        let invoice_removed = self.invoices.len() != before;

        let before = self.sub_invoices.len();
        self.sub_invoices.retain(|sub| &sub.parent_id != id);
        let sub_invoices_removed = before - self.sub_invoices.len();

        let outcome = DeleteOutcome {
            invoice_removed,
            sub_invoices_removed,
        };
        if invoice_removed || sub_invoices_removed > 0 {
            tracing::info!(invoice_id = %id, sub_invoices_removed, "invoice deleted");
        } else {
            tracing::warn!(invoice_id = %id, "delete of unknown invoice ignored");
        }
        outcome
    }

    /// Flip `paid` ↔ `sent` on an invoice or sub-invoice; returns the new
    /// status.
    ///
    /// A split invoice delegates payment tracking to its sub-invoices and is
    /// refused with [`DomainError::Conflict`]. Toggling a sub-invoice
    /// re-evaluates its parent's `complet` / `incomplet` status.
    pub fn toggle_paid(&mut self, id: &InvoiceId) -> DomainResult<InvoiceStatus> {
        let now = Utc::now();

        if let Some(idx) = position_of(&self.invoices, id) {
            if self.has_sub_invoices(id) {
                return Err(DomainError::conflict(format!(
                    "invoice '{id}' is split; payment is tracked on its sub-invoices"
                )));
            }
            let invoice = &mut self.invoices[idx];
            invoice.status = toggled_paid(invoice.status);
            invoice.updated_at = now;
            tracing::info!(invoice_id = %id, status = %invoice.status, "invoice payment toggled");
            return Ok(invoice.status);
        }

        let idx = position_of(&self.sub_invoices, id).ok_or_else(DomainError::not_found)?;
        let sub = &mut self.sub_invoices[idx];
        sub.invoice.status = toggled_paid(sub.invoice.status);
        sub.invoice.updated_at = now;
        let status = sub.invoice.status;
        let parent_id = sub.parent_id.clone();
        tracing::info!(invoice_id = %id, parent_id = %parent_id, status = %status, "sub-invoice payment toggled");

        self.refresh_parent_status(&parent_id, now);
        Ok(status)
    }

    /// Flip a sub-invoice between `cancelled` and `sent`; returns the new
    /// status. A cancelled sub-invoice counts as unpaid for its parent.
    pub fn toggle_cancelled(&mut self, id: &InvoiceId) -> DomainResult<InvoiceStatus> {
        let now = Utc::now();

        let Some(idx) = position_of(&self.sub_invoices, id) else {
            if self.invoice(id).is_some() {
                return Err(DomainError::validation(
                    "only sub-invoices can be cancelled or reactivated",
                ));
            }
            return Err(DomainError::not_found());
        };

        let sub = &mut self.sub_invoices[idx];
        let was_paid = sub.status().is_paid();
        sub.invoice.status = if sub.invoice.status == InvoiceStatus::Cancelled {
            InvoiceStatus::Sent
        } else {
            InvoiceStatus::Cancelled
        };
        sub.invoice.updated_at = now;
        let status = sub.invoice.status;
        let parent_id = sub.parent_id.clone();
        tracing::info!(invoice_id = %id, status = %status, "sub-invoice cancellation toggled");

        if was_paid {
            self.refresh_parent_status(&parent_id, now);
        }
        Ok(status)
    }

    /// Append a batch of freshly materialized sub-invoices.
    pub(crate) fn append_sub_invoices(&mut self, subs: Vec<SubInvoice>) {
        self.sub_invoices.extend(subs);
    }

    /// One-level aggregation: all children paid → parent `complet` (unless
    /// the parent is itself `paid`); otherwise a `complet` parent falls back
    /// to `incomplet`.
    fn refresh_parent_status(&mut self, parent_id: &InvoiceId, now: DateTime<Utc>) {
        let all_paid = {
            let mut siblings = self.sub_invoices_of(parent_id).peekable();
            if siblings.peek().is_none() {
                return;
            }
            siblings.all(|sub| sub.status().is_paid())
        };

        let Some(parent) = self.invoices.iter_mut().find(|inv| &inv.id == parent_id) else {
            tracing::warn!(parent_id = %parent_id, "sub-invoice references a missing parent");
            return;
        };

        let next = match parent.status {
            InvoiceStatus::Paid | InvoiceStatus::Complet if all_paid => None,
            _ if all_paid => Some(InvoiceStatus::Complet),
            InvoiceStatus::Complet => Some(InvoiceStatus::Incomplet),
            _ => None,
        };

        if let Some(status) = next {
            parent.status = status;
            parent.updated_at = now;
            tracing::info!(invoice_id = %parent_id, status = %status, "parent invoice status propagated");
        }
    }
}

fn toggled_paid(status: InvoiceStatus) -> InvoiceStatus {
    if status.is_paid() {
        InvoiceStatus::Sent
    } else {
        InvoiceStatus::Paid
    }
}

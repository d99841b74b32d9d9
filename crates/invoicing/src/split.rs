//! Installment splitting of an invoice into sub-invoices.
//!
//! A split is a list of `(percentage, amount)` shares. The percentages must
//! total 100 and the amounts must total the parent's TTC; only then are the
//! sub-invoices materialized, all at once.
//!
//! Each sub-invoice copies the parent with its line quantities scaled by the
//! share percentage, but its cached totals come from the share *amount*
//! through a flat 20% VAT back-calculation. The item view and the totals view
//! of a sub-invoice can therefore disagree (a fixed-amount discount is also
//! copied unscaled); the amount is what is billed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use facturier_core::{DomainError, DomainResult, InvoiceId};

use crate::invoice::{Invoice, SubInvoice};
use crate::repository::InvoiceRepository;
use crate::totals::Totals;

/// Absolute tolerance for the percentage and amount reconciliations.
pub const SPLIT_TOLERANCE: f64 = 0.01;

/// Recommended range for the number of shares (the editor enforces it; the
/// splitter only warns).
pub const MIN_SHARES: usize = 2;
pub const MAX_SHARES: usize = 10;

const TTC_FACTOR: f64 = 1.2;
const VAT_SHARE: f64 = 0.2;

/// One share of a split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitShare {
    /// Share of the parent, in percent (0–100).
    pub percentage: f64,
    /// Amount billed by this share, tax included.
    pub amount: f64,
}

impl SplitShare {
    pub fn new(percentage: f64, amount: f64) -> Self {
        Self { percentage, amount }
    }
}

/// Check that `shares` reconcile with an invoice of `total_ttc`.
pub fn validate_shares(total_ttc: f64, shares: &[SplitShare]) -> DomainResult<()> {
    if shares.is_empty() {
        return Err(DomainError::validation("at least one split share is required"));
    }
    if shares
        .iter()
        .any(|s| !s.percentage.is_finite() || !s.amount.is_finite())
    {
        return Err(DomainError::validation("split shares must be finite numbers"));
    }
    if shares.iter().any(|s| !(0.0..=100.0).contains(&s.percentage)) {
        return Err(DomainError::validation(
            "each split percentage must be between 0 and 100",
        ));
    }

    let total_percentage: f64 = shares.iter().map(|s| s.percentage).sum();
    if (total_percentage - 100.0).abs() >= SPLIT_TOLERANCE {
        return Err(DomainError::validation(format!(
            "split percentages must total 100% (got {total_percentage:.2}%)"
        )));
    }

    let total_amount: f64 = shares.iter().map(|s| s.amount).sum();
    if (total_amount - total_ttc).abs() >= SPLIT_TOLERANCE {
        return Err(DomainError::validation(format!(
            "split amounts must total the invoice amount {total_ttc:.2} (got {total_amount:.2})"
        )));
    }

    if !(MIN_SHARES..=MAX_SHARES).contains(&shares.len()) {
        tracing::warn!(
            shares = shares.len(),
            "split share count outside the recommended {MIN_SHARES}..={MAX_SHARES} range"
        );
    }
    Ok(())
}

/// Totals of a sub-invoice billing `amount` (TTC), at a flat 20% VAT.
pub fn totals_from_amount(amount: f64) -> Totals {
    Totals {
        total_ht: amount / TTC_FACTOR,
        total_vat: amount * VAT_SHARE / TTC_FACTOR,
        total_ttc: amount,
    }
}

/// Validate `shares` against the invoice `parent_id` and materialize one
/// sub-invoice per share. Returns the new ids in share order.
///
/// Fails without touching the repository when the parent is unknown, is
/// itself a sub-invoice, has already been split, or the shares do not
/// reconcile.
pub fn split_invoice(
    repo: &mut InvoiceRepository,
    parent_id: &InvoiceId,
    shares: &[SplitShare],
) -> DomainResult<Vec<InvoiceId>> {
    let Some(parent) = repo.invoice(parent_id) else {
        if repo.sub_invoice(parent_id).is_some() {
            return Err(DomainError::validation("a sub-invoice cannot be split again"));
        }
        return Err(DomainError::not_found());
    };
    if repo.has_sub_invoices(parent_id) {
        return Err(DomainError::conflict(format!(
            "invoice '{parent_id}' has already been split"
        )));
    }
    validate_shares(parent.totals.total_ttc, shares)?;

    let now = Utc::now();
    let subs: Vec<SubInvoice> = shares
        .iter()
        .enumerate()
        .map(|(idx, share)| materialize(parent, idx + 1, share, now))
        .collect();
    let ids: Vec<InvoiceId> = subs.iter().map(|sub| sub.id().clone()).collect();

    tracing::info!(
        invoice_id = %parent_id,
        number = %parent.number,
        shares = subs.len(),
        "invoice split into sub-invoices"
    );
    repo.append_sub_invoices(subs);
    Ok(ids)
}

/// Sub-invoice `index` (1-based) of `parent` for `share`.
fn materialize(parent: &Invoice, index: usize, share: &SplitShare, now: DateTime<Utc>) -> SubInvoice {
    let factor = share.percentage / 100.0;
    SubInvoice {
        invoice: Invoice {
            id: parent.id.sub_invoice(index),
            number: format!("{}-{}", parent.number, index),
            items: parent.items.iter().map(|item| item.scaled(factor)).collect(),
            totals: totals_from_amount(share.amount),
            created_at: now,
            updated_at: now,
            ..parent.clone()
        },
        parent_id: parent.id.clone(),
        split_percentage: share.percentage,
    }
}

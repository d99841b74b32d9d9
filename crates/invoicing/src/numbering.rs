//! Sequential document numbering (`FA0001`, `DE0001`, `PR0001`, ...).
//!
//! Numbers are derived from the existing top-level documents of the same
//! type; nothing is reserved. A number edited by hand to something that does
//! not parse is skipped, and uniqueness is not re-validated anywhere else.

use crate::invoice::{DocumentType, Invoice};

/// Next number for `document_type`, given the existing top-level documents.
///
/// Sub-invoices must not be passed here; their numbers (`FA0001-2`) belong to
/// the parent's sequence slot.
pub fn generate_invoice_number(invoices: &[Invoice], document_type: DocumentType) -> String {
    let prefix = document_type.prefix();
    let next = invoices
        .iter()
        .filter(|inv| inv.document_type == document_type)
        .filter_map(|inv| sequence_of(&inv.number, prefix))
        .max()
        .map_or(1, |max| max.saturating_add(1));

    format!("{prefix}{next:04}")
}

/// Sequence part of `number`: the first occurrence of `prefix` is removed and
/// the leading decimal digits of the remainder are read (`"FA0012"` → 12,
/// `"FA0003-1"` → 3). Returns `None` when no digits lead the remainder.
fn sequence_of(number: &str, prefix: &str) -> Option<u64> {
    let rest = number.replacen(prefix, "", 1);
    let rest = rest.trim_start();
    let digits_len = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_len == 0 {
        return None;
    }
    rest[..digits_len].parse().ok()
}

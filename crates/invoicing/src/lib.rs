//! Invoicing domain module.
//!
//! This crate contains the business rules for invoices, quotes and proforma
//! documents: line/document totals, sequential numbering, the invoice
//! repository with its parent/child status propagation, and the splitter that
//! partitions an invoice into installment sub-invoices. Everything here is
//! deterministic domain logic (no IO, no storage, no rendering).

pub mod draft;
pub mod invoice;
pub mod line_item;
pub mod money;
pub mod numbering;
pub mod repository;
pub mod split;
pub mod split_plan;
pub mod stats;
pub mod totals;

pub use draft::InvoiceDraft;
pub use invoice::{DocumentType, Invoice, InvoicePatch, InvoiceStatus, SubInvoice};
pub use line_item::{DiscountType, LineItem};
pub use money::{format_eur, round_to_cents};
pub use numbering::generate_invoice_number;
pub use repository::{DeleteOutcome, InvoiceRepository};
pub use split::{SplitShare, split_invoice, validate_shares};
pub use split_plan::{SplitPlan, SplitSummary};
pub use stats::DashboardStats;
pub use totals::{Totals, calculate_totals};

//! Dashboard figures derived from the repository.

use crate::invoice::{DocumentType, InvoiceStatus};
use crate::repository::InvoiceRepository;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DashboardStats {
    /// Invoice-type documents (top-level and sub-invoices) marked paid.
    pub paid_invoices: usize,
    /// Invoice-type documents (top-level and sub-invoices) marked sent.
    pub pending_invoices: usize,
    /// Top-level quotes.
    pub quotes: usize,
    /// TTC of paid top-level invoices plus paid sub-invoices.
    pub revenue: f64,
}

impl DashboardStats {
    pub fn compute(repo: &InvoiceRepository) -> Self {
        let documents = repo
            .invoices()
            .iter()
            .chain(repo.sub_invoices().iter().map(|sub| &sub.invoice))
            .filter(|doc| doc.document_type == DocumentType::Invoice);

        let mut stats = DashboardStats::default();
        for doc in documents {
            match doc.status {
                InvoiceStatus::Paid => stats.paid_invoices += 1,
                InvoiceStatus::Sent => stats.pending_invoices += 1,
                _ => {}
            }
        }

        stats.quotes = repo
            .invoices()
            .iter()
            .filter(|inv| inv.document_type == DocumentType::Quote)
            .count();

        let paid_invoices: f64 = repo
            .invoices()
            .iter()
            .filter(|inv| inv.document_type == DocumentType::Invoice && inv.status.is_paid())
            .map(|inv| inv.totals.total_ttc)
            .sum();
        let paid_sub_invoices: f64 = repo
            .sub_invoices()
            .iter()
            .filter(|sub| sub.status().is_paid())
            .map(|sub| sub.totals().total_ttc)
            .sum();
        stats.revenue = paid_invoices + paid_sub_invoices;

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::fixtures::invoice_with_ttc;
    use crate::split::{SplitShare, split_invoice};
    use facturier_core::InvoiceId;

    #[test]
    fn empty_repository_has_zero_stats() {
        assert_eq!(DashboardStats::compute(&InvoiceRepository::new()), DashboardStats::default());
    }

    #[test]
    fn counts_and_revenue_include_paid_sub_invoices() {
        let mut repo = InvoiceRepository::new();
        repo.add_invoice(invoice_with_ttc("a", "FA0001", 120.0)).unwrap();
        repo.add_invoice(invoice_with_ttc("b", "FA0002", 300.0)).unwrap();
        let mut quote = invoice_with_ttc("q", "DE0001", 50.0);
        quote.document_type = DocumentType::Quote;
        repo.add_invoice(quote).unwrap();

        repo.toggle_paid(&InvoiceId::from("a")).unwrap();
        let ids = split_invoice(
            &mut repo,
            &InvoiceId::from("b"),
            &[SplitShare::new(50.0, 150.0), SplitShare::new(50.0, 150.0)],
        )
        .unwrap();
        repo.toggle_paid(&ids[0]).unwrap();

        let stats = DashboardStats::compute(&repo);
        // a + b-sub-1 paid; b and b-sub-2 sent; the quote is sent but not an invoice.
        assert_eq!(stats.paid_invoices, 2);
        assert_eq!(stats.pending_invoices, 2);
        assert_eq!(stats.quotes, 1);
        assert!((stats.revenue - 270.0).abs() < 1e-9);
    }
}

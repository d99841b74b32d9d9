//! Process-wide invoicing session.
//!
//! The session owns the invoice repository and the client directory for the
//! lifetime of the process, and writes the whole state back to its
//! [`SnapshotStore`] after every mutation that changed something.
//!
//! A failed save is reported as [`SessionError::Store`] but the in-memory
//! mutation stands: the next successful save persists it.

use chrono::Utc;
use thiserror::Error;

use facturier_core::{ClientId, DomainError, InvoiceId};
use facturier_invoicing::{
    DashboardStats, DeleteOutcome, DocumentType, Invoice, InvoiceDraft, InvoicePatch,
    InvoiceRepository, InvoiceStatus, SplitShare, split_invoice,
};
use facturier_parties::{Client, ClientDirectory, ClientPatch, CompanyPatch};

use crate::render::{DocumentRef, DocumentRenderer, RenderError, RenderedDocument};
use crate::snapshot::{AppSnapshot, SnapshotStore, StoreError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("persisting the snapshot failed: {0}")]
    Store(#[from] StoreError),
    #[error("rendering failed: {0}")]
    Render(#[from] RenderError),
}

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug)]
pub struct InvoicingSession<S, R> {
    repo: InvoiceRepository,
    directory: ClientDirectory,
    store: S,
    renderer: R,
}

impl<S, R> InvoicingSession<S, R>
where
    S: SnapshotStore,
    R: DocumentRenderer,
{
    /// Load the saved state, or start from the seeded state when the store
    /// is empty.
    pub fn open(store: S, renderer: R) -> SessionResult<Self> {
        let snapshot = match store.load()? {
            Some(snapshot) => snapshot,
            None => {
                tracing::info!("no saved state; starting from seeded data");
                AppSnapshot::seeded()
            }
        };
        let (repo, directory) = snapshot.into_parts();
        tracing::info!(
            invoices = repo.invoices().len(),
            sub_invoices = repo.sub_invoices().len(),
            clients = directory.clients().len(),
            "invoicing session opened"
        );
        Ok(Self {
            repo,
            directory,
            store,
            renderer,
        })
    }

    pub fn repository(&self) -> &InvoiceRepository {
        &self.repo
    }

    pub fn directory(&self) -> &ClientDirectory {
        &self.directory
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_parts(self) -> (InvoiceRepository, ClientDirectory, S, R) {
        (self.repo, self.directory, self.store, self.renderer)
    }

    /// Current state as it would be persisted.
    pub fn snapshot(&self) -> AppSnapshot {
        AppSnapshot::capture(&self.repo, &self.directory)
    }

    fn persist(&self) -> SessionResult<()> {
        if let Err(err) = self.store.save(&self.snapshot()) {
            tracing::error!(error = %err, "snapshot save failed; in-memory state kept");
            return Err(err.into());
        }
        Ok(())
    }

    // ---- documents ----

    pub fn add_invoice(&mut self, invoice: Invoice) -> SessionResult<()> {
        self.repo.add_invoice(invoice)?;
        self.persist()
    }

    /// Form save. The draft's client snapshot is kept as given; the current
    /// company profile is copied into the document.
    pub fn save_draft(&mut self, draft: InvoiceDraft) -> SessionResult<InvoiceId> {
        let id = self
            .repo
            .save_draft(draft, self.directory.company(), Utc::now())?;
        self.persist()?;
        Ok(id)
    }

    /// Returns `false` (and saves nothing) for an unknown id.
    pub fn update_invoice(&mut self, id: &InvoiceId, patch: InvoicePatch) -> SessionResult<bool> {
        let updated = self.repo.update_invoice(id, patch);
        if updated {
            self.persist()?;
        }
        Ok(updated)
    }

    pub fn delete_invoice(&mut self, id: &InvoiceId) -> SessionResult<DeleteOutcome> {
        let outcome = self.repo.delete_invoice(id);
        if outcome.invoice_removed || outcome.sub_invoices_removed > 0 {
            self.persist()?;
        }
        Ok(outcome)
    }

    pub fn split_invoice(
        &mut self,
        parent_id: &InvoiceId,
        shares: &[SplitShare],
    ) -> SessionResult<Vec<InvoiceId>> {
        let ids = split_invoice(&mut self.repo, parent_id, shares)?;
        self.persist()?;
        Ok(ids)
    }

    pub fn toggle_paid(&mut self, id: &InvoiceId) -> SessionResult<InvoiceStatus> {
        let status = self.repo.toggle_paid(id)?;
        self.persist()?;
        Ok(status)
    }

    pub fn toggle_cancelled(&mut self, id: &InvoiceId) -> SessionResult<InvoiceStatus> {
        let status = self.repo.toggle_cancelled(id)?;
        self.persist()?;
        Ok(status)
    }

    pub fn next_number(&self, document_type: DocumentType) -> String {
        self.repo.next_number(document_type)
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats::compute(&self.repo)
    }

    /// Render an invoice or sub-invoice with the session's renderer.
    pub fn render(&self, id: &InvoiceId) -> SessionResult<RenderedDocument> {
        let document = if let Some(invoice) = self.repo.invoice(id) {
            DocumentRef::Invoice(invoice)
        } else if let Some(sub) = self.repo.sub_invoice(id) {
            DocumentRef::SubInvoice(sub)
        } else {
            return Err(DomainError::not_found().into());
        };

        let rendered = self.renderer.render(document)?;
        tracing::debug!(invoice_id = %id, file_name = %rendered.file_name, "document rendered");
        Ok(rendered)
    }

    // ---- clients / company ----

    pub fn add_client(&mut self, client: Client) -> SessionResult<()> {
        self.directory.add_client(client)?;
        self.persist()
    }

    pub fn update_client(&mut self, id: &ClientId, patch: ClientPatch) -> SessionResult<bool> {
        let updated = self.directory.update_client(id, patch)?;
        if updated {
            self.persist()?;
        }
        Ok(updated)
    }

    pub fn delete_client(&mut self, id: &ClientId) -> SessionResult<bool> {
        let deleted = self.directory.delete_client(id);
        if deleted {
            self.persist()?;
        }
        Ok(deleted)
    }

    pub fn update_company(&mut self, patch: CompanyPatch) -> SessionResult<()> {
        self.directory.update_company(patch);
        self.persist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::PlainTextRenderer;
    use crate::snapshot::InMemorySnapshotStore;
    use chrono::NaiveDate;
    use facturier_core::LineItemId;
    use facturier_invoicing::LineItem;

    /// Store whose saves always fail.
    #[derive(Debug, Default)]
    struct BrokenStore;

    impl SnapshotStore for BrokenStore {
        fn load(&self) -> Result<Option<AppSnapshot>, StoreError> {
            Ok(None)
        }

        fn save(&self, _snapshot: &AppSnapshot) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("disk full".to_string()))
        }
    }

    fn draft(session: &InvoicingSession<impl SnapshotStore, PlainTextRenderer>) -> InvoiceDraft {
        let mut draft = InvoiceDraft::new(NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        draft.client = session.directory().clients().first().cloned();
        draft.items = vec![LineItem::new(LineItemId::from("l1"), "Audit", 1.0, 250.0, 20.0)];
        draft
    }

    #[test]
    fn opens_seeded_when_store_is_empty() {
        let session = InvoicingSession::open(InMemorySnapshotStore::new(), PlainTextRenderer).unwrap();
        assert!(session.repository().invoices().is_empty());
        assert_eq!(session.directory().clients().len(), 1);
        assert!(session.store().current().is_none());
    }

    #[test]
    fn mutations_are_persisted() {
        let mut session = InvoicingSession::open(InMemorySnapshotStore::new(), PlainTextRenderer).unwrap();
        let id = session.save_draft(draft(&session)).unwrap();

        let saved = session.store().current().unwrap();
        assert_eq!(saved.invoices.len(), 1);
        assert_eq!(saved.invoices[0].id, id);
        assert_eq!(saved.invoices[0].number, "FA0001");
        assert_eq!(session.next_number(DocumentType::Invoice), "FA0002");
    }

    #[test]
    fn unknown_ids_do_not_trigger_a_save() {
        let mut session = InvoicingSession::open(InMemorySnapshotStore::new(), PlainTextRenderer).unwrap();
        let missing = InvoiceId::from("missing");
        assert!(!session.update_invoice(&missing, InvoicePatch::status(InvoiceStatus::Paid)).unwrap());
        assert_eq!(session.delete_invoice(&missing).unwrap(), DeleteOutcome::default());
        assert!(!session.delete_client(&ClientId::from("missing")).unwrap());
        assert!(session.store().current().is_none());
    }

    #[test]
    fn store_failure_keeps_in_memory_state() {
        let mut session = InvoicingSession::open(BrokenStore, PlainTextRenderer).unwrap();
        let err = session.save_draft(draft(&session)).unwrap_err();
        assert!(matches!(err, SessionError::Store(_)));
        assert_eq!(session.repository().invoices().len(), 1);
    }

    #[test]
    fn domain_errors_skip_persistence() {
        let mut session = InvoicingSession::open(BrokenStore, PlainTextRenderer).unwrap();
        let err = session.toggle_paid(&InvoiceId::from("nope")).unwrap_err();
        assert!(matches!(err, SessionError::Domain(DomainError::NotFound)));
    }

    #[test]
    fn render_unknown_document_is_not_found() {
        let session = InvoicingSession::open(InMemorySnapshotStore::new(), PlainTextRenderer).unwrap();
        let err = session.render(&InvoiceId::from("nope")).unwrap_err();
        assert!(matches!(err, SessionError::Domain(DomainError::NotFound)));
    }
}

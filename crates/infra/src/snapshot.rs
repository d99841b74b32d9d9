//! Whole-state persistence.
//!
//! The application state is loaded once at startup and written back in full
//! after every committed mutation. Stores only move [`AppSnapshot`] values
//! around; they never interpret them.
//!
//! On disk the state sits inside the `{"state": ..., "version": 0}` envelope
//! written by the original browser storage. Bare state objects are accepted
//! on load; anything without a recognised state key is rejected so that a
//! foreign file is never mistaken for an empty state and overwritten.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use facturier_invoicing::{Invoice, InvoiceRepository, SubInvoice};
use facturier_parties::{Client, ClientDirectory, Company};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("snapshot store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Serialized application state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSnapshot {
    #[serde(default)]
    pub invoices: Vec<Invoice>,
    #[serde(default)]
    pub sub_invoices: Vec<SubInvoice>,
    #[serde(default)]
    pub clients: Vec<Client>,
    #[serde(default)]
    pub company: Company,
}

/// Envelope version written alongside the state.
pub const SNAPSHOT_VERSION: u64 = 0;

const STATE_KEYS: [&str; 4] = ["invoices", "subInvoices", "clients", "company"];

#[derive(Serialize)]
struct Envelope<'a> {
    state: &'a AppSnapshot,
    version: u64,
}

impl AppSnapshot {
    /// Decode a stored snapshot, enveloped or bare.
    pub fn from_json(bytes: &[u8]) -> Result<Self, StoreError> {
        let mut value: Value = serde_json::from_slice(bytes)?;

        let state = value.as_object_mut().and_then(|doc| doc.remove("state"));
        if let Some(state) = state {
            let newer = value
                .get("version")
                .and_then(Value::as_u64)
                .filter(|v| *v > SNAPSHOT_VERSION);
            if let Some(version) = newer {
                tracing::warn!(version, "snapshot written by a newer version; loading anyway");
            }
            value = state;
        }

        let recognised = value
            .as_object()
            .is_some_and(|doc| STATE_KEYS.iter().any(|key| doc.contains_key(*key)));
        if !recognised {
            return Err(StoreError::Serialization(serde::de::Error::custom(
                "document holds no invoicing state",
            )));
        }

        Ok(serde_json::from_value(value)?)
    }

    /// Encode inside the versioned envelope.
    pub fn to_json(&self) -> Result<Vec<u8>, StoreError> {
        Ok(serde_json::to_vec_pretty(&Envelope {
            state: self,
            version: SNAPSHOT_VERSION,
        })?)
    }

    /// State of a first launch: no documents, the default company and the
    /// sample client.
    pub fn seeded() -> Self {
        Self::capture(&InvoiceRepository::new(), &ClientDirectory::seeded())
    }

    pub fn capture(repo: &InvoiceRepository, directory: &ClientDirectory) -> Self {
        Self {
            invoices: repo.invoices().to_vec(),
            sub_invoices: repo.sub_invoices().to_vec(),
            clients: directory.clients().to_vec(),
            company: directory.company().clone(),
        }
    }

    pub fn into_parts(self) -> (InvoiceRepository, ClientDirectory) {
        (
            InvoiceRepository::from_parts(self.invoices, self.sub_invoices),
            ClientDirectory::new(self.clients, self.company),
        )
    }
}

/// Persistence collaborator for [`AppSnapshot`].
pub trait SnapshotStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<AppSnapshot>, StoreError>;

    fn save(&self, snapshot: &AppSnapshot) -> Result<(), StoreError>;
}

/// In-memory snapshot store.
///
/// Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    snapshot: RwLock<Option<AppSnapshot>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: AppSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(Some(snapshot)),
        }
    }

    /// Last saved snapshot, if any.
    pub fn current(&self) -> Option<AppSnapshot> {
        self.snapshot.read().ok().and_then(|s| s.clone())
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn load(&self) -> Result<Option<AppSnapshot>, StoreError> {
        let snapshot = self
            .snapshot
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        Ok(snapshot.clone())
    }

    fn save(&self, snapshot: &AppSnapshot) -> Result<(), StoreError> {
        let mut slot = self
            .snapshot
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        *slot = Some(snapshot.clone());
        Ok(())
    }
}

/// Snapshot kept as a single pretty-printed JSON file.
///
/// Saves go through a sibling temp file that is renamed over the target, so
/// an interrupted write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct JsonFileSnapshotStore {
    path: PathBuf,
}

impl JsonFileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for JsonFileSnapshotStore {
    fn load(&self) -> Result<Option<AppSnapshot>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no snapshot on disk");
                return Ok(None);
            }
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };
        let snapshot = AppSnapshot::from_json(&bytes)?;
        tracing::debug!(
            path = %self.path.display(),
            invoices = snapshot.invoices.len(),
            sub_invoices = snapshot.sub_invoices.len(),
            "snapshot loaded"
        );
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &AppSnapshot) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
        }

        let bytes = snapshot.to_json()?;
        let tmp = self.temp_path();
        if let Err(err) = write_and_replace(&tmp, &self.path, &bytes) {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %tmp.display(), error = %cleanup, "temp snapshot not removed");
                }
            }
            return Err(err);
        }

        tracing::debug!(path = %self.path.display(), bytes = bytes.len(), "snapshot saved");
        Ok(())
    }
}

fn write_and_replace(tmp: &Path, target: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let mut file = fs::File::create(tmp).map_err(|e| StoreError::io(tmp, e))?;
    file.write_all(bytes).map_err(|e| StoreError::io(tmp, e))?;
    file.sync_all().map_err(|e| StoreError::io(tmp, e))?;
    drop(file);
    fs::rename(tmp, target).map_err(|e| StoreError::io(target, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file() -> PathBuf {
        std::env::temp_dir()
            .join(format!("facturier-snapshot-{}", uuid::Uuid::now_v7()))
            .join("state.json")
    }

    #[test]
    fn seeded_snapshot_has_sample_client_and_default_company() {
        let snapshot = AppSnapshot::seeded();
        assert!(snapshot.invoices.is_empty());
        assert!(snapshot.sub_invoices.is_empty());
        assert_eq!(snapshot.clients.len(), 1);
        assert_eq!(snapshot.company, Company::default());
    }

    #[test]
    fn in_memory_store_round_trip() {
        let store = InMemorySnapshotStore::new();
        assert!(store.load().unwrap().is_none());

        let snapshot = AppSnapshot::seeded();
        store.save(&snapshot).unwrap();
        assert_eq!(store.load().unwrap(), Some(snapshot.clone()));
        assert_eq!(store.current(), Some(snapshot));
    }

    #[test]
    fn json_store_missing_file_is_none_and_save_creates_directories() {
        let path = temp_file();
        let store = JsonFileSnapshotStore::new(&path);
        assert!(store.load().unwrap().is_none());

        store.save(&AppSnapshot::seeded()).unwrap();
        assert!(path.exists());
        assert!(!store.temp_path().exists());
        assert_eq!(store.load().unwrap(), Some(AppSnapshot::seeded()));

        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn json_store_reports_corrupt_snapshot() {
        let path = temp_file();
        let dir = path.parent().unwrap().to_path_buf();
        fs::create_dir_all(&dir).unwrap();
        fs::write(&path, b"{ not json").unwrap();

        let err = JsonFileSnapshotStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn snapshot_uses_camel_case_keys() {
        let value = serde_json::to_value(AppSnapshot::seeded()).unwrap();
        assert!(value.get("subInvoices").is_some());
        assert!(value["company"].get("vatNumber").is_some());
    }

    #[test]
    fn missing_collections_default_to_empty() {
        let snapshot = AppSnapshot::from_json(br#"{"clients": []}"#).unwrap();
        assert!(snapshot.invoices.is_empty());
        assert_eq!(snapshot.company, Company::default());
    }

    #[test]
    fn browser_storage_envelope_is_unwrapped() {
        let json = r#"{
            "state": {
                "invoices": [],
                "subInvoices": [],
                "clients": [{ "id": "7", "name": "Boulangerie Martin", "email": "bm@example.fr" }],
                "company": { "name": "Atelier Lumière" }
            },
            "version": 0
        }"#
        .as_bytes();
        let snapshot = AppSnapshot::from_json(json).unwrap();
        assert_eq!(snapshot.clients.len(), 1);
        assert_eq!(snapshot.clients[0].name, "Boulangerie Martin");
        assert_eq!(snapshot.company.name, "Atelier Lumière");
    }

    #[test]
    fn documents_without_state_keys_are_rejected() {
        let documents: [&[u8]; 4] = [
            br#"{}"#,
            br#"{"state": {"foo": 1}, "version": 0}"#,
            br#"[]"#,
            br#"{"todos": []}"#,
        ];
        for json in documents {
            let err = AppSnapshot::from_json(json).unwrap_err();
            assert!(matches!(err, StoreError::Serialization(_)));
        }
    }

    #[test]
    fn saved_file_uses_the_envelope() {
        let bytes = AppSnapshot::seeded().to_json().unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["version"], 0);
        assert!(value["state"].get("subInvoices").is_some());
        assert_eq!(AppSnapshot::from_json(&bytes).unwrap(), AppSnapshot::seeded());
    }

    #[test]
    fn failed_replace_removes_temp_file() {
        let path = temp_file();
        // A non-empty directory at the target path makes the rename fail.
        fs::create_dir_all(path.join("occupied")).unwrap();
        let store = JsonFileSnapshotStore::new(&path);

        let err = store.save(&AppSnapshot::seeded()).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert!(!store.temp_path().exists());
        assert!(path.is_dir());

        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }
}

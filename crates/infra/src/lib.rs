//! Infrastructure layer: configuration, snapshot persistence, rendering and
//! the process-wide invoicing session.

pub mod config;
pub mod render;
pub mod session;
pub mod snapshot;

pub use config::{AppConfig, ConfigError};
pub use render::{DocumentRef, DocumentRenderer, PlainTextRenderer, RenderError, RenderedDocument};
pub use session::{InvoicingSession, SessionError, SessionResult};
pub use snapshot::{AppSnapshot, InMemorySnapshotStore, JsonFileSnapshotStore, SnapshotStore, StoreError};

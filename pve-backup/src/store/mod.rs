//! Persistence for settings and backup history.
//!
//! Both stores are traits so the service can run against in-memory state in
//! tests and JSON files in production. Each `HistoryStore` operation is
//! atomic on its own; a settings `load` followed by `save` is not, and callers
//! serialize those (see `BackupService`).

pub mod json_file;
pub mod memory;

use crate::models::{BackupRecord, BackupSettings};
use crate::Result;

pub use json_file::{JsonHistoryStore, JsonSettingsStore};
pub use memory::{MemoryHistoryStore, MemorySettingsStore};

/// Durable settings record (FTP target, catalog, auto-backup preferences).
pub trait SettingsStore: Send + Sync {
    /// Load the settings, falling back to defaults when nothing is stored yet.
    fn load(&self) -> Result<BackupSettings>;

    fn save(&self, settings: &BackupSettings) -> Result<()>;
}

/// Backup history, newest first.
pub trait HistoryStore: Send + Sync {
    fn list(&self) -> Result<Vec<BackupRecord>>;

    /// Insert `record` at the front.
    fn prepend(&self, record: BackupRecord) -> Result<()>;

    /// Remove the record with `id`. Returns whether one was removed.
    fn delete(&self, id: &str) -> Result<bool>;
}

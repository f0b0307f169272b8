//! JSON-file backed stores.
//!
//! Writes go to a temporary file next to the target and are renamed into
//! place, so a crash mid-write never leaves a truncated file behind.

use super::{HistoryStore, SettingsStore};
use crate::models::{BackupRecord, BackupSettings};
use crate::utils::errors::BackupError;
use crate::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(BackupError::Store(format!("{}: {}", path.display(), e))),
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, value)?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .map_err(|e| BackupError::Store(format!("{}: {}", path.display(), e)))?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&self) -> Result<BackupSettings> {
        Ok(read_json(&self.path)?.unwrap_or_default())
    }

    fn save(&self, settings: &BackupSettings) -> Result<()> {
        write_json(&self.path, settings)?;
        tracing::debug!("Settings written to {}", self.path.display());
        Ok(())
    }
}

#[derive(Debug)]
pub struct JsonHistoryStore {
    path: PathBuf,
    // prepend and delete rewrite the whole file
    write_lock: Mutex<()>,
}

impl JsonHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for JsonHistoryStore {
    fn list(&self) -> Result<Vec<BackupRecord>> {
        Ok(read_json(&self.path)?.unwrap_or_default())
    }

    fn prepend(&self, record: BackupRecord) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());
        let mut records = self.list()?;
        records.insert(0, record);
        write_json(&self.path, &records)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());
        let mut records = self.list()?;
        let Some(index) = records.iter().position(|r| r.id == id) else {
            return Ok(false);
        };
        records.remove(index);
        write_json(&self.path, &records)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BackupFrequency, BackupStatus, FtpTarget};
    use tempfile::TempDir;

    fn record(id: &str) -> BackupRecord {
        BackupRecord {
            id: id.to_string(),
            filename: format!("proxmox-backup-{id}.tar.gz"),
            date: "15.03.2024 14:30".to_string(),
            size: "2.0 KB".to_string(),
            status: BackupStatus::Success,
        }
    }

    #[test]
    fn test_missing_settings_file_gives_defaults() -> Result<()> {
        let dir = TempDir::new()?;
        let store = JsonSettingsStore::new(dir.path().join("backup_config.json"));
        assert_eq!(store.load()?, BackupSettings::default());
        assert!(!store.path().exists());
        Ok(())
    }

    #[test]
    fn test_settings_survive_reopen() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("nested").join("backup_config.json");

        let mut settings = BackupSettings::default();
        settings.ftp_config = FtpTarget::new("ftp.example.com", "backup", "secret", 2121);
        settings.auto_backup_frequency = BackupFrequency::Weekly;
        settings.toggle_item(0);
        JsonSettingsStore::new(&path).save(&settings)?;

        let reopened = JsonSettingsStore::new(&path);
        assert_eq!(reopened.load()?, settings);
        Ok(())
    }

    #[test]
    fn test_reads_files_written_by_hand() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("backup_config.json");
        std::fs::write(
            &path,
            r#"{
  "ftp_config": {"host": "10.0.0.5", "username": "pve", "password": "x", "port": 21},
  "backup_files": [
    {"path": "/etc/hosts", "name": "Hosts", "description": "", "critical": false, "selected": true}
  ],
  "auto_backup_enabled": true,
  "auto_backup_frequency": "weekly"
}"#,
        )?;

        let settings = JsonSettingsStore::new(&path).load()?;
        assert_eq!(settings.ftp_config.host, "10.0.0.5");
        assert_eq!(settings.backup_files.len(), 1);
        assert!(settings.auto_backup_enabled);
        assert_eq!(settings.auto_backup_frequency, BackupFrequency::Weekly);
        Ok(())
    }

    #[test]
    fn test_corrupt_file_is_an_error() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("backup_history.json");
        std::fs::write(&path, "not json")?;

        assert!(JsonHistoryStore::new(&path).list().is_err());
        Ok(())
    }

    #[test]
    fn test_history_round_trip() -> Result<()> {
        let dir = TempDir::new()?;
        let store = JsonHistoryStore::new(dir.path().join("backup_history.json"));
        assert!(store.list()?.is_empty());

        store.prepend(record("100"))?;
        store.prepend(record("200"))?;
        assert_eq!(store.list()?, vec![record("200"), record("100")]);

        assert!(!store.delete("300")?);
        assert_eq!(store.list()?.len(), 2);

        assert!(store.delete("200")?);
        assert_eq!(store.list()?, vec![record("100")]);
        Ok(())
    }

    #[test]
    fn test_history_status_is_lowercase() -> Result<()> {
        let dir = TempDir::new()?;
        let store = JsonHistoryStore::new(dir.path().join("backup_history.json"));
        store.prepend(record("1"))?;

        let raw = std::fs::read_to_string(store.path())?;
        assert!(raw.contains(r#""status": "success""#));
        Ok(())
    }

    #[test]
    fn test_delete_removes_only_newest_of_same_second() -> Result<()> {
        let dir = TempDir::new()?;
        let store = JsonHistoryStore::new(dir.path().join("backup_history.json"));
        let mut newer = record("1710513000");
        newer.filename = "proxmox-backup-newer.tar.gz".to_string();
        store.prepend(record("1710513000"))?;
        store.prepend(newer)?;

        assert!(store.delete("1710513000")?);
        assert_eq!(store.list()?, vec![record("1710513000")]);
        Ok(())
    }

    #[test]
    fn test_concurrent_prepends_are_all_kept() -> Result<()> {
        let dir = TempDir::new()?;
        let store = std::sync::Arc::new(JsonHistoryStore::new(dir.path().join("backup_history.json")));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = std::sync::Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..5 {
                        store.prepend(record(&format!("{t}-{i}"))).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.list()?.len(), 40);
        Ok(())
    }
}

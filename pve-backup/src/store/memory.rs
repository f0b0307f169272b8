use super::{HistoryStore, SettingsStore};
use crate::models::{BackupRecord, BackupSettings};
use crate::Result;
use std::sync::{Mutex, MutexGuard};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    settings: Mutex<Option<BackupSettings>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: BackupSettings) -> Self {
        Self {
            settings: Mutex::new(Some(settings)),
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<BackupSettings> {
        Ok(lock(&self.settings).clone().unwrap_or_default())
    }

    fn save(&self, settings: &BackupSettings) -> Result<()> {
        *lock(&self.settings) = Some(settings.clone());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    records: Mutex<Vec<BackupRecord>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<BackupRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn list(&self) -> Result<Vec<BackupRecord>> {
        Ok(lock(&self.records).clone())
    }

    fn prepend(&self, record: BackupRecord) -> Result<()> {
        lock(&self.records).insert(0, record);
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let mut records = lock(&self.records);
        match records.iter().position(|r| r.id == id) {
            Some(index) => {
                records.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BackupStatus;

    fn record(id: &str) -> BackupRecord {
        BackupRecord {
            id: id.to_string(),
            filename: format!("proxmox-backup-{id}.tar.gz"),
            date: "15.03.2024 14:30".to_string(),
            size: "1.0 KB".to_string(),
            status: BackupStatus::Success,
        }
    }

    #[test]
    fn test_prepend_is_newest_first() {
        let store = MemoryHistoryStore::new();
        store.prepend(record("1")).unwrap();
        store.prepend(record("2")).unwrap();

        let ids: Vec<_> = store.list().unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["2", "1"]);
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let store = MemoryHistoryStore::with_records(vec![record("1"), record("2")]);
        let before = store.list().unwrap();

        assert!(!store.delete("42").unwrap());
        assert_eq!(store.list().unwrap(), before);
    }

    #[test]
    fn test_delete_removes_one() {
        let store = MemoryHistoryStore::with_records(vec![record("1"), record("2")]);
        assert!(store.delete("1").unwrap());
        assert_eq!(store.list().unwrap(), vec![record("2")]);
    }

    #[test]
    fn test_settings_default_until_saved() {
        let store = MemorySettingsStore::new();
        assert_eq!(store.load().unwrap(), BackupSettings::default());

        let mut settings = BackupSettings::default();
        settings.auto_backup_enabled = true;
        store.save(&settings).unwrap();
        assert!(store.load().unwrap().auto_backup_enabled);
    }
}

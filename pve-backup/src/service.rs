//! Operator-facing actions.
//!
//! Settings updates (load, change, save) hold the settings lock so concurrent
//! callers never lose each other's changes. Backup runs hold a separate run
//! lock: runs never overlap, and reads, toggles and deletes stay available
//! during a long upload.

use crate::archive::ArchiveBuilder;
use crate::config::Config;
use crate::executor::BackupExecutor;
use crate::models::{BackupFrequency, BackupRecord, BackupSettings, FtpTarget};
use crate::store::{HistoryStore, JsonHistoryStore, JsonSettingsStore, SettingsStore};
use crate::transfer::{FtpTransfer, Transfer, TransferOutcome};
use crate::Result;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

/// Dashboard view of the current state.
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub settings: BackupSettings,
    pub history: Vec<BackupRecord>,
    pub selected_count: usize,
    pub critical_selected: usize,
    pub critical_total: usize,
}

impl Overview {
    fn new(mut settings: BackupSettings, history: Vec<BackupRecord>) -> Self {
        let items = &settings.backup_files;
        let selected_count = items.iter().filter(|i| i.selected).count();
        let critical_selected = items.iter().filter(|i| i.critical && i.selected).count();
        let critical_total = items.iter().filter(|i| i.critical).count();

        if !settings.ftp_config.password.is_empty() {
            settings.ftp_config.password = "********".to_string();
        }

        Self {
            settings,
            history,
            selected_count,
            critical_selected,
            critical_total,
        }
    }
}

pub struct BackupService {
    settings: Arc<dyn SettingsStore>,
    history: Arc<dyn HistoryStore>,
    transfer: Arc<dyn Transfer>,
    executor: BackupExecutor,
    settings_lock: Mutex<()>,
    run_lock: Mutex<()>,
}

impl BackupService {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        history: Arc<dyn HistoryStore>,
        transfer: Arc<dyn Transfer>,
        archiver: ArchiveBuilder,
        temp_root: PathBuf,
    ) -> Self {
        let executor = BackupExecutor::new(transfer.clone(), history.clone(), archiver, temp_root);
        Self {
            settings,
            history,
            transfer,
            executor,
            settings_lock: Mutex::new(()),
            run_lock: Mutex::new(()),
        }
    }

    /// JSON-file stores and the FTP client, as configured.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(JsonSettingsStore::new(&config.storage.settings_file)),
            Arc::new(JsonHistoryStore::new(&config.storage.history_file)),
            Arc::new(FtpTransfer::from_config(&config.transfer)),
            ArchiveBuilder::new(config.archive.compression_level),
            config.archive.temp_root(),
        )
    }

    fn guard(lock: &Mutex<()>) -> MutexGuard<'_, ()> {
        lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn settings(&self) -> Result<BackupSettings> {
        self.settings.load()
    }

    pub fn history(&self) -> Result<Vec<BackupRecord>> {
        self.history.list()
    }

    pub fn overview(&self) -> Result<Overview> {
        Ok(Overview::new(self.settings.load()?, self.history.list()?))
    }

    /// Check that `target` accepts a login. Nothing is persisted.
    pub fn test_connection(&self, target: &FtpTarget) -> TransferOutcome {
        self.transfer.test_connection(target)
    }

    pub fn save_ftp_target(&self, target: FtpTarget) -> Result<()> {
        let _guard = Self::guard(&self.settings_lock);
        let mut settings = self.settings.load()?;
        info!("Saving FTP target {}:{}", target.host, target.port);
        settings.ftp_config = target;
        self.settings.save(&settings)
    }

    /// Flip `selected` on the item at `index`. Out-of-range indexes change nothing.
    pub fn toggle_item(&self, index: usize) -> Result<Option<bool>> {
        let _guard = Self::guard(&self.settings_lock);
        let mut settings = self.settings.load()?;
        let Some(selected) = settings.toggle_item(index) else {
            return Ok(None);
        };
        self.settings.save(&settings)?;
        info!("Item {} ({}) selected: {}", index, settings.backup_files[index].path, selected);
        Ok(Some(selected))
    }

    /// Run a backup with the settings as they are when the run starts.
    pub fn run_backup_now(&self) -> Result<BackupRecord> {
        let _run = Self::guard(&self.run_lock);
        let settings = {
            let _guard = Self::guard(&self.settings_lock);
            self.settings.load()?
        };
        self.executor.run(&settings)
    }

    pub fn delete_record(&self, id: &str) -> Result<bool> {
        let deleted = self.history.delete(id)?;
        if deleted {
            info!("Deleted backup record {}", id);
        }
        Ok(deleted)
    }

    /// Flip the auto-backup flag. The flag is stored only; nothing acts on it.
    pub fn toggle_auto_backup(&self) -> Result<bool> {
        let _guard = Self::guard(&self.settings_lock);
        let mut settings = self.settings.load()?;
        settings.auto_backup_enabled = !settings.auto_backup_enabled;
        self.settings.save(&settings)?;
        info!("Auto backup enabled: {}", settings.auto_backup_enabled);
        Ok(settings.auto_backup_enabled)
    }

    /// Store the auto-backup frequency. Only `weekly` and `monthly` are accepted.
    pub fn set_frequency(&self, frequency: &str) -> Result<BackupFrequency> {
        let frequency: BackupFrequency = frequency.parse()?;
        let _guard = Self::guard(&self.settings_lock);
        let mut settings = self.settings.load()?;
        settings.auto_backup_frequency = frequency;
        self.settings.save(&settings)?;
        info!("Auto backup frequency: {}", frequency);
        Ok(frequency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BackupItem, BackupStatus};
    use crate::store::{MemoryHistoryStore, MemorySettingsStore};
    use crate::transfer::ftp::tests::FakeFtpServer;
    use crate::utils::errors::BackupError;
    use flate2::read::GzDecoder;
    use std::fs;
    use std::path::Path;
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Upload that blocks until the test lets it finish.
    struct GatedTransfer {
        entered: Mutex<Sender<()>>,
        release: Mutex<Receiver<()>>,
    }

    impl Transfer for GatedTransfer {
        fn test_connection(&self, _target: &FtpTarget) -> TransferOutcome {
            TransferOutcome::success("Connection successful")
        }

        fn upload(&self, _local_file: &Path, _target: &FtpTarget) -> TransferOutcome {
            self.entered.lock().unwrap().send(()).unwrap();
            self.release.lock().unwrap().recv().unwrap();
            TransferOutcome::success("File uploaded to FTP server")
        }
    }

    fn service_with(settings: BackupSettings, temp_root: &TempDir) -> BackupService {
        BackupService::new(
            Arc::new(MemorySettingsStore::with_settings(settings)),
            Arc::new(MemoryHistoryStore::new()),
            Arc::new(FtpTransfer::new(Duration::from_secs(5), Some(Duration::from_secs(5)))),
            ArchiveBuilder::default(),
            temp_root.path().to_path_buf(),
        )
    }

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
    fn test_end_to_end_backup() {
        let source = TempDir::new().unwrap();
        let temp_root = TempDir::new().unwrap();
        let file = source.path().join("a.txt");
        fs::write(&file, b"hello from pve").unwrap();

        let server = FakeFtpServer::start("secret");
        let settings = BackupSettings {
            ftp_config: FtpTarget::new("127.0.0.1", "backup", "secret", server.port),
            backup_files: vec![BackupItem::new(file.to_str().unwrap(), "a", "", false, true)],
            ..BackupSettings::default()
        };
        let service = service_with(settings, &temp_root);

        let record = service.run_backup_now().unwrap();
        assert_eq!(record.status, BackupStatus::Success);
        assert!(record.filename.starts_with("proxmox-backup-"));
        assert!(record.filename.ends_with(".tar.gz"));
        assert_eq!(service.history().unwrap(), vec![record.clone()]);

        let session = server.finish();
        let (remote_name, content) = session.stored.unwrap();
        assert_eq!(remote_name, record.filename);

        let mut tar = tar::Archive::new(GzDecoder::new(content.as_slice()));
        let names: Vec<PathBuf> = tar
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().into_owned())
            .collect();
        let expected = file.strip_prefix("/").unwrap().to_path_buf();
        assert_eq!(names, vec![expected]);

        assert!(fs::read_dir(temp_root.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_stalled_upload_does_not_block_other_actions() {
        let source = TempDir::new().unwrap();
        let temp_root = TempDir::new().unwrap();
        let file = source.path().join("hosts");
        fs::write(&file, b"127.0.0.1 localhost\n").unwrap();

        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let settings = BackupSettings {
            ftp_config: FtpTarget::new("ftp.example.com", "backup", "secret", 21),
            backup_files: vec![
                BackupItem::new(file.to_str().unwrap(), "hosts", "", false, true),
                BackupItem::new("/etc/vzdump.conf", "vzdump", "", false, false),
            ],
            ..BackupSettings::default()
        };
        let service = Arc::new(BackupService::new(
            Arc::new(MemorySettingsStore::with_settings(settings)),
            Arc::new(MemoryHistoryStore::with_records(vec![record("1")])),
            Arc::new(GatedTransfer {
                entered: Mutex::new(entered_tx),
                release: Mutex::new(release_rx),
            }),
            ArchiveBuilder::default(),
            temp_root.path().to_path_buf(),
        ));

        let runner = {
            let service = Arc::clone(&service);
            thread::spawn(move || service.run_backup_now())
        };
        entered_rx.recv_timeout(Duration::from_secs(10)).unwrap();

        assert_eq!(service.overview().unwrap().history, vec![record("1")]);
        assert_eq!(service.toggle_item(1).unwrap(), Some(true));
        assert!(service.delete_record("1").unwrap());

        release_tx.send(()).unwrap();
        let finished = runner.join().unwrap().unwrap();
        assert_eq!(service.history().unwrap(), vec![finished]);
        assert!(service.settings().unwrap().backup_files[1].selected);
    }

    #[test]
    fn test_run_without_selection() {
        let temp_root = TempDir::new().unwrap();
        let mut settings = BackupSettings::default();
        settings.ftp_config = FtpTarget::new("ftp.example.com", "u", "p", 21);
        settings.backup_files.iter_mut().for_each(|i| i.selected = false);
        let service = service_with(settings, &temp_root);

        assert!(matches!(service.run_backup_now(), Err(BackupError::SelectionEmpty)));
        assert!(service.history().unwrap().is_empty());
    }

    #[test]
    fn test_run_without_destination() {
        let temp_root = TempDir::new().unwrap();
        let service = service_with(BackupSettings::default(), &temp_root);

        assert!(matches!(
            service.run_backup_now(),
            Err(BackupError::DestinationUnconfigured)
        ));
        assert!(fs::read_dir(temp_root.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_toggle_item_twice() {
        let temp_root = TempDir::new().unwrap();
        let service = service_with(BackupSettings::default(), &temp_root);
        let original = service.settings().unwrap().backup_files[7].selected;

        assert_eq!(service.toggle_item(7).unwrap(), Some(!original));
        assert_eq!(service.settings().unwrap().backup_files[7].selected, !original);
        assert_eq!(service.toggle_item(7).unwrap(), Some(original));
        assert_eq!(service.settings().unwrap(), BackupSettings::default());
    }

    #[test]
    fn test_toggle_item_out_of_range() {
        let temp_root = TempDir::new().unwrap();
        let service = service_with(BackupSettings::default(), &temp_root);

        assert_eq!(service.toggle_item(10).unwrap(), None);
        assert_eq!(service.settings().unwrap(), BackupSettings::default());
    }

    #[test]
    fn test_save_ftp_target() {
        let temp_root = TempDir::new().unwrap();
        let service = service_with(BackupSettings::default(), &temp_root);
        let target = FtpTarget::new("192.168.1.20", "pve", "pw", 2121);

        service.save_ftp_target(target.clone()).unwrap();
        let settings = service.settings().unwrap();
        assert_eq!(settings.ftp_config, target);
        assert_eq!(settings.backup_files, BackupSettings::default().backup_files);
    }

    #[test]
    fn test_auto_backup_settings_are_stored() {
        let temp_root = TempDir::new().unwrap();
        let service = service_with(BackupSettings::default(), &temp_root);

        assert!(service.toggle_auto_backup().unwrap());
        assert!(!service.toggle_auto_backup().unwrap());

        assert_eq!(service.set_frequency("weekly").unwrap(), BackupFrequency::Weekly);
        assert_eq!(service.settings().unwrap().auto_backup_frequency, BackupFrequency::Weekly);
    }

    #[test]
    fn test_invalid_frequency_leaves_store_untouched() {
        let temp_root = TempDir::new().unwrap();
        let service = service_with(BackupSettings::default(), &temp_root);

        assert!(matches!(
            service.set_frequency("daily"),
            Err(BackupError::InvalidFrequency(_))
        ));
        assert_eq!(service.settings().unwrap(), BackupSettings::default());
    }

    #[test]
    fn test_delete_record() {
        let temp_root = TempDir::new().unwrap();
        let service = BackupService::new(
            Arc::new(MemorySettingsStore::new()),
            Arc::new(MemoryHistoryStore::with_records(vec![record("2"), record("1")])),
            Arc::new(FtpTransfer::default()),
            ArchiveBuilder::default(),
            temp_root.path().to_path_buf(),
        );

        assert!(!service.delete_record("3").unwrap());
        assert_eq!(service.history().unwrap(), vec![record("2"), record("1")]);

        assert!(service.delete_record("2").unwrap());
        assert_eq!(service.history().unwrap(), vec![record("1")]);
    }

    #[test]
    fn test_overview_counts_and_masks_password() {
        let temp_root = TempDir::new().unwrap();
        let mut settings = BackupSettings::default();
        settings.ftp_config = FtpTarget::new("ftp.example.com", "u", "secret", 21);
        settings.toggle_item(0);
        let service = service_with(settings, &temp_root);

        let overview = service.overview().unwrap();
        assert_eq!(overview.selected_count, 8);
        assert_eq!(overview.critical_selected, 1);
        assert_eq!(overview.critical_total, 2);
        assert_eq!(overview.settings.ftp_config.password, "********");
        assert_eq!(service.settings().unwrap().ftp_config.password, "secret");
    }
}

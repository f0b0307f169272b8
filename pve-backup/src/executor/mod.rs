//! Backup executor - Orchestrates one backup run.
//!
//! Archive the selected catalog items into a scoped temporary directory,
//! upload the archive, record the outcome in the history store. The
//! temporary directory is removed on every exit path, unwinding included.

use crate::archive::ArchiveBuilder;
use crate::models::{BackupRecord, BackupSettings, BackupStatus};
use crate::store::HistoryStore;
use crate::transfer::Transfer;
use crate::utils::errors::BackupError;
use crate::utils::format::{archive_timestamp, display_date, format_size};
use crate::Result;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

const ARCHIVE_PREFIX: &str = "proxmox-backup-";
const ARCHIVE_SUFFIX: &str = ".tar.gz";

/// `proxmox-backup-<YYYY-MM-DD_HH-MM-SS>.tar.gz` for the given local time.
pub fn archive_file_name(now: &DateTime<Local>) -> String {
    format!("{}{}{}", ARCHIVE_PREFIX, archive_timestamp(now), ARCHIVE_SUFFIX)
}

/// Main backup executor
pub struct BackupExecutor {
    transfer: Arc<dyn Transfer>,
    history: Arc<dyn HistoryStore>,
    archiver: ArchiveBuilder,
    temp_root: PathBuf,
}

impl BackupExecutor {
    pub fn new(
        transfer: Arc<dyn Transfer>,
        history: Arc<dyn HistoryStore>,
        archiver: ArchiveBuilder,
        temp_root: PathBuf,
    ) -> Self {
        Self {
            transfer,
            history,
            archiver,
            temp_root,
        }
    }

    /// Run a backup now.
    pub fn run(&self, settings: &BackupSettings) -> Result<BackupRecord> {
        self.run_at(settings, Local::now())
    }

    /// Run a backup, stamping the archive name and history record with `now`.
    pub fn run_at(&self, settings: &BackupSettings, now: DateTime<Local>) -> Result<BackupRecord> {
        let selected = settings.selected_items();
        if selected.is_empty() {
            return Err(BackupError::SelectionEmpty);
        }
        if !settings.ftp_config.is_configured() {
            return Err(BackupError::DestinationUnconfigured);
        }

        let filename = archive_file_name(&now);
        info!(
            "Starting backup {} ({} items) to {}:{}",
            filename,
            selected.len(),
            settings.ftp_config.host,
            settings.ftp_config.port
        );

        let workdir = tempfile::Builder::new()
            .prefix("pve-backup-")
            .tempdir_in(&self.temp_root)
            .map_err(BackupError::ArchiveIo)?;
        let archive_path = workdir.path().join(&filename);

        let result = self.archive_and_ship(settings, &archive_path, &filename, &now);

        if let Err(e) = workdir.close() {
            warn!("Failed to remove temporary archive {}: {}", archive_path.display(), e);
        }

        match &result {
            Ok(record) => info!("Backup {} completed ({})", record.filename, record.size),
            Err(e) => error!("Backup {} failed: {}", filename, e),
        }
        result
    }

    fn archive_and_ship(
        &self,
        settings: &BackupSettings,
        archive_path: &Path,
        filename: &str,
        now: &DateTime<Local>,
    ) -> Result<BackupRecord> {
        self.archiver.build(&settings.backup_files, archive_path)?;

        let outcome = self.transfer.upload(archive_path, &settings.ftp_config);
        if !outcome.ok {
            return Err(BackupError::TransferFailure(outcome.message));
        }

        let size = match std::fs::metadata(archive_path) {
            Ok(metadata) => format_size(metadata.len()),
            Err(_) => "0 B".to_string(),
        };

        let record = BackupRecord {
            id: now.timestamp().to_string(),
            filename: filename.to_string(),
            date: display_date(now),
            size,
            status: BackupStatus::Success,
        };
        self.history.prepend(record.clone())?;

        Ok(record)
    }
}

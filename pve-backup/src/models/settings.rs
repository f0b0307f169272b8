//! The persisted settings record.

use super::backup_item::{default_catalog, BackupItem};
use super::ftp_target::FtpTarget;
use crate::utils::errors::BackupError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Preferred interval for automatic backups. Stored only; nothing schedules on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupFrequency {
    Weekly,
    #[default]
    Monthly,
}

impl FromStr for BackupFrequency {
    type Err = BackupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(BackupError::InvalidFrequency(other.to_string())),
        }
    }
}

impl fmt::Display for BackupFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weekly => f.write_str("weekly"),
            Self::Monthly => f.write_str("monthly"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupSettings {
    #[serde(default)]
    pub ftp_config: FtpTarget,

    #[serde(default = "default_catalog")]
    pub backup_files: Vec<BackupItem>,

    #[serde(default)]
    pub auto_backup_enabled: bool,

    #[serde(default)]
    pub auto_backup_frequency: BackupFrequency,
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            ftp_config: FtpTarget::default(),
            backup_files: default_catalog(),
            auto_backup_enabled: false,
            auto_backup_frequency: BackupFrequency::default(),
        }
    }
}

impl BackupSettings {
    pub fn selected_items(&self) -> Vec<BackupItem> {
        self.backup_files.iter().filter(|i| i.selected).cloned().collect()
    }

    /// Invert `selected` at `index`. Returns the new value, or `None` when the
    /// index is outside the catalog.
    pub fn toggle_item(&mut self, index: usize) -> Option<bool> {
        let item = self.backup_files.get_mut(index)?;
        item.selected = !item.selected;
        Some(item.selected)
    }
}

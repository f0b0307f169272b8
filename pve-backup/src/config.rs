//! Configuration management for the backup tool.
//!
//! Loads configuration from a TOML file. Every field has a default, so a
//! missing section or an empty file is valid.

use crate::utils::errors::BackupError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub archive: ArchiveConfig,
    pub transfer: TransferConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding the FTP target, catalog and auto-backup preferences
    pub settings_file: PathBuf,

    /// JSON file holding the backup history
    pub history_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Where scoped working directories are created (system temp dir if unset)
    pub temp_dir: Option<PathBuf>,

    /// gzip level (0-9)
    pub compression_level: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    pub connect_timeout_secs: u64,

    /// Control channel read/write timeout, 0 disables it
    pub io_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            settings_file: PathBuf::from("backup_config.json"),
            history_file: PathBuf::from("backup_history.json"),
        }
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            temp_dir: None,
            compression_level: 6,
        }
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            io_timeout_secs: 120,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl ArchiveConfig {
    pub fn temp_root(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, BackupError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BackupError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, BackupError> {
        let config: Config =
            toml::from_str(content).map_err(|e| BackupError::Config(e.to_string()))?;
        if config.archive.compression_level > 9 {
            return Err(BackupError::Config(format!(
                "archive.compression_level must be 0-9, got {}",
                config.archive.compression_level
            )));
        }
        Ok(config)
    }
}

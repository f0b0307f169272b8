//! Error types for the backup pipeline.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("No backup items are selected")]
    SelectionEmpty,

    #[error("No FTP server is configured")]
    DestinationUnconfigured,

    #[error("Archive error: {0}")]
    ArchiveIo(#[source] std::io::Error),

    #[error("{0}")]
    TransferFailure(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Invalid backup frequency: {0} (expected weekly or monthly)")]
    InvalidFrequency(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BackupError>;

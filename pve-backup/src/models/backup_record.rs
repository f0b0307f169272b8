use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupStatus {
    Success,
    /// Never written by the executor; kept so older history files still load.
    Failed,
}

/// One entry of the backup history. Never mutated once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRecord {
    /// Unix seconds at creation time
    pub id: String,
    pub filename: String,
    pub date: String,
    pub size: String,
    pub status: BackupStatus,
}

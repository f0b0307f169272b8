//! Transfer client: ships archives to the remote FTP server.

pub mod ftp;

use crate::models::FtpTarget;
use serde::Serialize;
use std::path::Path;

pub use ftp::FtpTransfer;

/// Result of a transfer operation as shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferOutcome {
    #[serde(rename = "success")]
    pub ok: bool,
    pub message: String,
}

impl TransferOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// A remote destination for archives.
///
/// Implementations never return errors: every failure is folded into a
/// `TransferOutcome` with `ok == false`.
pub trait Transfer: Send + Sync {
    /// Connect, authenticate and issue one harmless command.
    fn test_connection(&self, target: &FtpTarget) -> TransferOutcome;

    /// Upload `local_file` under its base name.
    fn upload(&self, local_file: &Path, target: &FtpTarget) -> TransferOutcome;
}

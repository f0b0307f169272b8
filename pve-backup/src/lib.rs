//! PVE Backup Library
//!
//! Backs up Proxmox host configuration paths into a `.tar.gz` and ships it
//! to an FTP server, keeping a history of past runs.

pub mod archive;
pub mod config;
pub mod executor;
pub mod fs;
pub mod models;
pub mod service;
pub mod store;
pub mod transfer;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use service::BackupService;
pub use utils::errors::BackupError;
pub type Result<T> = std::result::Result<T, BackupError>;

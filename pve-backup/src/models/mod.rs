//! Persisted data model: catalog items, FTP target, history records and
//! the settings record that ties them together.

pub mod backup_item;
pub mod backup_record;
pub mod ftp_target;
pub mod settings;

pub use backup_item::BackupItem;
pub use backup_record::{BackupRecord, BackupStatus};
pub use ftp_target::FtpTarget;
pub use settings::{BackupFrequency, BackupSettings};

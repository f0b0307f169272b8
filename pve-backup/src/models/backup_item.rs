use serde::{Deserialize, Serialize};

/// One entry of the backup catalog. Identity is the position in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupItem {
    /// Filesystem path; a trailing `*` matches every sibling with that prefix
    pub path: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Advisory only, never changes what gets archived
    #[serde(default)]
    pub critical: bool,
    #[serde(default)]
    pub selected: bool,
}

impl BackupItem {
    pub fn new(path: &str, name: &str, description: &str, critical: bool, selected: bool) -> Self {
        Self {
            path: path.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            critical,
            selected,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.path.ends_with('*')
    }
}

/// Catalog shipped with a fresh installation.
pub fn default_catalog() -> Vec<BackupItem> {
    vec![
        BackupItem::new("/etc/pve/", "PVE configuration", "Main Proxmox configuration (VMs, storage, users)", true, true),
        BackupItem::new("/etc/network/interfaces", "Network configuration", "Networks, bridges and VLANs", true, true),
        BackupItem::new("/etc/hosts", "Hosts file", "IP address to hostname mapping", false, true),
        BackupItem::new("/etc/hostname", "Hostname", "Server identity", false, true),
        BackupItem::new("/etc/resolv.conf", "DNS configuration", "DNS resolver settings", false, true),
        BackupItem::new("/etc/ssl/pve/", "SSL certificates", "Certificates for the web interface", false, true),
        BackupItem::new("/root/", "Root home directory", "Administrator scripts and settings", false, true),
        BackupItem::new("/var/lib/vz/template/", "ISO images and templates", "VM/CT images and templates (may be large)", false, false),
        BackupItem::new("/etc/cron*", "Cron jobs", "Scheduled tasks", false, true),
        BackupItem::new("/etc/vzdump.conf", "Vzdump configuration", "VM/CT backup settings", false, true),
    ]
}

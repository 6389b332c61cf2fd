//! Logical drive enumeration and filtering

use crate::platform::Platform;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use sysinfo::Disks;
use tracing::debug;

/// File systems reached over the network
const NETWORK_FILE_SYSTEMS: &[&str] = &[
    "nfs", "nfs4", "cifs", "smbfs", "smb3", "sshfs", "fuse.sshfs", "9p", "afs", "ncpfs",
    "davfs", "fuse.davfs", "webdav", "afpfs",
];

/// File systems backed by memory
const RAM_FILE_SYSTEMS: &[&str] = &["tmpfs", "ramfs", "devtmpfs"];

/// Mount points that never hold installed programs
pub const PSEUDO_MOUNTS: &[&str] = &["/sys", "/run", "/proc", "/tmp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DriveKind {
    Fixed,
    Removable,
    Network,
    Ram,
    Unknown,
}

impl DriveKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriveKind::Fixed => "fixed",
            DriveKind::Removable => "removable",
            DriveKind::Network => "network",
            DriveKind::Ram => "ram",
            DriveKind::Unknown => "unknown",
        }
    }

    /// Classify from the file system name and removable flag
    pub fn classify(file_system: &str, removable: bool) -> Self {
        let fs = file_system.to_ascii_lowercase();
        if NETWORK_FILE_SYSTEMS.contains(&fs.as_str()) {
            DriveKind::Network
        } else if RAM_FILE_SYSTEMS.contains(&fs.as_str()) {
            DriveKind::Ram
        } else if removable {
            DriveKind::Removable
        } else if fs.is_empty() {
            DriveKind::Unknown
        } else {
            DriveKind::Fixed
        }
    }
}

/// A mounted logical drive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Drive {
    pub root: PathBuf,
    pub name: String,
    pub kind: DriveKind,
    pub file_system: String,
    pub total_space: u64,
    pub available_space: u64,
}

/// Source of the machine's mounted drives
pub trait DriveEnumerator: Send + Sync {
    /// Every mounted drive, unfiltered
    fn drives(&self) -> Vec<Drive>;

    /// Drives worth walking, per `filter`
    fn searchable_drives(&self, filter: &DriveFilter) -> Vec<Drive> {
        filter.apply(self.drives())
    }
}

/// Drives reported by the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemDrives;

impl DriveEnumerator for SystemDrives {
    fn drives(&self) -> Vec<Drive> {
        let disks = Disks::new_with_refreshed_list();
        disks
            .list()
            .iter()
            .map(|disk| {
                let file_system = disk.file_system().to_string_lossy().into_owned();
                Drive {
                    root: disk.mount_point().to_path_buf(),
                    name: disk.name().to_string_lossy().into_owned(),
                    kind: DriveKind::classify(&file_system, disk.is_removable()),
                    file_system,
                    total_space: disk.total_space(),
                    available_space: disk.available_space(),
                }
            })
            .collect()
    }
}

/// Rules deciding which drives are walked
#[derive(Debug, Clone)]
pub struct DriveFilter {
    platform: Platform,
    excluded: Vec<PathBuf>,
}

impl DriveFilter {
    /// Default rules for `platform`, pseudo mounts excluded off Windows
    pub fn new(platform: Platform) -> Self {
        let excluded = if platform.is_windows() {
            Vec::new()
        } else {
            PSEUDO_MOUNTS.iter().map(PathBuf::from).collect()
        };
        Self { platform, excluded }
    }

    /// Additionally exclude drives mounted at or under `prefix`
    pub fn exclude(mut self, prefix: impl Into<PathBuf>) -> Self {
        self.excluded.push(prefix.into());
        self
    }

    /// Drop every mount-point exclusion, keeping the other rules
    pub fn without_mount_exclusions(mut self) -> Self {
        self.excluded.clear();
        self
    }

    pub fn is_searchable(&self, drive: &Drive) -> bool {
        let reason = if drive.kind == DriveKind::Network {
            Some("network drive")
        } else if self.platform.is_windows() && drive.kind == DriveKind::Ram {
            Some("RAM drive")
        } else if drive.total_space == 0 || drive.available_space == 0 {
            Some("no usable space")
        } else if is_bare_letter(&drive.name) {
            Some("malformed name")
        } else if self.is_excluded(&drive.root) {
            Some("excluded mount")
        } else {
            None
        };

        match reason {
            Some(reason) => {
                debug!("Skipping drive {} ({})", drive.root.display(), reason);
                false
            }
            None => true,
        }
    }

    /// Filter and de-duplicate by root, keeping enumeration order
    pub fn apply(&self, drives: Vec<Drive>) -> Vec<Drive> {
        let mut seen = HashSet::new();
        drives
            .into_iter()
            .filter(|d| self.is_searchable(d))
            .filter(|d| seen.insert(d.root.clone()))
            .collect()
    }

    fn is_excluded(&self, root: &Path) -> bool {
        self.excluded.iter().any(|prefix| root.starts_with(prefix))
    }
}

fn is_bare_letter(name: &str) -> bool {
    let mut chars = name.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_alphanumeric())
}

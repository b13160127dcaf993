//! Directory listing for the picker.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, trace, warn};

/// One subdirectory of the base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateEntry {
    /// Directory basename.
    pub name: String,
    /// Always `base.join(name)`.
    pub path: PathBuf,
    pub created_at: SystemTime,
    pub modified_at: SystemTime,
}

impl CandidateEntry {
    pub fn new(base: &Path, name: &str, created_at: SystemTime, modified_at: SystemTime) -> Self {
        Self {
            name: name.to_string(),
            path: base.join(name),
            created_at,
            modified_at,
        }
    }
}

/// Lists the immediate subdirectories of `base`.
///
/// A missing or unreadable `base` yields an empty list. Entries whose names
/// are not valid UTF-8 are skipped. Symlinks are not followed. The creation
/// time falls back to the modification time on filesystems that do not
/// record it.
pub fn list_directories(base: &Path) -> Vec<CandidateEntry> {
    let read_dir = match fs::read_dir(base) {
        Ok(read_dir) => read_dir,
        Err(e) => {
            warn!(base = %base.display(), error = %e, "cannot read base directory");
            return Vec::new();
        }
    };

    let mut entries = Vec::new();
    for dir_entry in read_dir.flatten() {
        let is_dir = dir_entry.file_type().is_ok_and(|t| t.is_dir());
        if !is_dir {
            continue;
        }
        let file_name = dir_entry.file_name();
        let Some(name) = file_name.to_str() else {
            trace!(name = ?file_name, "skipping non UTF-8 directory name");
            continue;
        };
        let Ok(meta) = dir_entry.metadata() else {
            continue;
        };
        let modified_at = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let created_at = meta.created().unwrap_or(modified_at);
        entries.push(CandidateEntry::new(base, name, created_at, modified_at));
    }
    debug!(base = %base.display(), count = entries.len(), "loaded directory listing");
    entries
}

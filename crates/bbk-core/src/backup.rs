//! Backup collaborator for destructive maintenance
//!
//! Migration renames original files after converting them, so it refuses to
//! run without a fresh snapshot. The [`Backup`] trait is the seam: the
//! coordinator only requires that *some* collaborator produced a snapshot
//! path, and treats `None` as "no backup happened" regardless of why.

use crate::io::error::StoreError;
use std::fs;
use std::path::{Path, PathBuf};

/// Snapshot provider consulted before destructive operations.
pub trait Backup {
    /// Snapshot the data root, returning the snapshot's path.
    ///
    /// `Ok(None)` means the collaborator declined (nothing to back up,
    /// target unavailable); callers must treat that the same as an error
    /// when a backup is mandatory.
    fn perform_backup(&self, root: &Path, label: &str) -> Result<Option<PathBuf>, StoreError>;
}

/// Built-in backup: copies the data root's flat files into
/// `backups/<label>-<stamp>/` inside the root itself.
///
/// Only the flat data files (`.json`, `.csv`) are captured; transient
/// `.tmp`/`.lock` artifacts and previous backups are not part of the data
/// model and are skipped.
#[derive(Debug, Default)]
pub struct FolderBackup;

impl Backup for FolderBackup {
    fn perform_backup(&self, root: &Path, label: &str) -> Result<Option<PathBuf>, StoreError> {
        if !root.is_dir() {
            return Ok(None);
        }

        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S");
        let dest = root.join("backups").join(format!("{label}-{stamp}"));
        fs::create_dir_all(&dest).map_err(|e| StoreError::io(&dest, e))?;

        let entries = fs::read_dir(root).map_err(|e| StoreError::io(root, e))?;
        let mut copied = 0usize;
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(root, e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if !(ext.eq_ignore_ascii_case("json") || ext.eq_ignore_ascii_case("csv")) {
                continue;
            }
            if let Some(name) = path.file_name() {
                fs::copy(&path, dest.join(name)).map_err(|e| StoreError::io(&path, e))?;
                copied += 1;
            }
        }

        tracing::info!(dest = %dest.display(), copied, "data root snapshot complete");
        Ok(Some(dest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn copies_flat_data_files_only() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("contacts.json"), "[]").unwrap();
        fs::write(root.join("contacts.csv"), "Name,Email\n").unwrap();
        fs::write(root.join("contacts.json.lock"), "").unwrap();
        fs::write(root.join("contacts.json.123.tmp"), "{").unwrap();

        let dest = FolderBackup
            .perform_backup(root, "pre-migration")
            .unwrap()
            .unwrap();

        assert!(dest.join("contacts.json").exists());
        assert!(dest.join("contacts.csv").exists());
        assert!(!dest.join("contacts.json.lock").exists());
        assert!(!dest.join("contacts.json.123.tmp").exists());
    }

    #[test]
    fn missing_root_declines() {
        let temp_dir = TempDir::new().unwrap();
        let ghost = temp_dir.path().join("nope");
        let result = FolderBackup.perform_backup(&ghost, "pre-migration").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn snapshots_do_not_nest() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("servers.json"), "[]").unwrap();

        let first = FolderBackup
            .perform_backup(root, "pre-migration")
            .unwrap()
            .unwrap();
        let second = FolderBackup
            .perform_backup(root, "manual")
            .unwrap()
            .unwrap();

        // The second snapshot must not contain the first one's contents.
        assert!(second.join("servers.json").exists());
        assert!(!second.join("backups").exists());
        assert!(first.exists());
    }
}

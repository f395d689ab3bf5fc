//! Atomic document replacement via temp-file-then-rename
//!
//! A write lands in a uniquely-named temporary sibling first, then a rename
//! moves it onto the target. Same-directory, same-volume renames are atomic
//! at the filesystem level, so a reader at any instant sees either the old
//! complete document or the new one, never a torn write. The temp file must
//! be a sibling for exactly this reason: a system temp directory could sit
//! on another volume, where rename degrades to copy.
//!
//! On network-synced folders the rename itself can fail transiently while a
//! sync client or AV scanner briefly holds the target. The rename is retried
//! on a short backoff, and as a last resort the content is copied over the
//! target in place.

use crate::io::error::StoreError;
use crate::retry::{is_transient_io, RetryPolicy};
use rand::Rng;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// UTF-8 byte-order mark expected by spreadsheet tools on CSV files.
const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Atomically replace the contents of `path` with `content`.
///
/// `content` must already be fully serialized UTF-8 text. A BOM is ensured
/// on `.csv` targets (spreadsheet compatibility) and never added to JSON
/// documents.
///
/// # Errors
///
/// Returns [`StoreError::Io`] when the temp write or the final replacement
/// fails after retries. An orphaned temp file is cleaned up best-effort
/// before the error propagates.
pub fn write_atomic(path: &Path, content: &str) -> Result<(), StoreError> {
    let dir = path
        .parent()
        .ok_or_else(|| StoreError::InvalidPath {
            path: path.to_path_buf(),
        })?;
    fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;

    let tmp_path = temp_sibling(path);
    let bytes = with_bom_policy(path, content);

    let write_result = (|| {
        let mut tmp = fs::File::create(&tmp_path)?;
        tmp.write_all(&bytes)?;
        tmp.sync_all()
    })();
    if let Err(e) = write_result {
        // Handle is closed before cleanup; Windows refuses to delete open files.
        drop_temp(&tmp_path);
        return Err(StoreError::io(&tmp_path, e));
    }

    match rename_with_retry(&tmp_path, path) {
        Ok(()) => Ok(()),
        Err(rename_err) => match copy_fallback(&tmp_path, path, &bytes) {
            Ok(()) => Ok(()),
            Err(()) => {
                drop_temp(&tmp_path);
                Err(rename_err)
            }
        },
    }
}

/// Unique temp sibling: `<name>.<millis>-<suffix>.tmp` in the same
/// directory.
///
/// Uniqueness matters before the lock is engaged at a higher layer: two
/// writers racing on the same target must never share a temp file.
fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: u32 = rand::thread_rng().gen_range(0x1000..=0xFFFF);
    path.with_file_name(format!("{name}.{millis}-{suffix:04x}.tmp"))
}

/// Rename `tmp` onto `target`, absorbing the transient failure modes of
/// sync clients and AV scanners.
///
/// Windows reports a target briefly held by another process as
/// PermissionDenied; within this narrow window that class is retried even
/// though permission errors are permanent elsewhere.
fn rename_with_retry(tmp: &Path, target: &Path) -> Result<(), StoreError> {
    RetryPolicy::file_ops().run(
        |e: &StoreError| match e {
            StoreError::Io { source, .. } => {
                is_transient_io(source)
                    || source.kind() == std::io::ErrorKind::PermissionDenied
            }
            _ => false,
        },
        |attempt, e| {
            tracing::debug!(target = %target.display(), attempt, error = %e, "rename retry");
        },
        || fs::rename(tmp, target).map_err(|e| StoreError::io(target, e)),
    )
}

/// Last-resort replacement when rename keeps failing: copy the serialized
/// bytes over the target, then remove the temp.
///
/// A temp file that is already gone means another writer or a cleanup pass
/// raced ahead; that is benign, the copy still carries the content.
fn copy_fallback(tmp: &Path, target: &Path, bytes: &[u8]) -> Result<(), ()> {
    match fs::write(target, bytes) {
        Ok(()) => {
            match fs::remove_file(tmp) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::debug!(path = %tmp.display(), error = %e, "temp cleanup failed");
                }
            }
            tracing::warn!(target = %target.display(), "rename failed, fell back to in-place copy");
            Ok(())
        }
        Err(_) => Err(()),
    }
}

/// Best-effort temp removal; failure is logged, never escalated.
fn drop_temp(tmp: &Path) {
    if let Err(e) = fs::remove_file(tmp) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::debug!(path = %tmp.display(), error = %e, "orphan temp cleanup failed");
        }
    }
}

/// BOM on CSV targets only.
fn with_bom_policy(path: &Path, content: &str) -> Vec<u8> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    let raw = content.as_bytes();
    if is_csv && !raw.starts_with(BOM) {
        let mut out = Vec::with_capacity(BOM.len() + raw.len());
        out.extend_from_slice(BOM);
        out.extend_from_slice(raw);
        out
    } else if !is_csv && raw.starts_with(BOM) {
        raw[BOM.len()..].to_vec()
    } else {
        raw.to_vec()
    }
}

//! Cross-process advisory locking via sidecar files
//!
//! Every data file `<path>` is serialized by an advisory lock on a sidecar
//! `<path>.lock` rather than on the data file itself. The indirection
//! matters: the atomic writer renames over the data file, and on Windows a
//! rename onto a path that is also the lock's own open handle fails. The
//! sidecar never moves, so lock handle and rename target cannot collide.
//!
//! Sidecars are created on first use and left in place afterwards; an
//! orphaned `.lock` file is an implementation artifact, not data, and may be
//! deleted freely once no process holds it.
//!
//! # Staleness
//!
//! The OS releases an advisory lock when its holder dies, but on
//! network-synced folders a sidecar can stay visibly "held" past any useful
//! lifetime. A contended sidecar whose mtime is older than
//! [`LockOptions::stale_after`] is presumed abandoned: it is removed and
//! acquisition starts over. Holders refresh the sidecar's mtime at
//! acquisition so a healthy long queue of writers never looks stale.

use crate::io::error::StoreError;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Tuning for lock acquisition.
#[derive(Debug, Clone)]
pub struct LockOptions {
    /// Retry attempts while contended (attempt 0 is immediate).
    pub max_retries: u32,
    /// Age past which a contended sidecar is presumed abandoned.
    pub stale_after: Duration,
}

impl Default for LockOptions {
    fn default() -> Self {
        Self {
            max_retries: 5,
            stale_after: Duration::from_secs(60),
        }
    }
}

/// Held advisory lock on one logical resource.
///
/// Owned by the acquiring call stack; the lock is released on drop, so every
/// exit path (including panics and `?` returns) releases it. Within one
/// process a second acquisition of the same target blocks like any other
/// contender, because the second descriptor's `flock` conflicts with the
/// first; at most one live guard per target path can exist per process.
pub struct LockGuard {
    file: File,
    lock_path: PathBuf,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            tracing::debug!(path = %self.lock_path.display(), error = %e, "lock release failed");
        }
    }
}

/// Sidecar path for `path`: the full filename with `.lock` appended.
///
/// Appending (rather than replacing the extension) keeps `contacts.json`
/// and `contacts.csv` on distinct sidecars while both exist during
/// migration.
pub fn lock_path_for(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".lock");
    PathBuf::from(os)
}

/// Acquire the advisory lock for `path`, retrying with backoff while
/// contended.
///
/// The sidecar is created empty if absent; losing a creation race to
/// another process is fine, both end up locking the same inode. Backoff
/// follows the 50ms, 100ms, 200ms, 400ms, 800ms ladder.
///
/// # Errors
///
/// Returns [`StoreError::LockContended`] when the lock is still held after
/// all retries and the sidecar is not stale, or [`StoreError::Io`] for
/// real filesystem failures.
pub fn acquire(path: &Path, opts: &LockOptions) -> Result<LockGuard, StoreError> {
    let lock_path = lock_path_for(path);

    for attempt in 0..=opts.max_retries {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| StoreError::io(&lock_path, e))?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                // Refresh mtime so contenders can judge staleness against
                // the current hold, not a hold from last week.
                let mut f = &file;
                let _ = f.write_all(b".");
                let _ = f.flush();
                return Ok(LockGuard { file, lock_path });
            }
            Err(e) if is_contention(&e) => {
                if sidecar_is_stale(&lock_path, opts.stale_after) {
                    tracing::warn!(
                        path = %lock_path.display(),
                        "reclaiming stale lock sidecar from presumed-crashed holder"
                    );
                    let _ = std::fs::remove_file(&lock_path);
                    continue;
                }
                if attempt < opts.max_retries {
                    tracing::debug!(
                        path = %lock_path.display(),
                        attempt,
                        "lock contended, backing off"
                    );
                    let wait_ms = 50u64 * (1 << attempt);
                    std::thread::sleep(Duration::from_millis(wait_ms));
                }
            }
            Err(e) => return Err(StoreError::io(&lock_path, e)),
        }
    }

    Err(StoreError::LockContended {
        path: lock_path,
        retries: opts.max_retries,
    })
}

/// Run `f` while holding the lock for `path`.
///
/// Release is guaranteed regardless of whether `f` returns `Ok`, `Err`, or
/// unwinds: the guard drops on every exit path.
pub fn with_lock<T>(
    path: &Path,
    opts: &LockOptions,
    f: impl FnOnce() -> Result<T, StoreError>,
) -> Result<T, StoreError> {
    let _guard = acquire(path, opts)?;
    f()
}

/// Best-effort, non-blocking probe of the lock state for diagnostics.
///
/// Never waits and never leaves the lock held. A missing sidecar means
/// unlocked; probe failures report as unlocked rather than guessing.
pub fn is_locked(path: &Path) -> bool {
    let lock_path = lock_path_for(path);
    let Ok(file) = OpenOptions::new().read(true).write(true).open(&lock_path) else {
        return false;
    };
    match file.try_lock_exclusive() {
        Ok(()) => {
            let _ = file.unlock();
            false
        }
        Err(e) => is_contention(&e),
    }
}

fn is_contention(err: &std::io::Error) -> bool {
    err.kind() == std::io::ErrorKind::WouldBlock
        || err.raw_os_error() == Some(11) // EAGAIN
        || err.raw_os_error() == Some(33) // ERROR_LOCK_VIOLATION
}

fn sidecar_is_stale(lock_path: &Path, stale_after: Duration) -> bool {
    let Ok(meta) = std::fs::metadata(lock_path) else {
        return false;
    };
    let Ok(mtime) = meta.modified() else {
        return false;
    };
    SystemTime::now()
        .duration_since(mtime)
        .map(|age| age > stale_after)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;
    use tempfile::TempDir;

    fn quick_opts() -> LockOptions {
        LockOptions {
            max_retries: 3,
            stale_after: Duration::from_secs(60),
        }
    }

    #[test]
    fn acquire_creates_sidecar_and_releases_on_drop() {
        let temp_dir = TempDir::new().unwrap();
        let data = temp_dir.path().join("contacts.json");

        {
            let _guard = acquire(&data, &quick_opts()).unwrap();
            assert!(lock_path_for(&data).exists());
            assert!(is_locked(&data));
        }
        assert!(!is_locked(&data));

        // Reacquire immediately after drop.
        let _guard = acquire(&data, &quick_opts()).unwrap();
    }

    #[test]
    fn sidecar_appends_full_filename() {
        assert_eq!(
            lock_path_for(Path::new("/data/contacts.json")),
            PathBuf::from("/data/contacts.json.lock")
        );
        assert_eq!(
            lock_path_for(Path::new("/data/contacts.csv")),
            PathBuf::from("/data/contacts.csv.lock")
        );
    }

    #[test]
    fn contended_lock_times_out() {
        let temp_dir = TempDir::new().unwrap();
        let data = Arc::new(temp_dir.path().join("servers.json"));
        let barrier = Arc::new(Barrier::new(2));

        let holder_path = Arc::clone(&data);
        let holder_barrier = Arc::clone(&barrier);
        let holder = thread::spawn(move || {
            let _guard = acquire(&holder_path, &quick_opts()).unwrap();
            holder_barrier.wait();
            thread::sleep(Duration::from_secs(2));
        });

        barrier.wait();
        let opts = LockOptions {
            max_retries: 2,
            stale_after: Duration::from_secs(60),
        };
        let result = acquire(&data, &opts);
        assert!(matches!(result, Err(StoreError::LockContended { .. })));

        holder.join().unwrap();
    }

    #[test]
    fn waiter_succeeds_after_release() {
        let temp_dir = TempDir::new().unwrap();
        let data = Arc::new(temp_dir.path().join("oncall.json"));
        let barrier = Arc::new(Barrier::new(2));

        let holder_path = Arc::clone(&data);
        let holder_barrier = Arc::clone(&barrier);
        let holder = thread::spawn(move || {
            let _guard = acquire(&holder_path, &quick_opts()).unwrap();
            holder_barrier.wait();
            thread::sleep(Duration::from_millis(100));
        });

        barrier.wait();
        let waiter = acquire(&data, &LockOptions::default());
        assert!(waiter.is_ok());
        holder.join().unwrap();
    }

    #[test]
    fn with_lock_releases_on_error() {
        let temp_dir = TempDir::new().unwrap();
        let data = temp_dir.path().join("groups.json");

        let result: Result<(), StoreError> = with_lock(&data, &quick_opts(), || {
            Err(StoreError::InvalidPath {
                path: data.clone(),
            })
        });
        assert!(result.is_err());
        // Guard dropped despite the error; lock must be free again.
        assert!(!is_locked(&data));
    }

    #[test]
    fn is_locked_does_not_acquire() {
        let temp_dir = TempDir::new().unwrap();
        let data = temp_dir.path().join("notes.json");

        assert!(!is_locked(&data)); // no sidecar yet
        let _guard = acquire(&data, &quick_opts()).unwrap();
        assert!(is_locked(&data));
        // Probing twice must not have stolen the lock.
        assert!(is_locked(&data));
    }
}

//! Read-modify-write facade over locked, atomic document files
//!
//! [`DocumentStore`] composes the sidecar lock, the atomic writer and the
//! file-ops retry policy into the one mutation primitive the rest of the
//! application uses: read the whole document, transform it, replace it
//! wholesale. No in-memory copy survives between calls; every
//! read-modify-write is a full disk round trip, so there is no cache to
//! invalidate and no staleness window beyond the lock's hold time.
//!
//! Plain [`DocumentStore::read`] does not take the lock. It serves
//! staleness-tolerant reads (list views); anything that reads in order to
//! write must go through the `read_modify_write*` methods so the read and
//! the write happen under one lock hold.

use crate::io::atomic::write_atomic;
use crate::io::error::StoreError;
use crate::io::lock::{with_lock, LockOptions};
use crate::retry::RetryPolicy;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Handle to the flat-file document store.
///
/// Cheap to construct and stateless between calls; cloning is equivalent to
/// constructing a second handle with the same tuning.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    retry: RetryPolicy,
    lock_opts: LockOptions,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::file_ops(),
            lock_opts: LockOptions::default(),
        }
    }
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the lock tuning (staleness threshold, retry count).
    pub fn with_lock_options(mut self, opts: LockOptions) -> Self {
        self.lock_opts = opts;
        self
    }

    /// Override the write retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Read the raw bytes of a document without taking the lock.
    ///
    /// Returns `Ok(None)` when the file does not exist. Callers needing
    /// read-then-write consistency must use [`Self::read_modify_write`]
    /// instead.
    pub fn read(&self, path: &Path) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    /// Lock-free JSON read; an absent or corrupt document yields `default`.
    ///
    /// Corruption is logged at warn and recovered; availability wins for
    /// store-level reads. Call sites whose domain semantics require
    /// surfacing corruption use [`Self::read_json_strict`].
    pub fn read_json<T>(&self, path: &Path, default: T) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        match self.read(path)? {
            None => Ok(default),
            Some(bytes) => match serde_json::from_slice(strip_bom(&bytes)) {
                Ok(value) => Ok(value),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "corrupt document, substituting default"
                    );
                    Ok(default)
                }
            },
        }
    }

    /// Lock-free JSON read that surfaces parse failures.
    pub fn read_json_strict<T>(&self, path: &Path) -> Result<Option<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        match self.read(path)? {
            None => Ok(None),
            Some(bytes) => serde_json::from_slice(strip_bom(&bytes))
                .map(Some)
                .map_err(|e| StoreError::Json {
                    path: path.to_path_buf(),
                    source: e,
                }),
        }
    }

    /// Read-modify-write on raw text, all under one lock hold.
    ///
    /// An absent file is treated as containing `default_content`. The whole
    /// locked cycle is retried under the file-ops policy, so `modifier` may
    /// run more than once and must be free of external side effects; each
    /// attempt re-reads the current text.
    pub fn read_modify_write(
        &self,
        path: &Path,
        default_content: &str,
        mut modifier: impl FnMut(String) -> String,
    ) -> Result<(), StoreError> {
        self.retry.run(
            StoreError::is_transient,
            |attempt, e| log_retry(path, attempt, e),
            || {
                with_lock(path, &self.lock_opts, || {
                    let current = match fs::read(path) {
                        Ok(bytes) => String::from_utf8_lossy(strip_bom(&bytes)).into_owned(),
                        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                            default_content.to_string()
                        }
                        Err(e) => return Err(StoreError::io(path, e)),
                    };
                    let updated = modifier(current);
                    write_atomic(path, &updated)
                })
            },
        )
    }

    /// Read-modify-write on a JSON document, all under one lock hold.
    ///
    /// An absent file is treated as containing `default`; so is a corrupt
    /// one, logged at warn (see [`Self::read_json`] for the trade-off).
    /// `modifier` may run more than once under retry; each attempt starts
    /// from freshly read state.
    pub fn read_modify_write_json<T>(
        &self,
        path: &Path,
        default: T,
        mut modifier: impl FnMut(T) -> T,
    ) -> Result<(), StoreError>
    where
        T: Serialize + DeserializeOwned + Clone,
    {
        self.retry.run(
            StoreError::is_transient,
            |attempt, e| log_retry(path, attempt, e),
            || {
                with_lock(path, &self.lock_opts, || {
                    let current: T = match fs::read(path) {
                        Ok(bytes) => match serde_json::from_slice(strip_bom(&bytes)) {
                            Ok(value) => value,
                            Err(e) => {
                                tracing::warn!(
                                    path = %path.display(),
                                    error = %e,
                                    "corrupt document, substituting default"
                                );
                                default.clone()
                            }
                        },
                        Err(e) if e.kind() == std::io::ErrorKind::NotFound => default.clone(),
                        Err(e) => return Err(StoreError::io(path, e)),
                    };

                    let updated = modifier(current);
                    let text = serde_json::to_string_pretty(&updated).map_err(|e| {
                        StoreError::Serialize {
                            path: path.to_path_buf(),
                            source: e,
                        }
                    })?;
                    write_atomic(path, &text)
                })
            },
        )
    }
}

fn log_retry(path: &Path, attempt: u32, err: &StoreError) {
    match err {
        // Contention is expected under concurrency; keep it quiet.
        StoreError::LockContended { .. } => {
            tracing::debug!(path = %path.display(), attempt, "write retry after contention");
        }
        _ => {
            tracing::info!(path = %path.display(), attempt, error = %err, "write retry");
        }
    }
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(b"\xEF\xBB\xBF".as_slice()).unwrap_or(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Counter {
        counter: u64,
    }

    #[test]
    fn read_missing_file_returns_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = DocumentStore::new();
        let result = store.read(&temp_dir.path().join("absent.json")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn read_modify_write_creates_from_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.json");
        let store = DocumentStore::new();

        store
            .read_modify_write(&path, "{}", |text| {
                assert_eq!(text, "{}");
                r#"{"note":"hello"}"#.to_string()
            })
            .unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            r#"{"note":"hello"}"#
        );
    }

    #[test]
    fn read_modify_write_json_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("counter.json");
        let store = DocumentStore::new();

        for _ in 0..5 {
            store
                .read_modify_write_json(&path, Counter { counter: 0 }, |mut c| {
                    c.counter += 1;
                    c
                })
                .unwrap();
        }

        let value: Counter = store.read_json_strict(&path).unwrap().unwrap();
        assert_eq!(value.counter, 5);
    }

    #[test]
    fn corrupt_document_substitutes_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("contacts.json");
        fs::write(&path, "{not valid json").unwrap();

        let store = DocumentStore::new();
        let value: Vec<String> = store.read_json(&path, Vec::new()).unwrap();
        assert!(value.is_empty());

        // The strict variant surfaces the same condition.
        let strict: Result<Option<Vec<String>>, _> = store.read_json_strict(&path);
        assert!(matches!(strict, Err(StoreError::Json { .. })));
    }

    #[test]
    fn corrupt_document_recovered_on_write() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("counter.json");
        fs::write(&path, "####").unwrap();

        let store = DocumentStore::new();
        store
            .read_modify_write_json(&path, Counter { counter: 0 }, |mut c| {
                c.counter += 1;
                c
            })
            .unwrap();

        let value: Counter = store.read_json_strict(&path).unwrap().unwrap();
        assert_eq!(value.counter, 1);
    }

    #[test]
    fn bom_on_existing_document_is_tolerated() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("servers.json");
        fs::write(&path, b"\xEF\xBB\xBF[\"srv1\"]").unwrap();

        let store = DocumentStore::new();
        let value: Vec<String> = store.read_json(&path, Vec::new()).unwrap();
        assert_eq!(value, vec!["srv1".to_string()]);
    }

    #[test]
    fn concurrent_increments_lose_no_updates() {
        let temp_dir = TempDir::new().unwrap();
        let path = Arc::new(temp_dir.path().join("counter.json"));

        let threads: Vec<_> = (0..8)
            .map(|_| {
                let path = Arc::clone(&path);
                thread::spawn(move || {
                    let store = DocumentStore::new();
                    for _ in 0..25 {
                        store
                            .read_modify_write_json(&path, Counter { counter: 0 }, |mut c| {
                                c.counter += 1;
                                c
                            })
                            .unwrap();
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        let store = DocumentStore::new();
        let value: Counter = store.read_json_strict(&path).unwrap().unwrap();
        assert_eq!(value.counter, 200, "no lost updates, no double counting");
    }

    #[test]
    fn preserves_unknown_json_structure() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.json");
        fs::write(&path, r#"{"alpha":"1","zulu":"2"}"#).unwrap();

        let store = DocumentStore::new();
        store
            .read_modify_write_json(&path, BTreeMap::<String, String>::new(), |mut notes| {
                notes.insert("mike".to_string(), "3".to_string());
                notes
            })
            .unwrap();

        let notes: BTreeMap<String, String> = store.read_json_strict(&path).unwrap().unwrap();
        assert_eq!(notes.len(), 3);
        assert_eq!(notes.get("alpha").map(String::as_str), Some("1"));
    }
}

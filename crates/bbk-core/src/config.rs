//! Optional store tuning from `bridgebook.toml`
//!
//! A data root may carry a `bridgebook.toml` next to its documents to tune
//! lock staleness and retry bounds for that share; network folders with
//! slow sync clients want longer thresholds than a local disk. Absent file
//! or absent keys fall back to the built-in defaults.
//!
//! ```toml
//! [lock]
//! max_retries = 8
//! stale_after_secs = 120
//!
//! [retry]
//! max_attempts = 5
//! initial_delay_ms = 50
//! max_delay_ms = 800
//! ```

use crate::io::lock::LockOptions;
use crate::io::store::DocumentStore;
use crate::retry::RetryPolicy;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StoreConfig {
    #[serde(default)]
    pub lock: LockSection,

    #[serde(default)]
    pub retry: RetrySection,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LockSection {
    pub max_retries: Option<u32>,
    pub stale_after_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RetrySection {
    pub max_attempts: Option<u32>,
    pub initial_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
}

impl StoreConfig {
    /// Load `bridgebook.toml` from `root`, tolerating its absence.
    ///
    /// A malformed file is logged and ignored rather than blocking startup;
    /// the defaults are always serviceable.
    pub fn load(root: &Path) -> Self {
        let path = root.join("bridgebook.toml");
        let Ok(text) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        match toml::from_str(&text) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config");
                Self::default()
            }
        }
    }

    /// Lock tuning with defaults filled in.
    pub fn lock_options(&self) -> LockOptions {
        let defaults = LockOptions::default();
        LockOptions {
            max_retries: self.lock.max_retries.unwrap_or(defaults.max_retries),
            stale_after: self
                .lock
                .stale_after_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.stale_after),
        }
    }

    /// Retry tuning with defaults filled in.
    pub fn retry_policy(&self) -> RetryPolicy {
        let defaults = RetryPolicy::file_ops();
        RetryPolicy {
            max_attempts: self.retry.max_attempts.unwrap_or(defaults.max_attempts),
            initial_delay: self
                .retry
                .initial_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.initial_delay),
            max_delay: self
                .retry
                .max_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.max_delay),
            ..defaults
        }
    }

    /// A [`DocumentStore`] configured per this file.
    pub fn document_store(&self) -> DocumentStore {
        DocumentStore::new()
            .with_lock_options(self.lock_options())
            .with_retry(self.retry_policy())
    }
}

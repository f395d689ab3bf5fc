//! Data root resolution for bridgebook
//!
//! All documents live flat in one data root directory, typically a folder
//! synced by OneDrive or similar. Resolution precedence:
//!
//! 1. `BBK_DATA_DIR` environment variable (set in tests for isolation, or
//!    by deployments pointing at a shared folder)
//! 2. `dirs::data_dir()` / `bridgebook`
//!
//! # Layout
//!
//! ```text
//! <data root>/
//!   contacts.json       servers.json      oncall.json
//!   bridgeGroups.json   notes.json        bridgeHistory.json
//!   backups/            - pre-migration snapshots
//!   *.csv               - legacy inputs, renamed *.migrated after migration
//!   *.tmp, *.lock       - transient write/lock artifacts, never data
//! ```

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Canonical file names under the data root.
pub mod files {
    pub const CONTACTS: &str = "contacts.json";
    pub const SERVERS: &str = "servers.json";
    pub const ONCALL: &str = "oncall.json";
    pub const BRIDGE_GROUPS: &str = "bridgeGroups.json";
    pub const NOTES: &str = "notes.json";
    pub const BRIDGE_HISTORY: &str = "bridgeHistory.json";

    pub const LEGACY_CONTACTS: &str = "contacts.csv";
    pub const LEGACY_SERVERS: &str = "servers.csv";
    pub const LEGACY_ONCALL: &str = "oncall.csv";
    pub const LEGACY_GROUPS: &str = "groups.csv";
}

/// Resolve the data root directory.
///
/// # Errors
///
/// Fails only when `BBK_DATA_DIR` is unset and the platform data directory
/// cannot be determined.
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("BBK_DATA_DIR") {
        let trimmed = dir.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }

    dirs::data_dir()
        .map(|d| d.join("bridgebook"))
        .context("Could not determine data directory")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    #[test]
    #[serial]
    fn bbk_data_dir_takes_precedence() {
        let original = env::var("BBK_DATA_DIR").ok();
        unsafe { env::set_var("BBK_DATA_DIR", "/srv/shared/bridgebook") };

        let dir = get_data_dir().unwrap();
        assert_eq!(dir, PathBuf::from("/srv/shared/bridgebook"));

        unsafe {
            match original {
                Some(v) => env::set_var("BBK_DATA_DIR", v),
                None => env::remove_var("BBK_DATA_DIR"),
            }
        }
    }

    #[test]
    #[serial]
    fn empty_env_var_falls_back_to_platform_default() {
        let original = env::var("BBK_DATA_DIR").ok();
        unsafe { env::set_var("BBK_DATA_DIR", "  ") };

        let dir = get_data_dir().unwrap();
        assert_eq!(dir, dirs::data_dir().unwrap().join("bridgebook"));

        unsafe {
            match original {
                Some(v) => env::set_var("BBK_DATA_DIR", v),
                None => env::remove_var("BBK_DATA_DIR"),
            }
        }
    }
}

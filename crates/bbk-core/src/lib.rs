//! bridgebook-core: file-backed concurrent document store
//!
//! Storage layer for the bridgebook directory/runbook manager. Contacts,
//! servers, on-call rosters and bridge groups live as flat JSON documents
//! in one data root, often on a network-synced folder shared by several
//! app instances at once. This crate owns everything that makes that safe:
//! cross-process locking, atomic document replacement, transient-error
//! retry, and the one-time migration from the legacy CSV layout.
//!
//! Deliberately absent: any in-memory cache of documents. Every
//! read-modify-write is a full disk round trip under the lock, which keeps
//! the consistency story to exactly one mechanism.

pub mod backup;
pub mod config;
pub mod home;
pub mod io;
pub mod logging;
pub mod migrate;
pub mod ops;
pub mod retry;
pub mod schema;

pub use backup::{Backup, FolderBackup};
pub use io::{DocumentStore, StoreError};
pub use migrate::{MigrationCoordinator, MigrationResult};
pub use retry::RetryPolicy;
pub use schema::{BridgeEvent, BridgeGroup, Contact, OncallEntry, Server};

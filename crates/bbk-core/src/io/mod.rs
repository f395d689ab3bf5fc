//! Concurrent-safe file I/O for the bridgebook data root
//!
//! Multiple app instances (and external editors or sync clients) share the
//! same flat files, so every mutation follows one protocol:
//!
//! - **Sidecar locking**: an advisory lock on `<path>.lock` serializes
//!   read-modify-write cycles across OS processes
//! - **Atomic replacement**: content lands in a temp sibling and is renamed
//!   onto the target, so readers never see a torn document
//! - **Bounded retry**: transient failures from sync clients and AV
//!   scanners are absorbed by the file-ops retry policy
//!
//! # Example
//!
//! ```rust,no_run
//! use bridgebook_core::io::store::DocumentStore;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), bridgebook_core::io::error::StoreError> {
//! let store = DocumentStore::new();
//! store.read_modify_write_json(
//!     Path::new("/data/bridgebook/contacts.json"),
//!     Vec::new(),
//!     |mut contacts: Vec<String>| {
//!         contacts.push("alice@example.com".to_string());
//!         contacts
//!     },
//! )?;
//! # Ok(())
//! # }
//! ```

pub mod atomic;
pub mod error;
pub mod lock;
pub mod store;

// Re-export primary API
pub use error::StoreError;
pub use store::DocumentStore;

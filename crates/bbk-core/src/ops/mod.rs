//! CRUD operations over the document store
//!
//! These are the functions the IPC layer calls on behalf of the UI. Every
//! mutation goes through
//! [`read_modify_write_json`](crate::io::store::DocumentStore::read_modify_write_json)
//! so the read and the write share one lock hold; every function catches
//! [`StoreError`](crate::io::error::StoreError) at this boundary and
//! reports plain success/failure plus a logged error. No error travels
//! toward the UI layer.
//!
//! List-style reads go through the lock-free
//! [`read_json`](crate::io::store::DocumentStore::read_json) path: they
//! tolerate staleness and never write.

mod contacts;
mod groups;
mod notes;
mod oncall;
mod servers;

pub use contacts::{add_contact, list_contacts, remove_contact};
pub use groups::{
    add_contact_to_group, list_groups, record_bridge, remove_contact_from_group, remove_group,
};
pub use notes::{list_notes, set_note};
pub use oncall::{list_roster, replace_roster};
pub use servers::{add_server, list_servers, remove_server};

use std::path::Path;

fn report(op: &str, path: &Path, result: Result<(), crate::io::error::StoreError>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(op, path = %path.display(), error = %e, "operation failed");
            false
        }
    }
}

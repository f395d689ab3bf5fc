//! Contact CRUD

use super::report;
use crate::home::files;
use crate::io::store::DocumentStore;
use crate::schema::Contact;
use std::path::Path;

/// Add or update a contact, keyed by email.
///
/// An existing record with the same email (case-insensitive) is replaced
/// wholesale; its unknown fields travel with the replacement only if the
/// caller preserved them.
pub fn add_contact(store: &DocumentStore, root: &Path, contact: Contact) -> bool {
    let path = root.join(files::CONTACTS);
    let result = store.read_modify_write_json(&path, Vec::new(), |mut contacts: Vec<Contact>| {
        match contacts.iter_mut().find(|c| c.same_person(&contact.email)) {
            Some(existing) => *existing = contact.clone(),
            None => contacts.push(contact.clone()),
        }
        contacts
    });
    report("add_contact", &path, result)
}

/// Remove a contact by email. Succeeds even when no record matched.
pub fn remove_contact(store: &DocumentStore, root: &Path, email: &str) -> bool {
    let path = root.join(files::CONTACTS);
    let result = store.read_modify_write_json(&path, Vec::new(), |mut contacts: Vec<Contact>| {
        contacts.retain(|c| !c.same_person(email));
        contacts
    });
    report("remove_contact", &path, result)
}

/// Staleness-tolerant listing for views; empty on absent or corrupt file.
pub fn list_contacts(store: &DocumentStore, root: &Path) -> Vec<Contact> {
    store
        .read_json(&root.join(files::CONTACTS), Vec::new())
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "contact listing failed");
            Vec::new()
        })
}

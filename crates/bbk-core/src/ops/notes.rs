//! Free-form notes keyed by subject
//!
//! `notes.json` is the one object-shaped document in the data root: a map
//! of subject to note text.

use super::report;
use crate::home::files;
use crate::io::store::DocumentStore;
use std::collections::BTreeMap;
use std::path::Path;

/// Set or clear one note. An empty `text` removes the entry.
pub fn set_note(store: &DocumentStore, root: &Path, subject: &str, text: &str) -> bool {
    let path = root.join(files::NOTES);
    let result = store.read_modify_write_json(
        &path,
        BTreeMap::new(),
        |mut notes: BTreeMap<String, String>| {
            if text.is_empty() {
                notes.remove(subject);
            } else {
                notes.insert(subject.to_string(), text.to_string());
            }
            notes
        },
    );
    report("set_note", &path, result)
}

/// Staleness-tolerant listing for views.
pub fn list_notes(store: &DocumentStore, root: &Path) -> BTreeMap<String, String> {
    store
        .read_json(&root.join(files::NOTES), BTreeMap::new())
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "notes listing failed");
            BTreeMap::new()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn set_and_clear() {
        let temp_dir = TempDir::new().unwrap();
        let store = DocumentStore::new();
        let root = temp_dir.path();

        assert!(set_note(&store, root, "SRV-001", "patched 2026-08"));
        assert_eq!(
            list_notes(&store, root).get("SRV-001").map(String::as_str),
            Some("patched 2026-08")
        );

        assert!(set_note(&store, root, "SRV-001", ""));
        assert!(list_notes(&store, root).is_empty());
    }
}

//! On-call roster operations

use super::report;
use crate::home::files;
use crate::io::store::DocumentStore;
use crate::schema::OncallEntry;
use std::path::Path;

/// Replace the whole roster wholesale.
///
/// The roster is edited as a unit in the UI, so the write model matches:
/// one document swap rather than row-level patching.
pub fn replace_roster(store: &DocumentStore, root: &Path, entries: Vec<OncallEntry>) -> bool {
    let path = root.join(files::ONCALL);
    let result = store.read_modify_write_json(&path, Vec::new(), |_: Vec<OncallEntry>| {
        entries.clone()
    });
    report("replace_roster", &path, result)
}

/// Staleness-tolerant listing for views.
pub fn list_roster(store: &DocumentStore, root: &Path) -> Vec<OncallEntry> {
    store
        .read_json(&root.join(files::ONCALL), Vec::new())
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "roster listing failed");
            Vec::new()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn replace_overwrites_previous_roster() {
        let temp_dir = TempDir::new().unwrap();
        let store = DocumentStore::new();

        let first = vec![OncallEntry {
            team: "Payments".to_string(),
            role: "Primary".to_string(),
            name: "Alice".to_string(),
            ..Default::default()
        }];
        assert!(replace_roster(&store, temp_dir.path(), first));

        let second = vec![
            OncallEntry {
                team: "Payments".to_string(),
                role: "Primary".to_string(),
                name: "Bob".to_string(),
                ..Default::default()
            },
            OncallEntry {
                team: "Payments".to_string(),
                role: "Backup".to_string(),
                name: "Carol".to_string(),
                ..Default::default()
            },
        ];
        assert!(replace_roster(&store, temp_dir.path(), second));

        let roster = list_roster(&store, temp_dir.path());
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].name, "Bob");
    }
}

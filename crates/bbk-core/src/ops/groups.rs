//! Bridge group membership and bridge history

use super::report;
use crate::home::files;
use crate::io::store::DocumentStore;
use crate::schema::{BridgeEvent, BridgeGroup};
use std::path::Path;

/// Add `email` to `group`, creating the group on first use.
pub fn add_contact_to_group(
    store: &DocumentStore,
    root: &Path,
    group: &str,
    email: &str,
) -> bool {
    let path = root.join(files::BRIDGE_GROUPS);
    let result = store.read_modify_write_json(&path, Vec::new(), |mut groups: Vec<BridgeGroup>| {
        match groups.iter_mut().find(|g| g.name == group) {
            Some(existing) => {
                existing.add_member(email);
            }
            None => {
                let mut created = BridgeGroup {
                    name: group.to_string(),
                    ..Default::default()
                };
                created.add_member(email);
                groups.push(created);
            }
        }
        groups
    });
    report("add_contact_to_group", &path, result)
}

/// Remove `email` from `group`. Succeeds when the group or member is
/// already gone.
pub fn remove_contact_from_group(
    store: &DocumentStore,
    root: &Path,
    group: &str,
    email: &str,
) -> bool {
    let path = root.join(files::BRIDGE_GROUPS);
    let result = store.read_modify_write_json(&path, Vec::new(), |mut groups: Vec<BridgeGroup>| {
        if let Some(existing) = groups.iter_mut().find(|g| g.name == group) {
            existing.remove_member(email);
        }
        groups
    });
    report("remove_contact_from_group", &path, result)
}

/// Delete a whole group.
pub fn remove_group(store: &DocumentStore, root: &Path, group: &str) -> bool {
    let path = root.join(files::BRIDGE_GROUPS);
    let result = store.read_modify_write_json(&path, Vec::new(), |mut groups: Vec<BridgeGroup>| {
        groups.retain(|g| g.name != group);
        groups
    });
    report("remove_group", &path, result)
}

/// Staleness-tolerant listing for views.
pub fn list_groups(store: &DocumentStore, root: &Path) -> Vec<BridgeGroup> {
    store
        .read_json(&root.join(files::BRIDGE_GROUPS), Vec::new())
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "group listing failed");
            Vec::new()
        })
}

/// Append a started bridge to the history, snapshotting the group's
/// current membership as participants.
pub fn record_bridge(store: &DocumentStore, root: &Path, group: &str) -> bool {
    let participants = list_groups(store, root)
        .into_iter()
        .find(|g| g.name == group)
        .map(|g| g.members)
        .unwrap_or_default();

    let event = BridgeEvent {
        group: group.to_string(),
        started_at: chrono::Utc::now().to_rfc3339(),
        participants,
        extra: Default::default(),
    };

    let path = root.join(files::BRIDGE_HISTORY);
    let result = store.read_modify_write_json(&path, Vec::new(), |mut events: Vec<BridgeEvent>| {
        events.push(event.clone());
        events
    });
    report("record_bridge", &path, result)
}

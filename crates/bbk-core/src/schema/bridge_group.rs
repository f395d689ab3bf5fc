//! Bridge group and bridge history schemas

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A named distribution group of member emails, stored in
/// `bridgeGroups.json` as an array.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BridgeGroup {
    pub name: String,

    #[serde(default)]
    pub members: Vec<String>,

    /// Unknown fields for forward compatibility
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl BridgeGroup {
    /// Add a member unless already present (case-insensitive).
    ///
    /// Returns true when the membership changed.
    pub fn add_member(&mut self, email: &str) -> bool {
        if self
            .members
            .iter()
            .any(|m| m.eq_ignore_ascii_case(email))
        {
            return false;
        }
        self.members.push(email.to_string());
        true
    }

    /// Remove a member (case-insensitive). Returns true when removed.
    pub fn remove_member(&mut self, email: &str) -> bool {
        let before = self.members.len();
        self.members.retain(|m| !m.eq_ignore_ascii_case(email));
        self.members.len() != before
    }
}

/// One started bridge, appended to `bridgeHistory.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeEvent {
    /// Group the bridge was assembled from
    pub group: String,

    /// ISO 8601 UTC timestamp
    pub started_at: String,

    /// Member emails included on the bridge
    #[serde(default)]
    pub participants: Vec<String>,

    /// Unknown fields for forward compatibility
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

//! On-call roster schema

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One row of the on-call roster in `oncall.json`.
///
/// The modern shape is team/role/name/contact. Legacy rosters kept a
/// `Primary`/`Backup` pair per team; migration maps those onto two entries
/// with `role` set to `"Primary"` or `"Backup"`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OncallEntry {
    pub team: String,

    pub role: String,

    pub name: String,

    #[serde(default)]
    pub contact: String,

    /// Unknown fields for forward compatibility
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let entry = OncallEntry {
            team: "Payments".to_string(),
            role: "Primary".to_string(),
            name: "Alice Smith".to_string(),
            contact: "alice@example.com".to_string(),
            extra: HashMap::new(),
        };
        let out = serde_json::to_string(&entry).unwrap();
        let back: OncallEntry = serde_json::from_str(&out).unwrap();
        assert_eq!(back.team, "Payments");
        assert_eq!(back.role, "Primary");
    }
}

//! Server record schema

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One server in the runbook inventory.
///
/// Stored in `servers.json`. Field names on disk are camelCase for
/// compatibility with documents written by earlier releases.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    pub name: String,

    #[serde(default)]
    pub business_area: String,

    /// Line of business
    #[serde(default)]
    pub lob: String,

    #[serde(default)]
    pub comment: String,

    /// Owner contact email
    #[serde(default)]
    pub owner: String,

    /// Support contact email
    #[serde(default)]
    pub contact: String,

    #[serde(default)]
    pub os_type: String,

    #[serde(default)]
    pub os: String,

    /// Unknown fields for forward compatibility
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_on_disk() {
        let json = r#"{
            "name": "SRV-001",
            "businessArea": "Finance",
            "lob": "Banking",
            "comment": "Critical Server",
            "owner": "john@example.com",
            "contact": "support@example.com",
            "osType": "Windows",
            "os": "Windows 2019"
        }"#;

        let server: Server = serde_json::from_str(json).unwrap();
        assert_eq!(server.business_area, "Finance");
        assert_eq!(server.os_type, "Windows");

        let out = serde_json::to_string(&server).unwrap();
        assert!(out.contains("businessArea"));
        assert!(out.contains("osType"));
        assert!(!out.contains("business_area"));
    }

    #[test]
    fn sparse_record_parses() {
        let server: Server = serde_json::from_str(r#"{"name":"DB-02"}"#).unwrap();
        assert_eq!(server.name, "DB-02");
        assert!(server.owner.is_empty());
    }
}

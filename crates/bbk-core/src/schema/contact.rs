//! Contact record schema

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One person in the directory.
///
/// Stored in `contacts.json` as an array of Contact objects. Email is the
/// de-facto identity used by group membership and dedup.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Contact {
    pub name: String,

    pub email: String,

    #[serde(default)]
    pub phone: String,

    #[serde(default)]
    pub title: String,

    /// Unknown fields for forward compatibility
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Contact {
    /// Case-insensitive identity comparison on email.
    pub fn same_person(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_preserves_unknown_fields() {
        let json = r#"{
            "name": "Alice Smith",
            "email": "alice@example.com",
            "phone": "123",
            "title": "Engineer",
            "deskLocation": "B2-14",
            "tags": ["oncall", "prod"]
        }"#;

        let contact: Contact = serde_json::from_str(json).unwrap();
        assert_eq!(contact.name, "Alice Smith");
        assert_eq!(contact.extra.len(), 2);

        let serialized = serde_json::to_string(&contact).unwrap();
        let reparsed: Contact = serde_json::from_str(&serialized).unwrap();
        assert!(reparsed.extra.contains_key("deskLocation"));
        assert!(reparsed.extra.contains_key("tags"));
    }

    #[test]
    fn missing_optional_fields_default_empty() {
        let contact: Contact =
            serde_json::from_str(r#"{"name":"Bob","email":"bob@example.com"}"#).unwrap();
        assert_eq!(contact.phone, "");
        assert_eq!(contact.title, "");
    }

    #[test]
    fn identity_is_case_insensitive() {
        let contact: Contact =
            serde_json::from_str(r#"{"name":"Bob","email":"Bob@Example.com"}"#).unwrap();
        assert!(contact.same_person("bob@example.com"));
        assert!(!contact.same_person("alice@example.com"));
    }
}

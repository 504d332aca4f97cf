//! Identifiers on both sides of an import
//!
//! - [`LocalId`]: scoped to one export, links entities before anything exists remotely.
//!   Exports carry these as strings or numbers; both compare as strings.
//! - [`RemoteId`]: an identifier handed out by Vikunja, or a placeholder planned
//!   during a dry run.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Identifier of an entity inside one export
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawLocalId", into = "String")]
pub struct LocalId(String);

impl LocalId {
    /// Creates a local ID from any string-like value
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LocalId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<LocalId> for String {
    fn from(id: LocalId) -> Self {
        id.0
    }
}

/// Accepted wire shapes for a local ID
#[derive(Deserialize)]
#[serde(untagged)]
enum RawLocalId {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl From<RawLocalId> for LocalId {
    fn from(raw: RawLocalId) -> Self {
        match raw {
            RawLocalId::Text(s) => Self(s),
            RawLocalId::Integer(n) => Self(n.to_string()),
            RawLocalId::Float(f) => Self(f.to_string()),
        }
    }
}

/// Identifier of an entity on the Vikunja side
///
/// `Planned` IDs only exist during a dry run: they let dependent steps be
/// logged against the entity that would have been created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteId {
    /// Assigned by the server
    Assigned(i64),

    /// Placeholder for an entity a dry run would have created
    Planned(u32),
}

impl RemoteId {
    /// Returns the server-assigned value, if any
    pub fn assigned(&self) -> Option<i64> {
        match self {
            RemoteId::Assigned(id) => Some(*id),
            RemoteId::Planned(_) => None,
        }
    }

    /// Returns true for dry-run placeholders
    pub fn is_planned(&self) -> bool {
        matches!(self, RemoteId::Planned(_))
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteId::Assigned(id) => write!(f, "{}", id),
            RemoteId::Planned(n) => write!(f, "planned-{}", n),
        }
    }
}

impl Serialize for RemoteId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            RemoteId::Assigned(id) => serializer.serialize_i64(*id),
            RemoteId::Planned(_) => serializer.collect_str(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_id_accepts_strings_and_numbers() {
        let ids: Vec<LocalId> = serde_json::from_str(r#"["abc", 42, 7.5]"#).unwrap();
        assert_eq!(ids[0].as_str(), "abc");
        assert_eq!(ids[1].as_str(), "42");
        assert_eq!(ids[2].as_str(), "7.5");
    }

    #[test]
    fn numeric_and_string_ids_compare_equal() {
        let from_number: LocalId = serde_json::from_str("42").unwrap();
        let from_string: LocalId = serde_json::from_str(r#""42""#).unwrap();
        assert_eq!(from_number, from_string);
    }

    #[test]
    fn local_id_serializes_as_string() {
        let json = serde_json::to_string(&LocalId::new("label:one")).unwrap();
        assert_eq!(json, r#""label:one""#);
    }

    #[test]
    fn remote_id_display() {
        assert_eq!(RemoteId::Assigned(12).to_string(), "12");
        assert_eq!(RemoteId::Planned(3).to_string(), "planned-3");
    }

    #[test]
    fn remote_id_serialization() {
        assert_eq!(serde_json::to_value(RemoteId::Assigned(9)).unwrap(), serde_json::json!(9));
        assert_eq!(
            serde_json::to_value(RemoteId::Planned(1)).unwrap(),
            serde_json::json!("planned-1")
        );
    }

    #[test]
    fn planned_ids_have_no_assigned_value() {
        assert_eq!(RemoteId::Planned(1).assigned(), None);
        assert_eq!(RemoteId::Assigned(5).assigned(), Some(5));
        assert!(RemoteId::Planned(1).is_planned());
    }
}

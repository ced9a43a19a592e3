//! Subject identity and the capability of holding permissions

use crate::entity::Role;
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Subject kind under which roles appear when they are granted permissions
pub const ROLE_KIND: &str = "role";

/// Identity of an entity that can be granted permissions and roles
///
/// A subject is identified by its kind ("user", "role", "service", ...) and
/// an id unique within that kind. The rendered `kind:id` form is the key
/// under which the subject appears in the derived permission graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectRef {
    /// Subject kind (user, service account, role, ...)
    #[serde(rename = "type")]
    pub kind: String,

    /// Identifier unique within the kind
    pub id: String,
}

impl SubjectRef {
    /// Create a subject reference from a kind and an id
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Create a user subject reference
    pub fn user(id: impl Into<String>) -> Self {
        Self::new("user", id)
    }

    /// Create a role subject reference
    pub fn role(id: impl Into<String>) -> Self {
        Self::new(ROLE_KIND, id)
    }

    /// Parse a `kind:id` string into a subject reference
    ///
    /// The id may itself contain colons; only the first separates the kind.
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.split_once(':') {
            Some((kind, id)) if !kind.is_empty() && !id.is_empty() => Ok(Self::new(kind, id)),
            _ => Err(CoreError::invalid_subject(format!(
                "expected kind:id, got {raw:?}"
            ))),
        }
    }

    /// Check that the reference produces an unambiguous graph key
    pub fn validated(self) -> Result<Self> {
        if self.kind.is_empty() {
            return Err(CoreError::invalid_subject("empty kind"));
        }
        if self.kind.contains(':') {
            return Err(CoreError::invalid_subject(format!(
                "kind {:?} must not contain ':'",
                self.kind
            )));
        }
        if self.id.is_empty() {
            return Err(CoreError::invalid_subject("empty id"));
        }
        Ok(self)
    }

    /// Whether this subject is a role
    pub fn is_role(&self) -> bool {
        self.kind == ROLE_KIND
    }
}

impl fmt::Display for SubjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Capability of holding permissions and roles
///
/// Implemented by [`SubjectRef`] itself and by [`Role`] (a role can be
/// granted permissions like any other subject). Application user types
/// implement this to become grantees.
pub trait HoldsPermissions {
    /// The subject identity under which grants are recorded
    fn subject_ref(&self) -> SubjectRef;
}

impl HoldsPermissions for SubjectRef {
    fn subject_ref(&self) -> SubjectRef {
        self.clone()
    }
}

impl HoldsPermissions for Role {
    fn subject_ref(&self) -> SubjectRef {
        SubjectRef::role(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_renders_kind_and_id() {
        let subject = SubjectRef::user("alice");
        assert_eq!(subject.to_string(), "user:alice");
    }

    #[test]
    fn test_parse_round_trip() {
        let subject = SubjectRef::parse("service:billing").unwrap();
        assert_eq!(subject.kind, "service");
        assert_eq!(subject.id, "billing");
    }

    #[test]
    fn test_parse_keeps_colons_in_id() {
        let subject = SubjectRef::parse("user:tenant-1:alice").unwrap();
        assert_eq!(subject.kind, "user");
        assert_eq!(subject.id, "tenant-1:alice");
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        assert!(SubjectRef::parse("no-separator").is_err());
        assert!(SubjectRef::parse(":id-only").is_err());
        assert!(SubjectRef::parse("kind-only:").is_err());
    }

    #[test]
    fn test_validated_rejects_empty_parts() {
        assert!(SubjectRef::new("", "alice").validated().is_err());
        assert!(SubjectRef::new("user", "").validated().is_err());
        assert!(SubjectRef::new("us:er", "alice").validated().is_err());
        assert!(SubjectRef::user("alice").validated().is_ok());
    }

    #[test]
    fn test_role_implements_holds_permissions() {
        let role = Role::new("editor");
        let subject = role.subject_ref();
        assert!(subject.is_role());
        assert_eq!(subject.id, role.id);
    }

    #[test]
    fn test_serde_renames_kind_to_type() {
        let subject = SubjectRef::user("alice");
        let json = serde_json::to_value(&subject).unwrap();
        assert_eq!(json["type"], "user");
        assert_eq!(json["id"], "alice");

        let back: SubjectRef = serde_json::from_value(json).unwrap();
        assert_eq!(back, subject);
    }
}

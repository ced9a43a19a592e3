//! Permission and role records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique permission identifier
pub type PermissionId = String;

/// Unique role identifier
pub type RoleId = String;

/// A named capability that can be granted to subjects directly or through roles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Stable identifier, assigned at creation
    pub id: PermissionId,

    /// Unique name within the permission collection (e.g., "articles.publish")
    pub name: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Permission {
    /// Create a new permission with a generated identifier
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

/// A named bundle of permissions that can be assigned to subjects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Stable identifier, assigned at creation
    pub id: RoleId,

    /// Unique name within the role collection (e.g., "editor")
    pub name: String,

    /// Human-readable display name
    pub label: String,

    /// Whether the role is attached to newly registered subjects
    #[serde(default)]
    pub is_default: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Role {
    /// Create a new role with a generated identifier, labeled after its name
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: Uuid::new_v4().to_string(),
            label: name.clone(),
            name,
            is_default: false,
            created_at: Utc::now(),
        }
    }

    /// Set the display label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Mark the role as assigned-by-default
    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_creation() {
        let permission = Permission::new("articles.edit");
        assert_eq!(permission.name, "articles.edit");
        assert!(!permission.id.is_empty());
    }

    #[test]
    fn test_permission_ids_are_unique() {
        let a = Permission::new("articles.edit");
        let b = Permission::new("articles.edit");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_role_defaults_label_to_name() {
        let role = Role::new("editor");
        assert_eq!(role.label, "editor");
        assert!(!role.is_default);
    }

    #[test]
    fn test_role_builders() {
        let role = Role::new("member").with_label("Member").as_default();
        assert_eq!(role.name, "member");
        assert_eq!(role.label, "Member");
        assert!(role.is_default);
    }
}

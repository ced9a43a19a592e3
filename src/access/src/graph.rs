//! Derived permission graph
//!
//! The graph maps every known subject to the flat set of permission
//! names it holds, with role grants already expanded. It is derived
//! state: rebuilt wholesale from a store snapshot or absent, never
//! patched per subject.

use crate::error::Result;
use crate::store::StoreSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use warden_core::SubjectRef;

/// Subject-keyed view of effective permissions
///
/// Keys are rendered subject references (`kind:id`); roles appear under
/// their own `role:<id>` key. Values are permission names, the union of
/// direct grants and grants inherited through assigned roles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGraph {
    entries: HashMap<String, HashSet<String>>,
}

impl PermissionGraph {
    /// Build a graph from a store snapshot
    ///
    /// Role grants expand exactly one level: a role assigned to another
    /// role contributes that role's own grants, nothing transitive.
    pub fn build(snapshot: &StoreSnapshot) -> Self {
        let permission_names: HashMap<&str, &str> = snapshot
            .permissions
            .iter()
            .map(|p| (p.id.as_str(), p.name.as_str()))
            .collect();

        let mut role_grants: HashMap<&str, HashSet<&str>> = HashMap::new();
        for (role_id, permission_id) in &snapshot.role_permissions {
            if let Some(&name) = permission_names.get(permission_id.as_str()) {
                role_grants
                    .entry(role_id.as_str())
                    .or_default()
                    .insert(name);
            }
        }

        let mut entries: HashMap<String, HashSet<String>> = HashMap::new();

        // Roles are subjects too; seed them so their own grants are visible
        for role in &snapshot.roles {
            let key = SubjectRef::role(&role.id).to_string();
            let grants = role_grants
                .get(role.id.as_str())
                .map(|names| names.iter().map(|n| n.to_string()).collect())
                .unwrap_or_default();
            entries.insert(key, grants);
        }

        for (subject, permission_id) in &snapshot.subject_permissions {
            if let Some(&name) = permission_names.get(permission_id.as_str()) {
                entries
                    .entry(subject.to_string())
                    .or_default()
                    .insert(name.to_string());
            }
        }

        for (subject, role_id) in &snapshot.subject_roles {
            let inherited = role_grants.get(role_id.as_str());
            let entry = entries.entry(subject.to_string()).or_default();
            if let Some(names) = inherited {
                entry.extend(names.iter().map(|n| n.to_string()));
            }
        }

        Self { entries }
    }

    /// Whether `subject` holds `permission_name`, directly or via a role
    pub fn has(&self, subject: &SubjectRef, permission_name: &str) -> bool {
        self.entries
            .get(&subject.to_string())
            .map(|names| names.contains(permission_name))
            .unwrap_or(false)
    }

    /// Effective permission names of a subject, if the graph knows it
    pub fn effective(&self, subject: &SubjectRef) -> Option<&HashSet<String>> {
        self.entries.get(&subject.to_string())
    }

    /// Number of subjects in the graph
    pub fn subject_count(&self) -> usize {
        self.entries.len()
    }

    /// Whether the graph holds no subjects
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encode the graph for cache storage
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode a graph from a cached payload
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

//! Permission and role lookup
//!
//! The catalog is the only component that turns user-supplied references
//! (names, ids, already-loaded records) into canonical entity records.
//! Lookups that miss are errors here, never silent falses.

use crate::error::{AccessError, Result};
use crate::store::EntityStore;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;
use warden_core::{Permission, Role, RoleId};

/// Reference to a permission: a name or an already-resolved record
#[derive(Debug, Clone)]
pub enum PermissionRef {
    /// Look up by unique name
    Name(String),
    /// Use the record as-is
    Entity(Permission),
}

impl From<&str> for PermissionRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for PermissionRef {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<Permission> for PermissionRef {
    fn from(permission: Permission) -> Self {
        Self::Entity(permission)
    }
}

impl From<&Permission> for PermissionRef {
    fn from(permission: &Permission) -> Self {
        Self::Entity(permission.clone())
    }
}

/// Reference to a role: a name, an id, or an already-resolved record
#[derive(Debug, Clone)]
pub enum RoleRef {
    /// Look up by unique name
    Name(String),
    /// Look up by id
    Id(RoleId),
    /// Use the record as-is
    Entity(Role),
}

impl From<&str> for RoleRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for RoleRef {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<Role> for RoleRef {
    fn from(role: Role) -> Self {
        Self::Entity(role)
    }
}

impl From<&Role> for RoleRef {
    fn from(role: &Role) -> Self {
        Self::Entity(role.clone())
    }
}

/// Entity lookup against the store
#[derive(Clone)]
pub struct PermissionCatalog {
    store: Arc<dyn EntityStore>,
}

impl PermissionCatalog {
    /// Create a catalog backed by the given store
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Find a permission by name, erroring when it does not exist
    pub async fn find_permission_by_name(&self, name: &str) -> Result<Permission> {
        self.store
            .permission_by_name(name)
            .await?
            .ok_or_else(|| AccessError::PermissionDoesNotExist(name.to_string()))
    }

    /// Find a role by name, erroring when it does not exist
    pub async fn find_role_by_name(&self, name: &str) -> Result<Role> {
        self.store
            .role_by_name(name)
            .await?
            .ok_or_else(|| AccessError::RoleDoesNotExist(name.to_string()))
    }

    /// Find a role by id, erroring when it does not exist
    pub async fn find_role_by_id(&self, id: &str) -> Result<Role> {
        self.store
            .role_by_id(id)
            .await?
            .ok_or_else(|| AccessError::RoleDoesNotExist(id.to_string()))
    }

    /// Resolve a single permission reference
    pub async fn resolve_permission(&self, reference: impl Into<PermissionRef>) -> Result<Permission> {
        match reference.into() {
            PermissionRef::Name(name) => self.find_permission_by_name(&name).await,
            PermissionRef::Entity(permission) => Ok(permission),
        }
    }

    /// Resolve a mixed collection of permission references
    ///
    /// Name references are bulk-fetched. Resolution is all-or-nothing: one
    /// unknown name fails the whole call. Duplicates collapse to the first
    /// occurrence, input order is otherwise preserved.
    pub async fn resolve_permissions<I, R>(&self, references: I) -> Result<Vec<Permission>>
    where
        I: IntoIterator<Item = R>,
        R: Into<PermissionRef>,
    {
        let references: Vec<PermissionRef> =
            references.into_iter().map(Into::into).collect();

        let names: Vec<String> = references
            .iter()
            .filter_map(|reference| match reference {
                PermissionRef::Name(name) => Some(name.clone()),
                PermissionRef::Entity(_) => None,
            })
            .collect();

        let mut by_name: HashMap<String, Permission> = HashMap::new();
        if !names.is_empty() {
            for permission in self.store.permissions_by_names(&names).await? {
                by_name.insert(permission.name.clone(), permission);
            }
        }

        let mut seen = HashSet::new();
        let mut resolved = Vec::with_capacity(references.len());
        for reference in references {
            let permission = match reference {
                PermissionRef::Name(name) => by_name
                    .get(&name)
                    .cloned()
                    .ok_or(AccessError::PermissionDoesNotExist(name))?,
                PermissionRef::Entity(permission) => permission,
            };
            if seen.insert(permission.id.clone()) {
                resolved.push(permission);
            }
        }

        debug!(count = resolved.len(), "resolved permission references");
        Ok(resolved)
    }

    /// Resolve a single role reference
    pub async fn resolve_role(&self, reference: impl Into<RoleRef>) -> Result<Role> {
        match reference.into() {
            RoleRef::Name(name) => self.find_role_by_name(&name).await,
            RoleRef::Id(id) => self.find_role_by_id(&id).await,
            RoleRef::Entity(role) => Ok(role),
        }
    }

    /// Resolve a mixed collection of role references
    ///
    /// Same contract as [`resolve_permissions`](Self::resolve_permissions):
    /// all-or-nothing, order-preserving, deduplicated by id.
    pub async fn resolve_roles<I, R>(&self, references: I) -> Result<Vec<Role>>
    where
        I: IntoIterator<Item = R>,
        R: Into<RoleRef>,
    {
        let references: Vec<RoleRef> = references.into_iter().map(Into::into).collect();

        let names: Vec<String> = references
            .iter()
            .filter_map(|reference| match reference {
                RoleRef::Name(name) => Some(name.clone()),
                _ => None,
            })
            .collect();

        let mut by_name: HashMap<String, Role> = HashMap::new();
        if !names.is_empty() {
            for role in self.store.roles_by_names(&names).await? {
                by_name.insert(role.name.clone(), role);
            }
        }

        let mut seen = HashSet::new();
        let mut resolved = Vec::with_capacity(references.len());
        for reference in references {
            let role = match reference {
                RoleRef::Name(name) => by_name
                    .get(&name)
                    .cloned()
                    .ok_or(AccessError::RoleDoesNotExist(name))?,
                RoleRef::Id(id) => self.find_role_by_id(&id).await?,
                RoleRef::Entity(role) => role,
            };
            if seen.insert(role.id.clone()) {
                resolved.push(role);
            }
        }

        debug!(count = resolved.len(), "resolved role references");
        Ok(resolved)
    }

    /// All permissions known to the store, ordered by name
    pub async fn list_permissions(&self) -> Result<Vec<Permission>> {
        self.store.list_permissions().await
    }

    /// All roles known to the store, ordered by name
    pub async fn list_roles(&self) -> Result<Vec<Role>> {
        self.store.list_roles().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryEntityStore;

    async fn catalog_with_fixtures() -> (PermissionCatalog, Permission, Role) {
        let store = Arc::new(MemoryEntityStore::new());
        let permission = store
            .create_permission(Permission::new("articles.edit"))
            .await
            .unwrap();
        let role = store.create_role(Role::new("editor")).await.unwrap();
        (PermissionCatalog::new(store), permission, role)
    }

    #[tokio::test]
    async fn test_find_permission_by_name() {
        let (catalog, permission, _) = catalog_with_fixtures().await;

        let found = catalog.find_permission_by_name("articles.edit").await.unwrap();
        assert_eq!(found, permission);

        let err = catalog.find_permission_by_name("absent").await.unwrap_err();
        assert!(matches!(err, AccessError::PermissionDoesNotExist(_)));
    }

    #[tokio::test]
    async fn test_find_role_by_name_and_id() {
        let (catalog, _, role) = catalog_with_fixtures().await;

        assert_eq!(catalog.find_role_by_name("editor").await.unwrap(), role);
        assert_eq!(catalog.find_role_by_id(&role.id).await.unwrap(), role);

        let err = catalog.find_role_by_id("missing").await.unwrap_err();
        assert!(matches!(err, AccessError::RoleDoesNotExist(_)));
    }

    #[tokio::test]
    async fn test_resolve_mixed_references() {
        let (catalog, permission, _) = catalog_with_fixtures().await;

        let resolved = catalog
            .resolve_permissions([
                PermissionRef::from("articles.edit"),
                PermissionRef::from(&permission),
            ])
            .await
            .unwrap();

        // The name and the record refer to the same permission
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0], permission);
    }

    #[tokio::test]
    async fn test_resolve_preserves_input_order() {
        let store = Arc::new(MemoryEntityStore::new());
        store.create_permission(Permission::new("b")).await.unwrap();
        store.create_permission(Permission::new("a")).await.unwrap();
        let catalog = PermissionCatalog::new(store);

        let resolved = catalog.resolve_permissions(["b", "a"]).await.unwrap();
        let names: Vec<&str> = resolved.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_resolve_is_all_or_nothing() {
        let (catalog, _, _) = catalog_with_fixtures().await;

        let err = catalog
            .resolve_permissions(["articles.edit", "absent"])
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::PermissionDoesNotExist(name) if name == "absent"));
    }

    #[tokio::test]
    async fn test_resolve_roles_by_id_reference() {
        let (catalog, _, role) = catalog_with_fixtures().await;

        let resolved = catalog
            .resolve_roles([RoleRef::Id(role.id.clone()), RoleRef::from("editor")])
            .await
            .unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0], role);
    }
}

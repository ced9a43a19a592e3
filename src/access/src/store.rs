//! Entity store contract and in-memory backend
//!
//! The store owns durable state: permission and role records plus the
//! three relation tables (role grants, direct subject grants, role
//! assignments). Everything else in the engine is derived from it.

use crate::error::{AccessError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use warden_core::{Permission, PermissionId, Role, RoleId, SubjectRef};

/// Consistent point-in-time copy of every table the graph rebuild reads
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    /// All permission records
    pub permissions: Vec<Permission>,

    /// All role records
    pub roles: Vec<Role>,

    /// (role id, permission id) grant rows
    pub role_permissions: Vec<(RoleId, PermissionId)>,

    /// (subject, permission id) direct grant rows
    pub subject_permissions: Vec<(SubjectRef, PermissionId)>,

    /// (subject, role id) assignment rows
    pub subject_roles: Vec<(SubjectRef, RoleId)>,
}

/// Persistence backend for permissions, roles, and their relations
///
/// Implementations enforce referential integrity: attach and replace
/// operations reject unknown entity ids, and deleting an entity removes
/// every relation row referencing it. Attach operations are idempotent
/// set inserts; the returned bool reports whether a row was created.
#[async_trait]
pub trait EntityStore: Send + Sync {
    // --- Entity lifecycle ---

    /// Persist a new permission; the name must be unused
    async fn create_permission(&self, permission: Permission) -> Result<Permission>;

    /// Persist a new role; the name must be unused
    async fn create_role(&self, role: Role) -> Result<Role>;

    /// Delete a permission and every relation row referencing it
    async fn delete_permission(&self, id: &str) -> Result<()>;

    /// Delete a role and every relation row referencing it
    async fn delete_role(&self, id: &str) -> Result<()>;

    // --- Entity lookups ---

    /// Find a permission by its unique name
    async fn permission_by_name(&self, name: &str) -> Result<Option<Permission>>;

    /// Bulk-fetch permissions by name; missing names are silently skipped
    async fn permissions_by_names(&self, names: &[String]) -> Result<Vec<Permission>>;

    /// Find a role by its unique name
    async fn role_by_name(&self, name: &str) -> Result<Option<Role>>;

    /// Find a role by id
    async fn role_by_id(&self, id: &str) -> Result<Option<Role>>;

    /// Bulk-fetch roles by name; missing names are silently skipped
    async fn roles_by_names(&self, names: &[String]) -> Result<Vec<Role>>;

    /// All permissions, ordered by name
    async fn list_permissions(&self) -> Result<Vec<Permission>>;

    /// All roles, ordered by name
    async fn list_roles(&self) -> Result<Vec<Role>>;

    /// Roles flagged as assigned-by-default, ordered by name
    async fn default_roles(&self) -> Result<Vec<Role>>;

    // --- Role permission grants ---

    /// Grant a permission to a role
    async fn attach_role_permission(&self, role_id: &str, permission_id: &str) -> Result<bool>;

    /// Revoke a permission from a role
    async fn detach_role_permission(&self, role_id: &str, permission_id: &str) -> Result<bool>;

    /// Atomically replace a role's grants with exactly `permission_ids`
    ///
    /// Backends that cannot serialize the replacement in one transaction
    /// return [`AccessError::SyncConflict`] when a concurrent writer
    /// interferes.
    async fn replace_role_permissions(
        &self,
        role_id: &str,
        permission_ids: &[PermissionId],
    ) -> Result<()>;

    /// Permission ids granted to a role, sorted
    async fn role_permission_ids(&self, role_id: &str) -> Result<Vec<PermissionId>>;

    /// Roles holding a permission, ordered by name
    async fn roles_with_permission(&self, permission_id: &str) -> Result<Vec<Role>>;

    // --- Direct subject grants ---

    /// Grant a permission directly to a subject
    async fn attach_subject_permission(
        &self,
        subject: &SubjectRef,
        permission_id: &str,
    ) -> Result<bool>;

    /// Revoke a direct permission grant from a subject
    async fn detach_subject_permission(
        &self,
        subject: &SubjectRef,
        permission_id: &str,
    ) -> Result<bool>;

    /// Atomically replace a subject's direct grants with exactly `permission_ids`
    async fn replace_subject_permissions(
        &self,
        subject: &SubjectRef,
        permission_ids: &[PermissionId],
    ) -> Result<()>;

    /// Permission ids granted directly to a subject, sorted
    async fn subject_permission_ids(&self, subject: &SubjectRef) -> Result<Vec<PermissionId>>;

    // --- Role assignments ---

    /// Assign a role to a subject
    async fn attach_subject_role(&self, subject: &SubjectRef, role_id: &str) -> Result<bool>;

    /// Remove a role from a subject
    async fn detach_subject_role(&self, subject: &SubjectRef, role_id: &str) -> Result<bool>;

    /// Atomically replace a subject's roles with exactly `role_ids`
    async fn replace_subject_roles(&self, subject: &SubjectRef, role_ids: &[RoleId])
        -> Result<()>;

    /// Roles assigned to a subject, ordered by name
    async fn roles_of(&self, subject: &SubjectRef) -> Result<Vec<Role>>;

    /// Subjects holding a role, ordered by rendered key
    async fn subjects_with_role(&self, role_id: &str) -> Result<Vec<SubjectRef>>;

    // --- Graph rebuild ---

    /// Consistent snapshot of all tables, taken at a single instant
    async fn snapshot(&self) -> Result<StoreSnapshot>;
}

#[derive(Debug, Default)]
struct StoreState {
    permissions: HashMap<PermissionId, Permission>,
    roles: HashMap<RoleId, Role>,
    permission_names: HashMap<String, PermissionId>,
    role_names: HashMap<String, RoleId>,
    role_permissions: HashSet<(RoleId, PermissionId)>,
    subject_permissions: HashSet<(SubjectRef, PermissionId)>,
    subject_roles: HashSet<(SubjectRef, RoleId)>,
}

impl StoreState {
    fn require_permission(&self, id: &str) -> Result<()> {
        if self.permissions.contains_key(id) {
            return Ok(());
        }
        Err(AccessError::PermissionDoesNotExist(id.to_string()))
    }

    fn require_role(&self, id: &str) -> Result<()> {
        if self.roles.contains_key(id) {
            return Ok(());
        }
        Err(AccessError::RoleDoesNotExist(id.to_string()))
    }

    fn roles_sorted(&self, ids: impl Iterator<Item = RoleId>) -> Vec<Role> {
        let mut roles: Vec<Role> = ids.filter_map(|id| self.roles.get(&id).cloned()).collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        roles
    }
}

/// In-memory entity store implementation
///
/// All mutations run under a single write lock, so replace operations
/// are naturally atomic and the snapshot never observes a torn write.
pub struct MemoryEntityStore {
    state: Arc<RwLock<StoreState>>,
}

impl MemoryEntityStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(StoreState::default())),
        }
    }
}

impl Default for MemoryEntityStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntityStore for MemoryEntityStore {
    async fn create_permission(&self, permission: Permission) -> Result<Permission> {
        let mut state = self.state.write().await;
        if state.permission_names.contains_key(&permission.name) {
            return Err(AccessError::PermissionAlreadyExists(permission.name));
        }
        state
            .permission_names
            .insert(permission.name.clone(), permission.id.clone());
        state
            .permissions
            .insert(permission.id.clone(), permission.clone());
        Ok(permission)
    }

    async fn create_role(&self, role: Role) -> Result<Role> {
        let mut state = self.state.write().await;
        if state.role_names.contains_key(&role.name) {
            return Err(AccessError::RoleAlreadyExists(role.name));
        }
        state.role_names.insert(role.name.clone(), role.id.clone());
        state.roles.insert(role.id.clone(), role.clone());
        Ok(role)
    }

    async fn delete_permission(&self, id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(permission) = state.permissions.remove(id) {
            state.permission_names.remove(&permission.name);
            state.role_permissions.retain(|(_, pid)| pid != id);
            state.subject_permissions.retain(|(_, pid)| pid != id);
        }
        Ok(())
    }

    async fn delete_role(&self, id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(role) = state.roles.remove(id) {
            state.role_names.remove(&role.name);
            state.role_permissions.retain(|(rid, _)| rid != id);
            // The deleted role may also be a grantee, keyed as a subject
            let as_subject = SubjectRef::role(id);
            state
                .subject_roles
                .retain(|(subject, rid)| rid != id && subject != &as_subject);
            state
                .subject_permissions
                .retain(|(subject, _)| subject != &as_subject);
        }
        Ok(())
    }

    async fn permission_by_name(&self, name: &str) -> Result<Option<Permission>> {
        let state = self.state.read().await;
        Ok(state
            .permission_names
            .get(name)
            .and_then(|id| state.permissions.get(id))
            .cloned())
    }

    async fn permissions_by_names(&self, names: &[String]) -> Result<Vec<Permission>> {
        let state = self.state.read().await;
        let mut found = Vec::with_capacity(names.len());
        for name in names {
            if let Some(permission) = state
                .permission_names
                .get(name)
                .and_then(|id| state.permissions.get(id))
            {
                found.push(permission.clone());
            }
        }
        Ok(found)
    }

    async fn role_by_name(&self, name: &str) -> Result<Option<Role>> {
        let state = self.state.read().await;
        Ok(state
            .role_names
            .get(name)
            .and_then(|id| state.roles.get(id))
            .cloned())
    }

    async fn role_by_id(&self, id: &str) -> Result<Option<Role>> {
        let state = self.state.read().await;
        Ok(state.roles.get(id).cloned())
    }

    async fn roles_by_names(&self, names: &[String]) -> Result<Vec<Role>> {
        let state = self.state.read().await;
        let mut found = Vec::with_capacity(names.len());
        for name in names {
            if let Some(role) = state.role_names.get(name).and_then(|id| state.roles.get(id)) {
                found.push(role.clone());
            }
        }
        Ok(found)
    }

    async fn list_permissions(&self) -> Result<Vec<Permission>> {
        let state = self.state.read().await;
        let mut permissions: Vec<Permission> = state.permissions.values().cloned().collect();
        permissions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(permissions)
    }

    async fn list_roles(&self) -> Result<Vec<Role>> {
        let state = self.state.read().await;
        Ok(state.roles_sorted(state.roles.keys().cloned()))
    }

    async fn default_roles(&self) -> Result<Vec<Role>> {
        let state = self.state.read().await;
        let ids = state
            .roles
            .values()
            .filter(|role| role.is_default)
            .map(|role| role.id.clone())
            .collect::<Vec<_>>();
        Ok(state.roles_sorted(ids.into_iter()))
    }

    async fn attach_role_permission(&self, role_id: &str, permission_id: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        state.require_role(role_id)?;
        state.require_permission(permission_id)?;
        Ok(state
            .role_permissions
            .insert((role_id.to_string(), permission_id.to_string())))
    }

    async fn detach_role_permission(&self, role_id: &str, permission_id: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        Ok(state
            .role_permissions
            .remove(&(role_id.to_string(), permission_id.to_string())))
    }

    async fn replace_role_permissions(
        &self,
        role_id: &str,
        permission_ids: &[PermissionId],
    ) -> Result<()> {
        let mut state = self.state.write().await;
        state.require_role(role_id)?;
        for permission_id in permission_ids {
            state.require_permission(permission_id)?;
        }
        state.role_permissions.retain(|(rid, _)| rid != role_id);
        for permission_id in permission_ids {
            state
                .role_permissions
                .insert((role_id.to_string(), permission_id.clone()));
        }
        Ok(())
    }

    async fn role_permission_ids(&self, role_id: &str) -> Result<Vec<PermissionId>> {
        let state = self.state.read().await;
        let mut ids: Vec<PermissionId> = state
            .role_permissions
            .iter()
            .filter(|(rid, _)| rid == role_id)
            .map(|(_, pid)| pid.clone())
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn roles_with_permission(&self, permission_id: &str) -> Result<Vec<Role>> {
        let state = self.state.read().await;
        let ids = state
            .role_permissions
            .iter()
            .filter(|(_, pid)| pid == permission_id)
            .map(|(rid, _)| rid.clone())
            .collect::<Vec<_>>();
        Ok(state.roles_sorted(ids.into_iter()))
    }

    async fn attach_subject_permission(
        &self,
        subject: &SubjectRef,
        permission_id: &str,
    ) -> Result<bool> {
        let mut state = self.state.write().await;
        state.require_permission(permission_id)?;
        Ok(state
            .subject_permissions
            .insert((subject.clone(), permission_id.to_string())))
    }

    async fn detach_subject_permission(
        &self,
        subject: &SubjectRef,
        permission_id: &str,
    ) -> Result<bool> {
        let mut state = self.state.write().await;
        Ok(state
            .subject_permissions
            .remove(&(subject.clone(), permission_id.to_string())))
    }

    async fn replace_subject_permissions(
        &self,
        subject: &SubjectRef,
        permission_ids: &[PermissionId],
    ) -> Result<()> {
        let mut state = self.state.write().await;
        for permission_id in permission_ids {
            state.require_permission(permission_id)?;
        }
        state.subject_permissions.retain(|(s, _)| s != subject);
        for permission_id in permission_ids {
            state
                .subject_permissions
                .insert((subject.clone(), permission_id.clone()));
        }
        Ok(())
    }

    async fn subject_permission_ids(&self, subject: &SubjectRef) -> Result<Vec<PermissionId>> {
        let state = self.state.read().await;
        let mut ids: Vec<PermissionId> = state
            .subject_permissions
            .iter()
            .filter(|(s, _)| s == subject)
            .map(|(_, pid)| pid.clone())
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn attach_subject_role(&self, subject: &SubjectRef, role_id: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        state.require_role(role_id)?;
        Ok(state
            .subject_roles
            .insert((subject.clone(), role_id.to_string())))
    }

    async fn detach_subject_role(&self, subject: &SubjectRef, role_id: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        Ok(state
            .subject_roles
            .remove(&(subject.clone(), role_id.to_string())))
    }

    async fn replace_subject_roles(
        &self,
        subject: &SubjectRef,
        role_ids: &[RoleId],
    ) -> Result<()> {
        let mut state = self.state.write().await;
        for role_id in role_ids {
            state.require_role(role_id)?;
        }
        state.subject_roles.retain(|(s, _)| s != subject);
        for role_id in role_ids {
            state.subject_roles.insert((subject.clone(), role_id.clone()));
        }
        Ok(())
    }

    async fn roles_of(&self, subject: &SubjectRef) -> Result<Vec<Role>> {
        let state = self.state.read().await;
        let ids = state
            .subject_roles
            .iter()
            .filter(|(s, _)| s == subject)
            .map(|(_, rid)| rid.clone())
            .collect::<Vec<_>>();
        Ok(state.roles_sorted(ids.into_iter()))
    }

    async fn subjects_with_role(&self, role_id: &str) -> Result<Vec<SubjectRef>> {
        let state = self.state.read().await;
        let mut subjects: Vec<SubjectRef> = state
            .subject_roles
            .iter()
            .filter(|(_, rid)| rid == role_id)
            .map(|(s, _)| s.clone())
            .collect();
        subjects.sort_by_key(|s| s.to_string());
        Ok(subjects)
    }

    async fn snapshot(&self) -> Result<StoreSnapshot> {
        let state = self.state.read().await;
        Ok(StoreSnapshot {
            permissions: state.permissions.values().cloned().collect(),
            roles: state.roles.values().cloned().collect(),
            role_permissions: state.role_permissions.iter().cloned().collect(),
            subject_permissions: state.subject_permissions.iter().cloned().collect(),
            subject_roles: state.subject_roles.iter().cloned().collect(),
        })
    }
}

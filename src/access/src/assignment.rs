//! Grant and assignment mutations
//!
//! Every mutation follows the same pipeline: resolve references through
//! the catalog, write relation rows through the store, then invalidate
//! the cached graph. Invalidation runs strictly after the store write
//! commits, so a failed write never drops a still-valid cache entry.

use crate::catalog::{PermissionCatalog, PermissionRef, RoleRef};
use crate::error::Result;
use crate::registrar::Registrar;
use crate::store::EntityStore;
use std::sync::Arc;
use tracing::{debug, warn};
use warden_core::{HoldsPermissions, Role};

/// Write side of the engine: grants, revocations, and role assignments
///
/// Grants routed through a role subject land in the role's grant table;
/// all other subjects receive direct grants. Attach operations are
/// idempotent, and the sync operations replace the previous set
/// atomically rather than detaching and re-attaching row by row.
pub struct AssignmentEngine {
    catalog: PermissionCatalog,
    store: Arc<dyn EntityStore>,
    registrar: Arc<Registrar>,
}

impl AssignmentEngine {
    /// Create an engine over a store and the registrar owning its cache
    pub fn new(store: Arc<dyn EntityStore>, registrar: Arc<Registrar>) -> Self {
        Self {
            catalog: PermissionCatalog::new(store.clone()),
            store,
            registrar,
        }
    }

    /// Grant one or more permissions to a subject
    ///
    /// Resolution is all-or-nothing: one unknown reference fails the call
    /// before any row is written. Granting an already-held permission is
    /// a no-op.
    pub async fn give_permission_to<S, I, R>(&self, subject: &S, references: I) -> Result<()>
    where
        S: HoldsPermissions,
        I: IntoIterator<Item = R>,
        R: Into<PermissionRef>,
    {
        let subject = subject.subject_ref().validated()?;
        let permissions = self.catalog.resolve_permissions(references).await?;

        for permission in &permissions {
            let created = if subject.is_role() {
                self.store
                    .attach_role_permission(&subject.id, &permission.id)
                    .await?
            } else {
                self.store
                    .attach_subject_permission(&subject, &permission.id)
                    .await?
            };
            if created {
                debug!("Granted {} to {}", permission.name, subject);
            }
        }

        self.invalidate_graph().await
    }

    /// Revoke a single permission from a subject
    ///
    /// Revoking a permission the subject does not hold is a no-op.
    pub async fn revoke_permission_from<S>(
        &self,
        subject: &S,
        reference: impl Into<PermissionRef>,
    ) -> Result<()>
    where
        S: HoldsPermissions,
    {
        let subject = subject.subject_ref().validated()?;
        let permission = self.catalog.resolve_permission(reference).await?;

        let removed = if subject.is_role() {
            self.store
                .detach_role_permission(&subject.id, &permission.id)
                .await?
        } else {
            self.store
                .detach_subject_permission(&subject, &permission.id)
                .await?
        };
        if removed {
            debug!("Revoked {} from {}", permission.name, subject);
        }

        self.invalidate_graph().await
    }

    /// Replace a subject's direct grants with exactly the given permissions
    ///
    /// The replacement is a single atomic store operation; a concurrent
    /// reader never observes the subject stripped of the old set before
    /// the new set lands.
    pub async fn sync_permissions<S, I, R>(&self, subject: &S, references: I) -> Result<()>
    where
        S: HoldsPermissions,
        I: IntoIterator<Item = R>,
        R: Into<PermissionRef>,
    {
        let subject = subject.subject_ref().validated()?;
        let permissions = self.catalog.resolve_permissions(references).await?;
        let ids: Vec<String> = permissions.iter().map(|p| p.id.clone()).collect();

        if subject.is_role() {
            self.store
                .replace_role_permissions(&subject.id, &ids)
                .await?;
        } else {
            self.store
                .replace_subject_permissions(&subject, &ids)
                .await?;
        }
        debug!("Synced {} permissions for {}", ids.len(), subject);

        self.invalidate_graph().await
    }

    /// Assign one or more roles to a subject
    ///
    /// Assigning an already-held role is a no-op.
    pub async fn assign_role<S, I, R>(&self, subject: &S, references: I) -> Result<()>
    where
        S: HoldsPermissions,
        I: IntoIterator<Item = R>,
        R: Into<RoleRef>,
    {
        let subject = subject.subject_ref().validated()?;
        let roles = self.catalog.resolve_roles(references).await?;

        for role in &roles {
            let created = self.store.attach_subject_role(&subject, &role.id).await?;
            if created {
                debug!("Assigned role {} to {}", role.name, subject);
            }
        }

        self.invalidate_graph().await
    }

    /// Remove a single role from a subject
    ///
    /// Removing a role the subject does not hold is a no-op.
    pub async fn remove_role<S>(&self, subject: &S, reference: impl Into<RoleRef>) -> Result<()>
    where
        S: HoldsPermissions,
    {
        let subject = subject.subject_ref().validated()?;
        let role = self.catalog.resolve_role(reference).await?;

        let removed = self.store.detach_subject_role(&subject, &role.id).await?;
        if removed {
            debug!("Removed role {} from {}", role.name, subject);
        }

        self.invalidate_graph().await
    }

    /// Replace a subject's roles with exactly the given set, atomically
    pub async fn sync_roles<S, I, R>(&self, subject: &S, references: I) -> Result<()>
    where
        S: HoldsPermissions,
        I: IntoIterator<Item = R>,
        R: Into<RoleRef>,
    {
        let subject = subject.subject_ref().validated()?;
        let roles = self.catalog.resolve_roles(references).await?;
        let ids: Vec<String> = roles.iter().map(|r| r.id.clone()).collect();

        self.store.replace_subject_roles(&subject, &ids).await?;
        debug!("Synced {} roles for {}", ids.len(), subject);

        self.invalidate_graph().await
    }

    /// Assign every role flagged as default to a subject
    ///
    /// Returns the default roles that were considered, whether or not the
    /// subject already held them.
    pub async fn assign_default_roles<S>(&self, subject: &S) -> Result<Vec<Role>>
    where
        S: HoldsPermissions,
    {
        let subject = subject.subject_ref().validated()?;
        let roles = self.store.default_roles().await?;

        for role in &roles {
            let created = self.store.attach_subject_role(&subject, &role.id).await?;
            if created {
                debug!("Assigned default role {} to {}", role.name, subject);
            }
        }

        self.invalidate_graph().await?;
        Ok(roles)
    }

    async fn invalidate_graph(&self) -> Result<()> {
        if let Err(e) = self.registrar.invalidate().await {
            warn!("Cache invalidation failed after store write: {}", e);
            return Err(e);
        }
        Ok(())
    }
}

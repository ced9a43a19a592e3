//! Authorization checks
//!
//! Permission checks read the derived graph through the registrar, so a
//! check is one cache read plus a set lookup on the hot path. Role
//! checks read the store directly: role membership is not part of the
//! graph payload.

use crate::catalog::PermissionCatalog;
use crate::error::Result;
use crate::registrar::Registrar;
use crate::store::EntityStore;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;
use warden_core::HoldsPermissions;

/// Read side of the engine: permission and role checks
pub struct AuthorizationChecker {
    catalog: PermissionCatalog,
    store: Arc<dyn EntityStore>,
    registrar: Arc<Registrar>,
}

impl AuthorizationChecker {
    /// Create a checker over a store and the registrar owning its cache
    pub fn new(store: Arc<dyn EntityStore>, registrar: Arc<Registrar>) -> Self {
        Self {
            catalog: PermissionCatalog::new(store.clone()),
            store,
            registrar,
        }
    }

    /// Whether `subject` holds the named permission, directly or via a role
    ///
    /// An unknown permission name is an error, not a false: a typo in a
    /// check should surface instead of silently denying forever.
    pub async fn has_permission<S>(&self, subject: &S, permission_name: &str) -> Result<bool>
    where
        S: HoldsPermissions,
    {
        let subject = subject.subject_ref().validated()?;
        let (permission, graph) = tokio::try_join!(
            self.catalog.find_permission_by_name(permission_name),
            self.registrar.permissions(),
        )?;

        let allowed = graph.has(&subject, &permission.name);
        debug!(
            "Permission check: subject={}, permission={}, allowed={}",
            subject, permission.name, allowed
        );
        Ok(allowed)
    }

    /// Every permission name the subject effectively holds
    pub async fn effective_permissions<S>(&self, subject: &S) -> Result<HashSet<String>>
    where
        S: HoldsPermissions,
    {
        let subject = subject.subject_ref().validated()?;
        let graph = self.registrar.permissions().await?;
        Ok(graph.effective(&subject).cloned().unwrap_or_default())
    }

    /// Whether `subject` holds the named role
    ///
    /// Unlike permission checks, an unknown role name is not an error;
    /// the subject simply does not hold it.
    pub async fn has_role<S>(&self, subject: &S, role_name: &str) -> Result<bool>
    where
        S: HoldsPermissions,
    {
        let subject = subject.subject_ref().validated()?;
        let roles = self.store.roles_of(&subject).await?;
        Ok(roles.iter().any(|role| role.name == role_name))
    }

    /// Whether `subject` holds at least one of the named roles
    ///
    /// Vacuously false for an empty collection.
    pub async fn has_any_role<S, I>(&self, subject: &S, role_names: I) -> Result<bool>
    where
        S: HoldsPermissions,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let held = self.held_role_names(subject).await?;
        Ok(role_names
            .into_iter()
            .any(|name| held.contains(name.as_ref())))
    }

    /// Whether `subject` holds every one of the named roles
    ///
    /// Vacuously true for an empty collection.
    pub async fn has_all_roles<S, I>(&self, subject: &S, role_names: I) -> Result<bool>
    where
        S: HoldsPermissions,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let held = self.held_role_names(subject).await?;
        Ok(role_names
            .into_iter()
            .all(|name| held.contains(name.as_ref())))
    }

    async fn held_role_names<S>(&self, subject: &S) -> Result<HashSet<String>>
    where
        S: HoldsPermissions,
    {
        let subject = subject.subject_ref().validated()?;
        let roles = self.store.roles_of(&subject).await?;
        Ok(roles.into_iter().map(|role| role.name).collect())
    }
}

//! Authorization check tests
//!
//! Covers the read side: graph-backed permission checks, store-backed
//! role checks, and the combinator semantics on empty inputs.

use std::collections::HashSet;
use std::sync::Arc;
use warden_access::{
    AccessConfig, AccessError, AssignmentEngine, AuthorizationChecker, EntityStore, MemoryCache,
    MemoryEntityStore, Registrar,
};
use warden_core::{HoldsPermissions, Permission, Role, SubjectRef};

struct Harness {
    store: Arc<MemoryEntityStore>,
    engine: AssignmentEngine,
    checker: AuthorizationChecker,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryEntityStore::new());
    let cache = Arc::new(MemoryCache::new());
    let registrar = Arc::new(Registrar::new(
        store.clone(),
        cache,
        AccessConfig::default(),
    ));
    Harness {
        engine: AssignmentEngine::new(store.clone(), registrar.clone()),
        checker: AuthorizationChecker::new(store.clone(), registrar),
        store,
    }
}

async fn seed(store: &MemoryEntityStore) {
    for name in ["articles.edit", "articles.publish"] {
        store
            .create_permission(Permission::new(name))
            .await
            .unwrap();
    }
    store.create_role(Role::new("editor")).await.unwrap();
    store.create_role(Role::new("admin")).await.unwrap();
}

// ============================================================================
// PERMISSION CHECKS
// ============================================================================

#[tokio::test]
async fn test_unheld_permission_denies() {
    let h = harness();
    seed(&h.store).await;
    let alice = SubjectRef::user("alice");

    assert!(!h.checker.has_permission(&alice, "articles.edit").await.unwrap());
}

#[tokio::test]
async fn test_unknown_permission_name_is_an_error_not_a_false() {
    let h = harness();
    seed(&h.store).await;
    let alice = SubjectRef::user("alice");

    let err = h
        .checker
        .has_permission(&alice, "artcles.edit")
        .await
        .unwrap_err();
    assert!(matches!(err, AccessError::PermissionDoesNotExist(name) if name == "artcles.edit"));
}

#[tokio::test]
async fn test_role_inherited_permission_allows() {
    let h = harness();
    seed(&h.store).await;
    let editor = h.store.role_by_name("editor").await.unwrap().unwrap();
    let alice = SubjectRef::user("alice");

    h.engine
        .give_permission_to(&editor, ["articles.publish"])
        .await
        .unwrap();
    h.engine.assign_role(&alice, ["editor"]).await.unwrap();

    // No direct grant exists, the permission flows through the role
    assert!(h
        .store
        .subject_permission_ids(&alice)
        .await
        .unwrap()
        .is_empty());
    assert!(h
        .checker
        .has_permission(&alice, "articles.publish")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_effective_set_unions_direct_and_inherited() {
    let h = harness();
    seed(&h.store).await;
    let editor = h.store.role_by_name("editor").await.unwrap().unwrap();
    let alice = SubjectRef::user("alice");

    h.engine
        .give_permission_to(&editor, ["articles.publish"])
        .await
        .unwrap();
    h.engine.assign_role(&alice, ["editor"]).await.unwrap();
    h.engine
        .give_permission_to(&alice, ["articles.edit"])
        .await
        .unwrap();

    let effective = h.checker.effective_permissions(&alice).await.unwrap();
    assert_eq!(
        effective,
        HashSet::from([
            "articles.edit".to_string(),
            "articles.publish".to_string()
        ])
    );
}

#[tokio::test]
async fn test_removing_role_stops_inheritance() {
    let h = harness();
    seed(&h.store).await;
    let editor = h.store.role_by_name("editor").await.unwrap().unwrap();
    let alice = SubjectRef::user("alice");

    h.engine
        .give_permission_to(&editor, ["articles.publish"])
        .await
        .unwrap();
    h.engine.assign_role(&alice, ["editor"]).await.unwrap();
    assert!(h
        .checker
        .has_permission(&alice, "articles.publish")
        .await
        .unwrap());

    h.engine.remove_role(&alice, "editor").await.unwrap();
    assert!(!h
        .checker
        .has_permission(&alice, "articles.publish")
        .await
        .unwrap());
}

// ============================================================================
// ROLE CHECKS
// ============================================================================

#[tokio::test]
async fn test_has_role() {
    let h = harness();
    seed(&h.store).await;
    let alice = SubjectRef::user("alice");

    h.engine.assign_role(&alice, ["editor"]).await.unwrap();

    assert!(h.checker.has_role(&alice, "editor").await.unwrap());
    assert!(!h.checker.has_role(&alice, "admin").await.unwrap());
}

#[tokio::test]
async fn test_has_role_with_unknown_name_is_false() {
    let h = harness();
    seed(&h.store).await;
    let alice = SubjectRef::user("alice");

    assert!(!h.checker.has_role(&alice, "no-such-role").await.unwrap());
}

#[tokio::test]
async fn test_has_any_role() {
    let h = harness();
    seed(&h.store).await;
    let alice = SubjectRef::user("alice");
    h.engine.assign_role(&alice, ["editor"]).await.unwrap();

    assert!(h
        .checker
        .has_any_role(&alice, ["admin", "editor"])
        .await
        .unwrap());
    assert!(!h.checker.has_any_role(&alice, ["admin"]).await.unwrap());

    // Vacuously false on an empty collection
    assert!(!h
        .checker
        .has_any_role(&alice, Vec::<&str>::new())
        .await
        .unwrap());
}

#[tokio::test]
async fn test_has_all_roles() {
    let h = harness();
    seed(&h.store).await;
    let alice = SubjectRef::user("alice");
    h.engine.assign_role(&alice, ["editor", "admin"]).await.unwrap();

    assert!(h
        .checker
        .has_all_roles(&alice, ["editor", "admin"])
        .await
        .unwrap());

    h.engine.remove_role(&alice, "admin").await.unwrap();
    assert!(!h
        .checker
        .has_all_roles(&alice, ["editor", "admin"])
        .await
        .unwrap());

    // Vacuously true on an empty collection
    assert!(h
        .checker
        .has_all_roles(&alice, Vec::<&str>::new())
        .await
        .unwrap());
}

// ============================================================================
// SUBJECT KINDS
// ============================================================================

#[tokio::test]
async fn test_role_subject_checks_its_own_grants() {
    let h = harness();
    seed(&h.store).await;
    let editor = h.store.role_by_name("editor").await.unwrap().unwrap();

    h.engine
        .give_permission_to(&editor, ["articles.edit"])
        .await
        .unwrap();

    // The Role record itself is a grantee through HoldsPermissions
    assert!(h.checker.has_permission(&editor, "articles.edit").await.unwrap());
    assert!(!h
        .checker
        .has_permission(&editor, "articles.publish")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_application_types_can_be_grantees() {
    struct Account {
        id: String,
    }

    impl HoldsPermissions for Account {
        fn subject_ref(&self) -> SubjectRef {
            SubjectRef::new("account", &self.id)
        }
    }

    let h = harness();
    seed(&h.store).await;
    let account = Account {
        id: "acct-99".to_string(),
    };

    h.engine
        .give_permission_to(&account, ["articles.edit"])
        .await
        .unwrap();

    assert!(h
        .checker
        .has_permission(&account, "articles.edit")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_subject_kinds_are_disjoint() {
    let h = harness();
    seed(&h.store).await;
    let user = SubjectRef::user("shared-id");
    let service = SubjectRef::new("service", "shared-id");

    h.engine
        .give_permission_to(&user, ["articles.edit"])
        .await
        .unwrap();

    assert!(h.checker.has_permission(&user, "articles.edit").await.unwrap());
    assert!(!h
        .checker
        .has_permission(&service, "articles.edit")
        .await
        .unwrap());
}

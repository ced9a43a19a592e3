//! # Warden Access
//!
//! Role and permission assignment engine with a cache-coherent derived
//! permission graph.
//!
//! ## Features
//!
//! - **Async-first design** using Tokio runtime
//! - **Pluggable persistence** through the [`EntityStore`] trait
//! - **Shared cache backend** through the [`CacheClient`] trait, so many
//!   engine instances converge after any mutation
//! - **Whole-graph caching**: one payload, rebuilt from a consistent
//!   store snapshot, never patched per subject
//! - **Heterogeneous references**: names, ids, and loaded records are
//!   accepted interchangeably by every mutation
//! - **Atomic sync**: replacing a grant set is a single store operation,
//!   not a detach-then-attach window
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use warden_access::{
//!     AccessConfig, AssignmentEngine, AuthorizationChecker, EntityStore,
//!     MemoryCache, MemoryEntityStore, Registrar,
//! };
//! use warden_core::{Permission, Role, SubjectRef};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryEntityStore::new());
//!     let cache = Arc::new(MemoryCache::new());
//!     let registrar = Arc::new(Registrar::new(
//!         store.clone(),
//!         cache,
//!         AccessConfig::default(),
//!     ));
//!     let engine = AssignmentEngine::new(store.clone(), registrar.clone());
//!     let checker = AuthorizationChecker::new(store.clone(), registrar);
//!
//!     store.create_permission(Permission::new("articles.publish")).await?;
//!     let editor = store.create_role(Role::new("editor")).await?;
//!     engine.give_permission_to(&editor, ["articles.publish"]).await?;
//!
//!     let alice = SubjectRef::user("alice");
//!     engine.assign_role(&alice, ["editor"]).await?;
//!
//!     assert!(checker.has_permission(&alice, "articles.publish").await?);
//!     Ok(())
//! }
//! ```

pub mod assignment;
pub mod cache;
pub mod catalog;
pub mod checker;
pub mod config;
pub mod error;
pub mod graph;
pub mod registrar;
pub mod store;

// Re-export commonly used types
pub use assignment::AssignmentEngine;
pub use cache::{CacheClient, MemoryCache};
pub use catalog::{PermissionCatalog, PermissionRef, RoleRef};
pub use checker::AuthorizationChecker;
pub use config::{AccessConfig, DEFAULT_CACHE_KEY};
pub use error::{AccessError, Result};
pub use graph::PermissionGraph;
pub use registrar::Registrar;
pub use store::{EntityStore, MemoryEntityStore, StoreSnapshot};

// Domain types live in warden-core; surface them here for convenience
pub use warden_core::{HoldsPermissions, Permission, Role, SubjectRef};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

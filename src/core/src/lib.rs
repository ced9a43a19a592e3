//! # Warden Core
//!
//! Shared types and error handling for the warden authorization engine.
//! This package stays dependency-light so application entity types can
//! implement [`HoldsPermissions`] without pulling in the engine itself.

pub mod entity;
pub mod error;
pub mod subject;

// Re-export commonly used types
pub use entity::{Permission, PermissionId, Role, RoleId};
pub use error::{CoreError, Result};
pub use subject::{HoldsPermissions, SubjectRef, ROLE_KIND};

//! Error types for the access engine

use thiserror::Error;

/// Access engine errors
#[derive(Debug, Error)]
pub enum AccessError {
    /// Permission lookup by name missed
    #[error("Permission does not exist: {0}")]
    PermissionDoesNotExist(String),

    /// Role lookup by name or id missed
    #[error("Role does not exist: {0}")]
    RoleDoesNotExist(String),

    /// Permission name already taken
    #[error("Permission already exists: {0}")]
    PermissionAlreadyExists(String),

    /// Role name already taken
    #[error("Role already exists: {0}")]
    RoleAlreadyExists(String),

    /// Subject reference rejected
    #[error(transparent)]
    InvalidSubject(#[from] warden_core::CoreError),

    /// Concurrent replacement the store could not serialize
    #[error("Sync conflict: {0}")]
    SyncConflict(String),

    /// Entity store backend error
    #[error("Store error: {0}")]
    StoreError(String),

    /// Cache backend error
    #[error("Cache error: {0}")]
    CacheError(String),

    /// Graph payload encoding error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for access operations
pub type Result<T> = std::result::Result<T, AccessError>;

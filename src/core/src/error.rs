//! Error types shared by the warden domain crates

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for the warden domain types
#[derive(Debug, Error)]
pub enum CoreError {
    /// Subject reference malformed (empty kind or id, bad `kind:id` form)
    #[error("Invalid subject reference: {0}")]
    InvalidSubject(String),
}

impl CoreError {
    /// Create an invalid subject error
    pub fn invalid_subject<S: Into<String>>(msg: S) -> Self {
        CoreError::InvalidSubject(msg.into())
    }
}

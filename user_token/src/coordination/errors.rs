//! Error types for the coordination layer

use thiserror::Error;

use crate::storage::StorageError;
use crate::userdb::UserError;

/// Errors surfaced by `AuthService` operations that report failures
#[derive(Error, Debug)]
pub enum CoordinationError {
    /// Request rejected before reaching the store
    #[error("Validation error: {0}")]
    Validation(String),

    /// Seeding was requested on a read-only database
    #[error("Database opened in read-only mode")]
    ReadOnly,

    /// Error from the user database operations
    #[error("User error: {0}")]
    UserError(UserError),
}

impl CoordinationError {
    /// Log the error and return self
    pub fn log(self) -> Self {
        match &self {
            Self::Validation(msg) => tracing::warn!("Validation error: {}", msg),
            Self::ReadOnly => tracing::warn!("Rejected write on read-only database"),
            Self::UserError(err) => tracing::error!("User error: {}", err),
        }
        self
    }
}

impl From<UserError> for CoordinationError {
    fn from(err: UserError) -> Self {
        CoordinationError::UserError(err)
    }
}

impl From<StorageError> for CoordinationError {
    fn from(err: StorageError) -> Self {
        CoordinationError::UserError(err.into())
    }
}

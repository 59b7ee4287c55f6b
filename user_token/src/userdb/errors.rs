use thiserror::Error;

use crate::storage::StorageError;

#[derive(Clone, Error, Debug)]
pub enum UserError {
    /// The pool could not provide a connection in time
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Storage error: {0}")]
    Storage(String),

    /// A row violated a table constraint, e.g. a duplicate mail
    #[error("Integrity error: {0}")]
    Integrity(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<StorageError> for UserError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unavailable(msg) => UserError::Unavailable(msg),
            other => UserError::Storage(other.to_string()),
        }
    }
}

impl From<sqlx::Error> for UserError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                UserError::Integrity(db_err.message().to_string())
            }
            sqlx::Error::PoolTimedOut => UserError::Unavailable(err.to_string()),
            _ => UserError::Storage(err.to_string()),
        }
    }
}

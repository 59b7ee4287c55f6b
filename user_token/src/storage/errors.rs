use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum StorageError {
    /// No pooled connection became available within the acquire timeout
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Statement error: {0}")]
    Statement(String),

    #[error("Connection pool is closed")]
    Closed,
}

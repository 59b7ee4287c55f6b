//! Shared helpers for unit tests across the crate

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use crate::config::AuthConfig;
use crate::coordination::AuthService;
use crate::storage::{ConnectionPool, PoolOptions};
use crate::userdb::{CredentialStore, SqliteUserStore};

/// Fresh database location inside a temporary directory
///
/// The directory is removed when the returned `TempDir` is dropped, so keep it
/// alive for as long as the database is in use.
pub fn temp_db_path() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("users.db");
    (dir, path)
}

/// `AuthService` over a small pool on a fresh, schema-initialized database
pub async fn test_service(config: AuthConfig) -> (TempDir, AuthService) {
    let (dir, path) = temp_db_path();
    let pool = ConnectionPool::connect(
        PoolOptions::new(path)
            .size(4)
            .acquire_timeout(Duration::from_secs(5)),
    )
    .await
    .expect("Failed to open pool");

    let store = SqliteUserStore::new(pool).with_batch_size(7);
    store
        .ensure_schema()
        .await
        .expect("Failed to create schema");

    (dir, AuthService::new(Arc::new(store), config))
}

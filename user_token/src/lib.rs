//! user_token - Pooled SQLite credential lookup for the user-token service
//!
//! The crate owns everything below the transport layer: environment
//! configuration, a fixed-size SQLite connection pool with per-connection
//! statement caches, the `user` table store, and the [`AuthService`] that
//! handlers call.

mod config;
mod coordination;
mod storage;
mod userdb;
mod utils;

#[cfg(test)]
mod test_utils;

use std::sync::Arc;

pub use config::{
    AuthConfig, Bypass, Config, ConfigError, DEFAULT_BYPASS_USER_ID, DEFAULT_BYPASS_USERNAME,
    DEFAULT_DB_PATH, DEFAULT_SEED_MAX_COUNT, DEFAULT_SEED_USER_COUNT,
};
pub use coordination::{AuthService, CoordinationError, LoginRequest, LoginResponse, SeedReport};
pub use storage::{
    ConnectionPool, PoolHandle, PoolOptions, PooledConnection, Prepared, Query, SaturationPolicy,
    StorageError, default_pool_size,
};
pub use userdb::{
    CredentialStore, DEFAULT_SEED_BATCH_SIZE, NewUser, SqliteUserStore, UserError, UserId,
};
pub use utils::hash_password;

/// Open the pool, prepare the schema, and build the service
///
/// In read-only mode the schema is left untouched; the database is expected to
/// have been seeded by a writable instance.
pub async fn init(config: Config) -> Result<AuthService, CoordinationError> {
    tracing::info!(
        "Opening {} with {} pooled connections ({:?} on saturation)",
        config.pool.db_path.display(),
        config.pool.size,
        config.pool.saturation
    );

    let pool = ConnectionPool::connect(config.pool).await?;
    let store = SqliteUserStore::new(pool).with_batch_size(config.seed_batch_size);

    if config.auth.read_only {
        tracing::info!("Read-only mode, skipping schema setup");
    } else {
        store.ensure_schema().await?;
    }

    Ok(AuthService::new(Arc::new(store), config.auth))
}

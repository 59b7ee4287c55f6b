use async_trait::async_trait;

use crate::storage::ConnectionPool;
use crate::userdb::{
    errors::UserError,
    types::{NewUser, UserId},
};

use super::sqlite::*;

/// Rows inserted per seed transaction unless configured otherwise
pub const DEFAULT_SEED_BATCH_SIZE: usize = 1000;

/// Persistence operations the auth service needs
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Create the user table and its index if absent, then validate the layout
    async fn ensure_schema(&self) -> Result<(), UserError>;

    /// Id of the user whose mail and digest both match; `None` when either doesn't
    async fn find_by_credentials(
        &self,
        mail: &str,
        hashed_password: &str,
    ) -> Result<Option<UserId>, UserError>;

    /// Delete every user and insert `users`, returning how many were inserted
    async fn bulk_insert(&self, users: &[NewUser]) -> Result<u64, UserError>;

    async fn count_users(&self) -> Result<u64, UserError>;

    /// Cheap round trip through a pooled connection
    async fn ping(&self) -> Result<(), UserError>;

    /// Release whatever the store holds open; later calls may fail
    async fn close(&self) {}
}

/// `CredentialStore` backed by the SQLite connection pool
#[derive(Clone)]
pub struct SqliteUserStore {
    pool: ConnectionPool,
    batch_size: usize,
}

impl SqliteUserStore {
    pub fn new(pool: ConnectionPool) -> Self {
        Self {
            pool,
            batch_size: DEFAULT_SEED_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }
}

#[async_trait]
impl CredentialStore for SqliteUserStore {
    async fn ensure_schema(&self) -> Result<(), UserError> {
        let mut handle = self.pool.acquire().await?;
        create_tables_sqlite(&mut handle).await?;
        validate_user_tables_sqlite(&mut handle).await?;
        tracing::info!("User table ready");
        Ok(())
    }

    async fn find_by_credentials(
        &self,
        mail: &str,
        hashed_password: &str,
    ) -> Result<Option<UserId>, UserError> {
        let mut handle = self.pool.acquire().await?;
        find_by_credentials_sqlite(&mut handle, mail, hashed_password).await
    }

    async fn bulk_insert(&self, users: &[NewUser]) -> Result<u64, UserError> {
        let mut handle = self.pool.acquire().await?;
        let inserted = replace_users_sqlite(&mut handle, users, self.batch_size).await?;
        tracing::info!("Inserted {} users", inserted);
        Ok(inserted)
    }

    async fn count_users(&self) -> Result<u64, UserError> {
        let mut handle = self.pool.acquire().await?;
        count_users_sqlite(&mut handle).await
    }

    async fn ping(&self) -> Result<(), UserError> {
        let mut handle = self.pool.acquire().await?;
        ping_sqlite(&mut handle).await
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

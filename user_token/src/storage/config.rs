//! Connection pool configuration

use std::path::PathBuf;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous};

/// Page cache per connection, in KiB when negative (64 MB)
const SQLITE_CACHE_SIZE: &str = "-64000";
/// Memory-mapped I/O window (256 MB)
const SQLITE_MMAP_SIZE: &str = "268435456";
/// Compiled statements sqlx keeps per connection
const STATEMENT_CACHE_CAPACITY: usize = 32;

/// What `ConnectionPool::acquire` does when every pooled connection is checked out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaturationPolicy {
    /// Wait for a release, up to the acquire timeout
    #[default]
    Wait,
    /// Open a temporary, uncached connection that is closed on release
    Overflow,
}

#[derive(Debug, Clone)]
pub struct PoolOptions {
    pub db_path: PathBuf,
    pub size: usize,
    pub acquire_timeout: Duration,
    pub busy_timeout: Duration,
    pub saturation: SaturationPolicy,
    pub read_only: bool,
}

impl PoolOptions {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            size: default_pool_size(),
            acquire_timeout: Duration::from_millis(5000),
            busy_timeout: Duration::from_millis(5000),
            saturation: SaturationPolicy::Wait,
            read_only: false,
        }
    }

    pub fn size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn saturation(mut self, policy: SaturationPolicy) -> Self {
        self.saturation = policy;
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Build the per-connection SQLite settings
    ///
    /// WAL and relaxed fsync are only requested on writable connections; a read-only
    /// connection cannot change the journal mode and inherits whatever the file uses.
    pub(crate) fn connect_options(&self) -> SqliteConnectOptions {
        let options = SqliteConnectOptions::new()
            .filename(&self.db_path)
            .read_only(self.read_only)
            .create_if_missing(!self.read_only)
            .busy_timeout(self.busy_timeout)
            .statement_cache_capacity(STATEMENT_CACHE_CAPACITY)
            .pragma("temp_store", "MEMORY")
            .pragma("cache_size", SQLITE_CACHE_SIZE)
            .pragma("mmap_size", SQLITE_MMAP_SIZE);

        if self.read_only {
            options
        } else {
            options
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
        }
    }
}

/// Two connections per CPU, capped at 16
pub fn default_pool_size() -> usize {
    (num_cpus::get() * 2).clamp(1, 16)
}

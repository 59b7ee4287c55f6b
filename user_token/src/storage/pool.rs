//! Fixed-size pool of SQLite connections with per-connection prepared statements
//!
//! Each pooled connection carries its own statement cache, so hot-path queries are
//! compiled once per connection and reused for the life of the process. Callers
//! borrow a connection through a [`PoolHandle`] guard which returns it to the idle
//! set when dropped, on every exit path.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use sqlx::query::Query as SqlxQuery;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqliteConnection, SqliteStatement};
use sqlx::{ConnectOptions, Connection, Executor, Sqlite, Statement};
use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};

use super::config::{PoolOptions, SaturationPolicy};
use super::errors::StorageError;

/// The queries the service runs on its hot paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Query {
    FindByMail,
    InsertUser,
    DeleteAllUsers,
    CountUsers,
    Ping,
}

impl Query {
    pub const fn sql(self) -> &'static str {
        match self {
            Self::FindByMail => "SELECT id, hashed_password FROM user WHERE mail = ?1 LIMIT 1",
            Self::InsertUser => "INSERT INTO user (mail, hashed_password) VALUES (?1, ?2)",
            Self::DeleteAllUsers => "DELETE FROM user",
            Self::CountUsers => "SELECT COUNT(*) FROM user",
            Self::Ping => "SELECT 1",
        }
    }
}

pub(crate) type SqliteQuery<'q> = SqlxQuery<'q, Sqlite, SqliteArguments<'q>>;

/// A statement ready to bind and execute on the connection it came from
#[derive(Debug, Clone)]
pub struct Prepared {
    kind: Query,
    statement: Option<SqliteStatement<'static>>,
}

impl Prepared {
    pub fn kind(&self) -> Query {
        self.kind
    }

    /// Whether this statement came from the connection's cache
    pub fn is_cached(&self) -> bool {
        self.statement.is_some()
    }

    pub(crate) fn query(&self) -> SqliteQuery<'_> {
        match &self.statement {
            Some(statement) => statement.query(),
            // temporary connections never keep compiled statements around
            None => sqlx::query(self.kind.sql()).persistent(false),
        }
    }
}

/// One open connection and the statements compiled on it
pub struct PooledConnection {
    id: u64,
    temporary: bool,
    conn: SqliteConnection,
    statements: HashMap<Query, SqliteStatement<'static>>,
}

impl PooledConnection {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_temporary(&self) -> bool {
        self.temporary
    }

    /// Number of statements compiled and cached on this connection
    pub fn cached_statements(&self) -> usize {
        self.statements.len()
    }

    /// Return the compiled statement for `query`, preparing it on first use
    pub async fn prepared(&mut self, query: Query) -> Result<Prepared, StorageError> {
        if self.temporary {
            return Ok(Prepared {
                kind: query,
                statement: None,
            });
        }

        if let Some(statement) = self.statements.get(&query) {
            return Ok(Prepared {
                kind: query,
                statement: Some(statement.clone()),
            });
        }

        let statement = (&mut self.conn)
            .prepare(query.sql())
            .await
            .map_err(|e| StorageError::Statement(e.to_string()))?;
        tracing::trace!("Prepared {:?} on connection {}", query, self.id);
        self.statements.insert(query, statement.clone());

        Ok(Prepared {
            kind: query,
            statement: Some(statement),
        })
    }

    pub(crate) fn connection(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }
}

struct PoolInner {
    options: SqliteConnectOptions,
    capacity: usize,
    acquire_timeout: Duration,
    saturation: SaturationPolicy,
    idle: Mutex<Vec<PooledConnection>>,
    permits: Arc<Semaphore>,
    next_id: AtomicU64,
}

impl PoolInner {
    fn idle(&self) -> std::sync::MutexGuard<'_, Vec<PooledConnection>> {
        // The idle list holds no invariants a panicking holder could break halfway.
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn open(&self, temporary: bool) -> Result<PooledConnection, StorageError> {
        let conn = self
            .options
            .connect()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("Opened connection {} (temporary: {})", id, temporary);

        Ok(PooledConnection {
            id,
            temporary,
            conn,
            statements: HashMap::new(),
        })
    }
}

/// Cheaply cloneable handle to a shared connection pool
#[derive(Clone)]
pub struct ConnectionPool {
    inner: Arc<PoolInner>,
}

impl ConnectionPool {
    /// Open `options.size` connections up front
    pub async fn connect(options: PoolOptions) -> Result<Self, StorageError> {
        let capacity = options.size.max(1);
        let inner = Arc::new(PoolInner {
            options: options.connect_options(),
            capacity,
            acquire_timeout: options.acquire_timeout,
            saturation: options.saturation,
            idle: Mutex::new(Vec::with_capacity(capacity)),
            permits: Arc::new(Semaphore::new(capacity)),
            next_id: AtomicU64::new(1),
        });

        let mut opened = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            opened.push(inner.open(false).await?);
        }
        inner.idle().extend(opened);

        tracing::info!(
            "Connection pool ready: {} connections to {}",
            capacity,
            options.db_path.display()
        );

        Ok(Self { inner })
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Pooled connections not currently checked out
    pub fn available(&self) -> usize {
        self.inner.permits.available_permits()
    }

    /// Open connections sitting in the idle set
    ///
    /// Can be lower than `available()` after a handle was discarded; the slot is
    /// reopened on the next acquire.
    pub fn idle_count(&self) -> usize {
        self.inner.idle().len()
    }

    pub fn saturation(&self) -> SaturationPolicy {
        self.inner.saturation
    }

    /// Borrow a connection for one logical operation
    pub async fn acquire(&self) -> Result<PoolHandle, StorageError> {
        let permit = match self.inner.saturation {
            SaturationPolicy::Wait => self.wait_for_permit().await?,
            SaturationPolicy::Overflow => match self.inner.permits.clone().try_acquire_owned() {
                Ok(permit) => permit,
                Err(TryAcquireError::NoPermits) => return self.acquire_temporary().await,
                Err(TryAcquireError::Closed) => return Err(StorageError::Closed),
            },
        };

        let pooled = self.inner.idle().pop();
        let conn = match pooled {
            Some(conn) => conn,
            // A previous holder discarded this slot's connection
            None => self.inner.open(false).await?,
        };
        tracing::trace!("Acquired connection {}", conn.id);

        Ok(PoolHandle {
            conn: Some(conn),
            permit: Some(permit),
            pool: Arc::clone(&self.inner),
        })
    }

    /// Explicit form of dropping the handle
    pub fn release(&self, handle: PoolHandle) {
        handle.release();
    }

    /// Close every idle connection and refuse further acquires
    pub async fn close(&self) {
        self.inner.permits.close();
        let idle: Vec<PooledConnection> = self.inner.idle().drain(..).collect();
        for pooled in idle {
            let id = pooled.id;
            if let Err(e) = pooled.conn.close().await {
                tracing::warn!("Failed to close connection {}: {}", id, e);
            }
        }
        tracing::info!("Connection pool closed");
    }

    async fn wait_for_permit(&self) -> Result<OwnedSemaphorePermit, StorageError> {
        let acquire = self.inner.permits.clone().acquire_owned();
        match tokio::time::timeout(self.inner.acquire_timeout, acquire).await {
            Ok(Ok(permit)) => Ok(permit),
            Ok(Err(_)) => Err(StorageError::Closed),
            Err(_) => {
                tracing::warn!(
                    "No pooled connection available within {:?}",
                    self.inner.acquire_timeout
                );
                Err(StorageError::Unavailable(format!(
                    "no connection available within {}ms",
                    self.inner.acquire_timeout.as_millis()
                )))
            }
        }
    }

    async fn acquire_temporary(&self) -> Result<PoolHandle, StorageError> {
        if self.inner.permits.is_closed() {
            return Err(StorageError::Closed);
        }
        let conn = self.inner.open(true).await?;
        tracing::debug!("Pool saturated, using temporary connection {}", conn.id);

        Ok(PoolHandle {
            conn: Some(conn),
            permit: None,
            pool: Arc::clone(&self.inner),
        })
    }
}

/// Guard for a borrowed connection
///
/// Dropping the guard puts the connection back into the idle set before the pool
/// permit is released, so the next waiter always finds it there. Temporary
/// connections are closed instead.
pub struct PoolHandle {
    conn: Option<PooledConnection>,
    permit: Option<OwnedSemaphorePermit>,
    pool: Arc<PoolInner>,
}

impl PoolHandle {
    pub fn release(self) {
        drop(self);
    }

    /// Drop the underlying connection instead of returning it to the pool
    ///
    /// The slot stays usable: the next acquire that finds no idle connection opens a
    /// fresh one.
    pub fn discard(mut self) {
        if let Some(conn) = self.conn.take() {
            tracing::debug!("Discarding connection {}", conn.id);
        }
    }
}

impl Deref for PoolHandle {
    type Target = PooledConnection;

    fn deref(&self) -> &PooledConnection {
        self.conn.as_ref().expect("pool handle holds a connection until dropped")
    }
}

impl DerefMut for PoolHandle {
    fn deref_mut(&mut self) -> &mut PooledConnection {
        self.conn.as_mut().expect("pool handle holds a connection until dropped")
    }
}

impl Drop for PoolHandle {
    fn drop(&mut self) {
        let Some(conn) = self.conn.take() else {
            return;
        };

        if conn.temporary || self.permit.is_none() {
            tracing::trace!("Closing temporary connection {}", conn.id);
            return;
        }
        if self.pool.permits.is_closed() {
            return;
        }

        tracing::trace!("Released connection {}", conn.id);
        self.pool.idle().push(conn);
        // `permit` is dropped after this body runs, which frees the slot.
    }
}

mod config;
mod errors;
mod pool;
mod schema_validation;

pub use config::{PoolOptions, SaturationPolicy, default_pool_size};
pub use errors::StorageError;
pub use pool::{ConnectionPool, PoolHandle, PooledConnection, Prepared, Query};

pub(crate) use schema_validation::validate_sqlite_table_schema;

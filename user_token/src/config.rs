//! Central configuration for the user_token crate
//!
//! Everything is read from the process environment once at startup.
//! [`Config::from_lookup`] takes any key lookup so the parsing rules can be tested
//! without touching the real environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::storage::{PoolOptions, SaturationPolicy, default_pool_size};
use crate::userdb::{DEFAULT_SEED_BATCH_SIZE, UserId};

pub const DEFAULT_DB_PATH: &str = "users.db";
pub const DEFAULT_SEED_USER_COUNT: usize = 10000;
pub const DEFAULT_SEED_MAX_COUNT: usize = 1_000_000;
pub const DEFAULT_BYPASS_USERNAME: &str = "no_db";
pub const DEFAULT_BYPASS_USER_ID: UserId = 1;

const DEFAULT_ACQUIRE_TIMEOUT_MS: u64 = 5000;
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

/// Username that skips the database entirely, for load tests that measure the
/// HTTP stack alone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bypass {
    pub username: String,
    pub user_id: UserId,
}

/// Request-level policy for the auth service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub read_only: bool,
    pub default_seed_count: usize,
    /// Largest count a single seed accepts
    pub max_seed_count: usize,
    pub bypass: Option<Bypass>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            read_only: false,
            default_seed_count: DEFAULT_SEED_USER_COUNT,
            max_seed_count: DEFAULT_SEED_MAX_COUNT,
            bypass: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub pool: PoolOptions,
    pub seed_batch_size: usize,
    pub auth: AuthConfig,
}

impl Config {
    /// Configuration with defaults for everything but the database location
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            pool: PoolOptions::new(db_path),
            seed_batch_size: DEFAULT_SEED_BATCH_SIZE,
            auth: AuthConfig::default(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let db_path = lookup("DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let read_only =
            parse_bool(&lookup, "READ_ONLY_DB")?.unwrap_or(false)
                || parse_bool(&lookup, "READ_ONLY")?.unwrap_or(false);

        let saturation = if parse_bool(&lookup, "POOL_OVERFLOW")?.unwrap_or(false) {
            SaturationPolicy::Overflow
        } else {
            SaturationPolicy::Wait
        };

        let pool = PoolOptions::new(db_path)
            .size(parse_positive(&lookup, "POOL_SIZE")?.unwrap_or_else(default_pool_size))
            .acquire_timeout(Duration::from_millis(
                parse::<u64>(&lookup, "POOL_ACQUIRE_TIMEOUT_MS")?
                    .unwrap_or(DEFAULT_ACQUIRE_TIMEOUT_MS),
            ))
            .busy_timeout(Duration::from_millis(
                parse::<u64>(&lookup, "DB_BUSY_TIMEOUT_MS")?.unwrap_or(DEFAULT_BUSY_TIMEOUT_MS),
            ))
            .saturation(saturation)
            .read_only(read_only);

        let bypass = if parse_bool(&lookup, "AUTH_BYPASS_ENABLED")?.unwrap_or(false) {
            Some(Bypass {
                username: lookup("AUTH_BYPASS_USERNAME")
                    .unwrap_or_else(|| DEFAULT_BYPASS_USERNAME.to_string()),
                user_id: parse(&lookup, "AUTH_BYPASS_USER_ID")?.unwrap_or(DEFAULT_BYPASS_USER_ID),
            })
        } else {
            None
        };

        let max_seed_count =
            parse_positive(&lookup, "SEED_MAX_COUNT")?.unwrap_or(DEFAULT_SEED_MAX_COUNT);
        let default_seed_count =
            parse_positive(&lookup, "SEED_USER_COUNT")?.unwrap_or(DEFAULT_SEED_USER_COUNT);
        if default_seed_count > max_seed_count {
            return Err(invalid("SEED_USER_COUNT", &default_seed_count.to_string()));
        }

        Ok(Self {
            pool,
            seed_batch_size: parse_positive(&lookup, "SEED_BATCH_SIZE")?
                .unwrap_or(DEFAULT_SEED_BATCH_SIZE),
            auth: AuthConfig {
                read_only,
                default_seed_count,
                max_seed_count,
                bypass,
            },
        })
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| invalid(key, &value)),
    }
}

fn parse_positive(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<usize>, ConfigError> {
    match parse::<usize>(lookup, key)? {
        Some(0) => Err(invalid(key, "0")),
        other => Ok(other),
    }
}

fn parse_bool(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<bool>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(Some(true)),
            "false" | "0" | "no" | "" => Ok(Some(false)),
            _ => Err(invalid(key, &value)),
        },
    }
}

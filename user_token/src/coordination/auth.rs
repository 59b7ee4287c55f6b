use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;

use crate::config::AuthConfig;
use crate::userdb::{CredentialStore, NewUser};
use crate::utils::hash_password;

use super::errors::CoordinationError;
use super::types::{
    AUTHENTICATION_FAILED, INVALID_CREDENTIALS, LoginRequest, LoginResponse,
    MISSING_CREDENTIALS, SeedReport,
};

/// Authentication and seeding over a credential store
///
/// Built once at startup and cloned into every request handler; clones share the
/// store and the seed lock.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    config: Arc<AuthConfig>,
    seed_lock: Arc<Mutex<()>>,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, config: AuthConfig) -> Self {
        if let Some(bypass) = &config.bypass {
            tracing::warn!(
                "Authentication bypass enabled for username '{}'",
                bypass.username
            );
        }

        Self {
            store,
            config: Arc::new(config),
            seed_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.config.read_only
    }

    pub fn default_seed_count(&self) -> usize {
        self.config.default_seed_count
    }

    pub fn max_seed_count(&self) -> usize {
        self.config.max_seed_count
    }

    /// Check a username and pre-hashed password
    ///
    /// Never fails: store errors are logged and reported as an unsuccessful
    /// response, indistinguishable in shape from a wrong password.
    pub async fn authenticate(&self, request: &LoginRequest) -> LoginResponse {
        let username = request.username.as_str();
        let hashed_password = request.hashed_password.as_str();

        // Blank-only input counts as missing, but lookups use the exact strings
        if username.trim().is_empty() || hashed_password.trim().is_empty() {
            tracing::debug!("Rejected login with missing credentials");
            return LoginResponse::rejected(MISSING_CREDENTIALS);
        }

        if let Some(bypass) = &self.config.bypass {
            if username == bypass.username {
                tracing::trace!("Bypass login for '{}'", username);
                return LoginResponse::authenticated(bypass.user_id);
            }
        }

        match self
            .store
            .find_by_credentials(username, hashed_password)
            .await
        {
            Ok(Some(user_id)) => {
                tracing::trace!("Authenticated '{}' as {}", username, user_id);
                LoginResponse::authenticated(user_id)
            }
            Ok(None) => {
                tracing::debug!("Invalid credentials for '{}'", username);
                LoginResponse::rejected(INVALID_CREDENTIALS)
            }
            Err(e) => {
                tracing::error!("Error during user authentication: {}", e);
                LoginResponse::rejected(AUTHENTICATION_FAILED)
            }
        }
    }

    /// Replace the user table with `count` synthetic users
    ///
    /// User `i` gets mail `user{i}@example.com` and the SHA-256 hex digest of
    /// `password{i}`. Seeds are serialized; a second call waits for the first.
    /// Counts above the configured maximum are rejected before anything is built.
    pub async fn seed(&self, count: usize) -> Result<SeedReport, CoordinationError> {
        if self.config.read_only {
            return Err(CoordinationError::ReadOnly.log());
        }
        if count > self.config.max_seed_count {
            return Err(CoordinationError::Validation(format!(
                "count {} exceeds the maximum of {}",
                count, self.config.max_seed_count
            ))
            .log());
        }

        let _guard = self.seed_lock.lock().await;
        let started = Instant::now();

        let users = synthetic_users(count);
        let inserted = self
            .store
            .bulk_insert(&users)
            .await
            .map_err(|e| CoordinationError::from(e).log())?;

        let report = SeedReport {
            inserted,
            elapsed: started.elapsed(),
        };
        tracing::info!("{}", report);
        Ok(report)
    }

    /// Succeeds when a pooled connection can run a trivial query
    pub async fn readiness(&self) -> Result<(), CoordinationError> {
        self.store.ping().await.map_err(CoordinationError::from)
    }

    pub async fn count_users(&self) -> Result<u64, CoordinationError> {
        self.store.count_users().await.map_err(CoordinationError::from)
    }

    /// Close the underlying store; every clone of this service is affected
    pub async fn shutdown(&self) {
        self.store.close().await;
    }
}

pub(crate) fn synthetic_users(count: usize) -> Vec<NewUser> {
    (1..=count)
        .map(|i| {
            NewUser::new(
                format!("user{i}@example.com"),
                hash_password(&format!("password{i}")),
            )
        })
        .collect()
}

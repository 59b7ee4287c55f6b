use std::path::PathBuf;
use std::time::Duration;

use tempfile::TempDir;
use user_token::{AuthConfig, AuthService, Config, SaturationPolicy};

/// A SQLite file in its own temporary directory
///
/// The directory and everything in it is removed when this is dropped.
pub struct TestDatabase {
    _dir: TempDir,
    pub path: PathBuf,
}

impl TestDatabase {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("users.db");
        Ok(Self { _dir: dir, path })
    }

    /// Configuration with a pool of `size` and short timeouts
    pub fn config(&self, size: usize) -> Config {
        let mut config = Config::new(&self.path);
        config.pool = config
            .pool
            .size(size)
            .acquire_timeout(Duration::from_secs(10))
            .saturation(SaturationPolicy::Wait);
        config.seed_batch_size = 250;
        config
    }

    pub async fn service(&self, size: usize) -> Result<AuthService, Box<dyn std::error::Error>> {
        Ok(user_token::init(self.config(size)).await?)
    }

    pub async fn service_with(
        &self,
        size: usize,
        auth: AuthConfig,
    ) -> Result<AuthService, Box<dyn std::error::Error>> {
        let mut config = self.config(size);
        config.auth = auth;
        Ok(user_token::init(config).await?)
    }
}

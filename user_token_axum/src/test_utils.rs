use axum::Router;
use axum::body::{Body, to_bytes};
use axum::response::Response;
use tempfile::TempDir;
use user_token::{AuthService, Config};

use crate::router::user_token_router_no_trace;

/// A service over a fresh database in a temporary directory
pub(crate) struct TestApp {
    _dir: TempDir,
    pub service: AuthService,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_default_seed_count(count: usize) -> Self {
        Self::with_config(|config| config.auth.default_seed_count = count).await
    }

    /// Service that refuses writes; the file itself stays writable so no seeded
    /// database is needed
    pub async fn read_only() -> Self {
        Self::with_config(|config| config.auth.read_only = true).await
    }

    async fn with_config(adjust: impl FnOnce(&mut Config)) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut config = Config::new(dir.path().join("users.db"));
        config.pool = config.pool.size(2);
        adjust(&mut config);

        let service = user_token::init(config)
            .await
            .expect("Failed to initialize service");
        Self { _dir: dir, service }
    }

    pub fn router(&self) -> Router {
        user_token_router_no_trace(self.service.clone())
    }
}

pub(crate) async fn read_body(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}

pub(crate) async fn read_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&read_body(response).await).expect("Body is not JSON")
}

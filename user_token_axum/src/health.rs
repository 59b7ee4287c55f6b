use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use serde_json::json;
use user_token::AuthService;

pub(super) fn router() -> Router<AuthService> {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
}

async fn health() -> &'static str {
    "UserTokenApi Rust server is running"
}

/// Reports whether a pooled connection can reach the database
///
/// Always answers 200 so load balancers can read the body; the status field says
/// whether the service is usable.
async fn ready(State(service): State<AuthService>) -> impl IntoResponse {
    match service.readiness().await {
        Ok(()) => Json(json!({ "status": "ready" })),
        Err(e) => {
            tracing::warn!("Readiness check failed: {}", e);
            Json(json!({ "status": "degraded", "error": e.to_string() }))
        }
    }
}

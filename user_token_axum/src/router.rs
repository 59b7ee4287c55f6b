//! Combined router for the service endpoints

use axum::Router;
use tower_http::LatencyUnit;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use user_token::AuthService;

/// Create the router for every endpoint, with HTTP request tracing
///
/// The endpoints will be available at:
/// - /health and /ready
/// - /api/auth/get-user-token
/// - /api/auth/create-db
pub fn user_token_router(service: AuthService) -> Router {
    user_token_router_no_trace(service).layer(
        TraceLayer::new_for_http()
            .make_span_with(
                DefaultMakeSpan::new()
                    .level(Level::INFO)
                    .include_headers(true),
            )
            .on_request(DefaultOnRequest::new().level(Level::DEBUG))
            .on_response(
                DefaultOnResponse::new()
                    .level(Level::INFO)
                    .latency_unit(LatencyUnit::Millis),
            ),
    )
}

/// Same as `user_token_router()` but without the HTTP tracing middleware
///
/// Use this when the application installs its own tracing layer, or to keep
/// per-request overhead minimal under benchmarks.
pub fn user_token_router_no_trace(service: AuthService) -> Router {
    Router::new()
        .merge(super::health::router())
        .nest("/api/auth", super::auth::router())
        .layer(CorsLayer::permissive())
        .with_state(service)
}

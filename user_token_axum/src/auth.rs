use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use user_token::{AuthService, LoginRequest, LoginResponse};

use crate::error::IntoResponseError;

/// Create a router for the authentication endpoints
pub(super) fn router() -> Router<AuthService> {
    Router::new()
        .route("/get-user-token", post(get_user_token))
        .route("/create-db", get(create_db))
}

/// Authenticate a username and pre-hashed password
///
/// Always answers 200 with a `LoginResponse`. A body that is missing or not
/// valid JSON is treated as a request with no credentials.
async fn get_user_token(
    State(service): State<AuthService>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Json<LoginResponse> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!("Unreadable login body: {}", rejection);
            LoginRequest::default()
        }
    };

    Json(service.authenticate(&request).await)
}

#[derive(Deserialize)]
struct SeedQuery {
    count: Option<usize>,
}

/// Replace the user table with `count` generated users
async fn create_db(
    State(service): State<AuthService>,
    Query(params): Query<SeedQuery>,
) -> Result<String, (StatusCode, String)> {
    let count = params
        .count
        .unwrap_or_else(|| service.default_seed_count());
    tracing::info!("Seeding {} users", count);

    let report = service.seed(count).await.into_response_error()?;
    Ok(report.to_string())
}

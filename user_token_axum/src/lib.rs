//! user_token_axum - HTTP surface for the user-token service
//!
//! Mount [`user_token_router`] with an [`AuthService`] built by [`init`]:
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let service = user_token_axum::init(user_token_axum::Config::from_env()?).await?;
//! let app = user_token_axum::user_token_router(service);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

mod auth;
mod error;
mod health;
mod router;

#[cfg(test)]
mod test_utils;

pub use error::IntoResponseError;
pub use router::{user_token_router, user_token_router_no_trace};

pub use user_token::{AuthService, Config, init};

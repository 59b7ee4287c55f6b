//! Authentication coordination
//!
//! `AuthService` sits between the transport layer and the credential store: it
//! validates requests, applies the configured bypass, and turns store results into
//! the response shapes clients see.

mod auth;
mod errors;
mod types;

pub use auth::AuthService;
pub use errors::CoordinationError;
pub use types::{LoginRequest, LoginResponse, SeedReport};

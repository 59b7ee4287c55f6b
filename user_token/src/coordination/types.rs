use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::userdb::UserId;

pub(super) const MISSING_CREDENTIALS: &str = "Username and hashed password are required";
pub(super) const INVALID_CREDENTIALS: &str = "Invalid username or password";
pub(super) const AUTHENTICATION_FAILED: &str = "An error occurred during authentication";

/// Credentials as sent by clients
///
/// Missing fields deserialize to empty strings so they fail validation instead of
/// failing extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default, alias = "UserName", alias = "userName")]
    pub username: String,
    #[serde(default, alias = "HashedPassword")]
    pub hashed_password: String,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, hashed_password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            hashed_password: hashed_password.into(),
        }
    }
}

/// Outcome of an authentication attempt, always delivered with a success status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<Cow<'static, str>>,
}

impl LoginResponse {
    pub fn authenticated(user_id: UserId) -> Self {
        Self {
            success: true,
            user_id: Some(user_id),
            error_message: None,
        }
    }

    pub fn rejected(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            success: false,
            user_id: None,
            error_message: Some(message.into()),
        }
    }
}

/// Result of a completed seed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub inserted: u64,
    pub elapsed: Duration,
}

impl fmt::Display for SeedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Successfully created {} users in {:.2}ms",
            self.inserted,
            self.elapsed.as_secs_f64() * 1000.0
        )
    }
}

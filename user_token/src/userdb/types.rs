use serde::{Deserialize, Serialize};

/// Row id of a user record
pub type UserId = i64;

/// A user row to be inserted; the id is assigned by the database
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewUser {
    /// Login name, unique across the table
    pub mail: String,
    /// Hex digest supplied by the caller
    pub hashed_password: String,
}

impl NewUser {
    pub fn new(mail: impl Into<String>, hashed_password: impl Into<String>) -> Self {
        Self {
            mail: mail.into(),
            hashed_password: hashed_password.into(),
        }
    }
}

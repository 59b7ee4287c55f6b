use user_token::{LoginRequest, UserId, hash_password};

/// Credentials matching the users generated by `AuthService::seed`
pub struct TestUsers;

impl TestUsers {
    pub fn mail(i: usize) -> String {
        format!("user{i}@example.com")
    }

    pub fn password_hash(i: usize) -> String {
        hash_password(&format!("password{i}"))
    }

    /// Login request for seeded user `i`
    pub fn login(i: usize) -> LoginRequest {
        LoginRequest::new(Self::mail(i), Self::password_hash(i))
    }

    /// Login request for seeded user `i` with another user's password
    pub fn login_with_wrong_password(i: usize) -> LoginRequest {
        LoginRequest::new(Self::mail(i), Self::password_hash(i + 1))
    }

    /// Id assigned to user `i` by the first seed of a fresh database
    pub fn fresh_id(i: usize) -> UserId {
        i as UserId
    }
}

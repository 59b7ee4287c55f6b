use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Lower-case hex SHA-256 of `password`, the digest format clients send
pub fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    format!("{digest:x}")
}

/// Compare two hex digests without an early exit on the first differing byte
///
/// Hex is case-insensitive, so both sides are lower-cased first. Only the lengths
/// are compared in variable time.
pub(crate) fn digests_match(stored: &str, supplied: &str) -> bool {
    let stored = stored.to_ascii_lowercase();
    let supplied = supplied.to_ascii_lowercase();
    stored.as_bytes().ct_eq(supplied.as_bytes()).into()
}

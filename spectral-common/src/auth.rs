//! Identifiers, password hashing and session tokens
//!
//! Pure functions only; the database side lives in `db::users` and
//! `db::auth_sessions`.

use crate::{Error, Result};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use data_encoding::BASE32_NOPAD;
use rand::RngCore;
use tracing::warn;

/// Entropy of row ids, in bytes (16 base32 characters)
pub const ID_ENTROPY_BYTES: usize = 10;

/// Entropy of session tokens, in bytes (32 base32 characters)
pub const SESSION_TOKEN_ENTROPY_BYTES: usize = 20;

/// Random lowercase base32 id carrying `entropy_bytes` bytes of entropy
pub fn generate_id_from_entropy(entropy_bytes: usize) -> String {
    let mut bytes = vec![0u8; entropy_bytes];
    rand::thread_rng().fill_bytes(&mut bytes);
    BASE32_NOPAD.encode(&bytes).to_ascii_lowercase()
}

/// Random id for users, sessions and files
pub fn generate_id() -> String {
    generate_id_from_entropy(ID_ENTROPY_BYTES)
}

/// Random token identifying a login session
pub fn generate_session_token() -> String {
    generate_id_from_entropy(SESSION_TOKEN_ENTROPY_BYTES)
}

/// Hash a password with Argon2id (m=19456 KiB, t=2, p=1) and a fresh salt.
///
/// Returns a PHC string carrying the parameters and salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Internal(format!("Password hashing failed: {}", e)))
}

/// Check a password against a stored PHC string
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Stored password hash is not a valid PHC string: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_lengths() {
        let id = generate_id();
        assert_eq!(id.len(), 16);
        assert!(id
            .bytes()
            .all(|b| b.is_ascii_lowercase() || (b'2'..=b'7').contains(&b)));
        assert_eq!(generate_session_token().len(), 32);
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(generate_id(), generate_id());
    }

    #[test]
    fn test_password_round_trip() {
        let hash = hash_password("correct horse").unwrap();

        assert!(hash.starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("correct horse!", &hash));
    }

    #[test]
    fn test_hash_is_salted() {
        let first = hash_password("pw").unwrap();
        let second = hash_password("pw").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("pw", &first));
        assert!(verify_password("pw", &second));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!verify_password("pw", ""));
        assert!(!verify_password("pw", "5e884898da28047151d0e56f8dc62927"));
    }
}

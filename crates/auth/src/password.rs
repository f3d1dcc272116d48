//! Salted, slow password hashing (Argon2, PHC strings).

use std::sync::LazyLock;

use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use thiserror::Error;

use clientdesk_core::DomainError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("salt generation failed: {0}")]
    Salt(String),

    #[error("password hashing failed: {0}")]
    Hash(String),
}

impl From<PasswordError> for DomainError {
    fn from(value: PasswordError) -> Self {
        DomainError::internal(value.to_string())
    }
}

/// Hash `password` with a fresh 16-byte salt.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| PasswordError::Salt(e.to_string()))?;
    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|e| PasswordError::Salt(e.to_string()))?;
    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?
        .to_string();
    Ok(phc)
}

/// Check `password` against a stored PHC string. Unparsable hashes never match.
pub fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("clientdesk-unknown-account").ok());

/// Spend one verification on a fixed hash.
///
/// Called when the account does not exist so that the failure costs the same
/// as a wrong password.
pub fn verify_against_dummy(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(hash, password);
    }
}

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use clientdesk_core::{DomainError, UserId};

use crate::{Role, User};

/// Access token claims.
///
/// `role` is informational only: authorization always re-reads the current
/// user record, so a role changed after issuance takes effect immediately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: user id.
    pub sub: i64,

    pub username: String,

    pub role: Role,

    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,

    /// Expiration, seconds since the Unix epoch.
    pub exp: i64,
}

impl TokenClaims {
    pub fn for_user(
        user: &User,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, TokenError> {
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or_else(|| TokenError::Encoding("token expiry out of range".to_string()))?;
        Ok(Self {
            sub: user.id.as_i64(),
            username: user.username.clone(),
            role: user.role,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        })
    }

    pub fn subject(&self) -> UserId {
        UserId::from_i64(self.sub)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error("token rejected: {0}")]
    Rejected(String),

    #[error("token encoding failed: {0}")]
    Encoding(String),
}

impl From<TokenError> for DomainError {
    fn from(value: TokenError) -> Self {
        match value {
            TokenError::Encoding(msg) => DomainError::internal(msg),
            _ => DomainError::unauthenticated("invalid token"),
        }
    }
}

/// Deterministically validate the claim time window.
///
/// Note: this validates the *claims* only; signature verification happens in
/// the codec before this is called.
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), TokenError> {
    if claims.exp <= claims.iat {
        return Err(TokenError::InvalidTimeWindow);
    }
    let now = now.timestamp();
    if now < claims.iat {
        return Err(TokenError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenError::Expired);
    }
    Ok(())
}

//! HS256 token codec.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::claims::{validate_claims, TokenClaims, TokenError};

/// Signs claims into a bearer token.
pub trait JwtIssuer: Send + Sync {
    fn issue(&self, claims: &TokenClaims) -> Result<String, TokenError>;
}

/// Verifies a bearer token's signature and time window.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError>;
}

/// Shared-secret HS256 codec.
#[derive(Clone)]
pub struct Hs256Jwt {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl Hs256Jwt {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked by `validate_claims` against the caller's clock.
        validation.validate_exp = false;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl JwtIssuer for Hs256Jwt {
    fn issue(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }
}

impl JwtValidator for Hs256Jwt {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| TokenError::Rejected(e.to_string()))?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

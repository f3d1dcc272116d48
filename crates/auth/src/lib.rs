//! `clientdesk-auth`: credential verification and access policy.
//!
//! This crate is intentionally decoupled from HTTP and storage: user lookups
//! go through the [`UserDirectory`] seam.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod password;
pub mod principal;
pub mod roles;
pub mod user;
pub mod verifier;

pub use authorize::{authorize, Action, AuthzError};
pub use claims::{validate_claims, TokenClaims, TokenError};
pub use jwt::{Hs256Jwt, JwtIssuer, JwtValidator};
pub use password::{hash_password, verify_password, PasswordError};
pub use principal::Identity;
pub use roles::Role;
pub use user::{NewUser, NewUserRecord, User, UserPatch};
pub use verifier::{AccessToken, CredentialVerifier, UserDirectory};

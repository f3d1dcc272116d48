//! User accounts.
//!
//! Passwords only ever exist here as plaintext inside [`NewUser`] and
//! [`UserPatch`] (incoming payloads); stored records carry the hash.

use clientdesk_core::{DomainResult, FieldChecks, UserId};

use crate::Role;

pub const USERNAME_LEN: (usize, usize) = (3, 30);
pub const PASSWORD_MIN_LEN: usize = 6;

// ─────────────────────────────────────────────────────────────────────────────
// Stored record
// ─────────────────────────────────────────────────────────────────────────────

/// A stored user account.
///
/// # Invariants
/// - `email` is globally unique and is the lookup key; it is never changed in place.
/// - `password_hash` is a PHC string, never plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// A user ready to be inserted (password already hashed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRecord {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

impl NewUserRecord {
    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            role: self.role,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Incoming payloads
// ─────────────────────────────────────────────────────────────────────────────

/// Registration payload.
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl NewUser {
    pub fn validate(&self) -> DomainResult<()> {
        let mut checks = FieldChecks::new();
        checks
            .length("username", &self.username, USERNAME_LEN.0, USERNAME_LEN.1)
            .min_length("password", &self.password, PASSWORD_MIN_LEN)
            .email("email", &self.email);
        checks.finish()
    }
}

impl core::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

/// Partial update of username, password and/or role.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

impl UserPatch {
    pub fn validate(&self) -> DomainResult<()> {
        let mut checks = FieldChecks::new();
        if let Some(username) = &self.username {
            checks.length("username", username, USERNAME_LEN.0, USERNAME_LEN.1);
        }
        if let Some(password) = &self.password {
            checks.min_length("password", password, PASSWORD_MIN_LEN);
        }
        checks.finish()
    }

    pub fn changes_role(&self) -> bool {
        self.role.is_some()
    }
}

impl core::fmt::Debug for UserPatch {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UserPatch")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("role", &self.role)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clientdesk_core::DomainError;

    fn alice() -> NewUser {
        NewUser {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "s3cret!".to_string(),
            role: Role::User,
        }
    }

    #[test]
    fn valid_user_passes() {
        assert!(alice().validate().is_ok());
    }

    #[test]
    fn short_password_and_bad_email_rejected() {
        let mut u = alice();
        u.password = "12345".to_string();
        u.email = "alice".to_string();

        let Err(DomainError::Validation(errors)) = u.validate() else {
            panic!("expected validation error");
        };
        assert!(errors.has_field("password"));
        assert!(errors.has_field("email"));
        assert!(!errors.has_field("username"));
    }

    #[test]
    fn username_bounds() {
        let mut u = alice();
        u.username = "ab".to_string();
        assert!(u.validate().is_err());
        u.username = "a".repeat(31);
        assert!(u.validate().is_err());
        u.username = "a".repeat(30);
        assert!(u.validate().is_ok());
    }

    #[test]
    fn debug_never_prints_password() {
        let rendered = format!("{:?}", alice());
        assert!(!rendered.contains("s3cret!"));

        let patch = UserPatch {
            password: Some("hunter22".to_string()),
            ..Default::default()
        };
        assert!(!format!("{patch:?}").contains("hunter22"));
    }

    #[test]
    fn empty_patch_is_valid() {
        assert!(UserPatch::default().validate().is_ok());
        assert!(!UserPatch::default().changes_role());
    }
}

//! Credential verification: login and bearer-token resolution.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use clientdesk_core::{DomainError, DomainResult, UserId};

use crate::claims::TokenClaims;
use crate::jwt::{Hs256Jwt, JwtIssuer, JwtValidator};
use crate::password::{verify_against_dummy, verify_password};
use crate::{Identity, User};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Read access to stored users, implemented by the storage layer.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;
    async fn find_by_id(&self, id: UserId) -> DomainResult<Option<User>>;
}

/// Successful login response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: &'static str,
    /// Lifetime in seconds.
    pub expires_in: i64,
}

/// Verify off the async executor.
///
/// `None` (unknown account) verifies against the dummy hash, so both
/// outcomes cost one Argon2 verification on the blocking pool.
async fn check_password(stored_hash: Option<String>, password: &str) -> DomainResult<bool> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || match stored_hash {
        Some(hash) => verify_password(&hash, &password),
        None => {
            verify_against_dummy(&password);
            false
        }
    })
    .await
    .map_err(|e| DomainError::internal(format!("verification task failed: {e}")))
}

pub struct CredentialVerifier<D> {
    directory: D,
    jwt: Hs256Jwt,
    ttl: Duration,
}

impl<D> CredentialVerifier<D>
where
    D: UserDirectory,
{
    pub fn new(directory: D, jwt: Hs256Jwt, ttl: Duration) -> Self {
        Self { directory, jwt, ttl }
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Log in with email + password.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller:
    /// both run one hash verification and return the same error.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<AccessToken> {
        let user = self.directory.find_by_email(email).await?;
        let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
        let matched = check_password(stored_hash, password).await?;

        let user = match user {
            Some(user) if matched => user,
            _ => {
                tracing::info!(email, "login rejected");
                return Err(DomainError::unauthenticated(INVALID_CREDENTIALS));
            }
        };

        let claims = TokenClaims::for_user(&user, now, self.ttl)?;
        let access_token = self.jwt.issue(&claims)?;
        tracing::info!(user_id = %user.id, "login succeeded");

        Ok(AccessToken {
            access_token,
            token_type: "Bearer",
            expires_in: self.ttl.num_seconds(),
        })
    }

    /// Verify a bearer token and resolve the caller from the current user record.
    pub async fn resolve(&self, token: &str, now: DateTime<Utc>) -> DomainResult<Identity> {
        let claims = self.jwt.validate(token, now)?;
        match self.directory.find_by_id(claims.subject()).await? {
            Some(user) => Ok(Identity::from(&user)),
            None => Err(DomainError::unauthenticated("invalid token")),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::password::hash_password;
    use crate::Role;

    #[derive(Default)]
    struct FakeDirectory {
        users: Mutex<Vec<User>>,
        fail: bool,
    }

    impl FakeDirectory {
        fn with(users: Vec<User>) -> Self {
            Self {
                users: Mutex::new(users),
                fail: false,
            }
        }

        fn set_role(&self, id: UserId, role: Role) {
            let mut users = self.users.lock().unwrap();
            if let Some(u) = users.iter_mut().find(|u| u.id == id) {
                u.role = role;
            }
        }

        fn remove(&self, id: UserId) {
            self.users.lock().unwrap().retain(|u| u.id != id);
        }
    }

    #[async_trait]
    impl UserDirectory for FakeDirectory {
        async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
            if self.fail {
                return Err(DomainError::internal("store down"));
            }
            Ok(self.users.lock().unwrap().iter().find(|u| u.email == email).cloned())
        }

        async fn find_by_id(&self, id: UserId) -> DomainResult<Option<User>> {
            if self.fail {
                return Err(DomainError::internal("store down"));
            }
            Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
        }
    }

    fn user(id: i64, email: &str, password: &str, role: Role) -> User {
        User {
            id: UserId::from_i64(id),
            username: format!("user{id}"),
            email: email.to_string(),
            password_hash: hash_password(password).unwrap(),
            role,
        }
    }

    fn verifier(users: Vec<User>) -> CredentialVerifier<FakeDirectory> {
        CredentialVerifier::new(
            FakeDirectory::with(users),
            Hs256Jwt::new("test-secret"),
            Duration::hours(1),
        )
    }

    #[tokio::test]
    async fn login_issues_resolvable_token() {
        let v = verifier(vec![user(5, "bob@example.com", "password5", Role::User)]);
        let now = Utc::now();

        let token = v.authenticate("bob@example.com", "password5", now).await.unwrap();
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 3600);

        let identity = v.resolve(&token.access_token, now).await.unwrap();
        assert_eq!(identity.id, UserId::from_i64(5));
        assert_eq!(identity.email, "bob@example.com");
        assert_eq!(identity.role, Role::User);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_are_indistinguishable() {
        let v = verifier(vec![user(5, "bob@example.com", "password5", Role::User)]);
        let now = Utc::now();

        let wrong = v.authenticate("bob@example.com", "nope!!", now).await.unwrap_err();
        let unknown = v.authenticate("ghost@example.com", "nope!!", now).await.unwrap_err();

        assert_eq!(wrong, unknown);
        assert_eq!(wrong, DomainError::unauthenticated("invalid credentials"));
    }

    #[tokio::test]
    async fn resolve_reflects_current_role() {
        let v = verifier(vec![user(5, "bob@example.com", "password5", Role::User)]);
        let now = Utc::now();
        let token = v.authenticate("bob@example.com", "password5", now).await.unwrap();

        v.directory().set_role(UserId::from_i64(5), Role::Admin);
        let identity = v.resolve(&token.access_token, now).await.unwrap();
        assert_eq!(identity.role, Role::Admin);

        v.directory().set_role(UserId::from_i64(5), Role::User);
        let identity = v.resolve(&token.access_token, now).await.unwrap();
        assert_eq!(identity.role, Role::User);
    }

    #[tokio::test]
    async fn resolve_fails_for_deleted_user() {
        let v = verifier(vec![user(5, "bob@example.com", "password5", Role::User)]);
        let now = Utc::now();
        let token = v.authenticate("bob@example.com", "password5", now).await.unwrap();

        v.directory().remove(UserId::from_i64(5));
        assert!(matches!(
            v.resolve(&token.access_token, now).await,
            Err(DomainError::Unauthenticated(_))
        ));
    }

    #[tokio::test]
    async fn resolve_fails_after_expiry() {
        let v = verifier(vec![user(5, "bob@example.com", "password5", Role::User)]);
        let now = Utc::now();
        let token = v.authenticate("bob@example.com", "password5", now).await.unwrap();

        assert!(matches!(
            v.resolve(&token.access_token, now + Duration::hours(2)).await,
            Err(DomainError::Unauthenticated(_))
        ));
    }

    #[tokio::test]
    async fn token_from_other_secret_rejected() {
        let v = verifier(vec![user(5, "bob@example.com", "password5", Role::User)]);
        let now = Utc::now();
        let foreign = Hs256Jwt::new("other-secret")
            .issue(&TokenClaims {
                sub: 5,
                username: "user5".to_string(),
                role: Role::Admin,
                iat: now.timestamp(),
                exp: (now + Duration::hours(1)).timestamp(),
            })
            .unwrap();

        assert!(matches!(
            v.resolve(&foreign, now).await,
            Err(DomainError::Unauthenticated(_))
        ));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn login_does_not_block_the_runtime() {
        let v = verifier(vec![user(5, "bob@example.com", "password5", Role::User)]);
        let other_task_ran = AtomicBool::new(false);

        let ((token, ran_during_login), ()) = tokio::join!(
            async {
                let token = v.authenticate("bob@example.com", "password5", Utc::now()).await;
                (token, other_task_ran.load(Ordering::SeqCst))
            },
            async {
                tokio::task::yield_now().await;
                other_task_ran.store(true, Ordering::SeqCst);
            }
        );

        assert!(token.is_ok());
        assert!(ran_during_login);
    }

    #[tokio::test]
    async fn unrepresentable_expiry_is_internal() {
        let v = CredentialVerifier::new(
            FakeDirectory::with(vec![user(5, "bob@example.com", "password5", Role::User)]),
            Hs256Jwt::new("test-secret"),
            Duration::days(365),
        );
        assert!(matches!(
            v.authenticate("bob@example.com", "password5", DateTime::<Utc>::MAX_UTC).await,
            Err(DomainError::Internal(_))
        ));
    }

    #[tokio::test]
    async fn store_failure_is_internal_not_unauthenticated() {
        let v = CredentialVerifier::new(
            FakeDirectory {
                fail: true,
                ..Default::default()
            },
            Hs256Jwt::new("test-secret"),
            Duration::hours(1),
        );
        assert!(matches!(
            v.authenticate("bob@example.com", "password5", Utc::now()).await,
            Err(DomainError::Internal(_))
        ));
    }
}

use std::sync::Arc;

use async_trait::async_trait;

use clientdesk_auth::{hash_password, NewUser, NewUserRecord, User, UserDirectory, UserPatch};
use clientdesk_core::{DomainError, DomainResult, UserId};

use super::store_error;
use crate::store::UserStore;

const USER_EXISTS: &str = "user already exists";
const USER_NOT_FOUND: &str = "user not found";

#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn UserStore>,
}

/// Hash off the async executor; Argon2 is deliberately CPU-heavy.
async fn hash_blocking(password: String) -> DomainResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| DomainError::internal(format!("hashing task failed: {e}")))?
        .map_err(DomainError::from)
}

impl UserRepository {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, user: NewUser) -> DomainResult<User> {
        user.validate()?;

        if self.find_by_email(&user.email).await?.is_some() {
            return Err(DomainError::conflict(USER_EXISTS));
        }

        let password_hash = hash_blocking(user.password).await?;
        let created = self
            .store
            .insert(NewUserRecord {
                username: user.username,
                email: user.email,
                password_hash,
                role: user.role,
            })
            .await
            .map_err(|e| store_error(e, USER_EXISTS))?;
        tracing::info!(user_id = %created.id, role = %created.role, "user registered");
        Ok(created)
    }

    pub async fn list(&self) -> DomainResult<Vec<User>> {
        self.store
            .find_all()
            .await
            .map_err(|e| store_error(e, USER_EXISTS))
    }

    pub async fn get_by_id(&self, id: UserId) -> DomainResult<User> {
        self.store
            .find_by_id(id)
            .await
            .map_err(|e| store_error(e, USER_EXISTS))?
            .ok_or_else(|| DomainError::not_found(USER_NOT_FOUND))
    }

    pub async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        self.store
            .find_by_email(email)
            .await
            .map_err(|e| store_error(e, USER_EXISTS))
    }

    /// Merge `patch` into the user keyed by `email`. The email itself never changes.
    pub async fn update(&self, email: &str, patch: UserPatch) -> DomainResult<User> {
        patch.validate()?;

        let mut user = self
            .find_by_email(email)
            .await?
            .ok_or_else(|| DomainError::not_found(USER_NOT_FOUND))?;

        if let Some(username) = patch.username {
            user.username = username;
        }
        if let Some(password) = patch.password {
            user.password_hash = hash_blocking(password).await?;
        }
        if let Some(role) = patch.role {
            user.role = role;
        }

        self.store
            .update(user)
            .await
            .map_err(|e| store_error(e, USER_EXISTS))?
            .ok_or_else(|| DomainError::not_found(USER_NOT_FOUND))
    }

    pub async fn delete_by_email(&self, email: &str) -> DomainResult<()> {
        let removed = self
            .store
            .delete_by_email(email)
            .await
            .map_err(|e| store_error(e, USER_EXISTS))?;
        if removed == 0 {
            return Err(DomainError::not_found(USER_NOT_FOUND));
        }
        tracing::info!(email, "user deleted");
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        UserRepository::find_by_email(self, email).await
    }

    async fn find_by_id(&self, id: UserId) -> DomainResult<Option<User>> {
        self.store
            .find_by_id(id)
            .await
            .map_err(|e| store_error(e, USER_EXISTS))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::store::{InMemoryUserStore, StoreError};
    use clientdesk_auth::{verify_password, CredentialVerifier, Hs256Jwt, Role};

    fn repo() -> UserRepository {
        UserRepository::new(Arc::new(InMemoryUserStore::new()))
    }

    fn new_user(email: &str, role: Role) -> NewUser {
        NewUser {
            username: "alice".to_string(),
            email: email.to_string(),
            password: "password1".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn create_hashes_password() {
        let user = repo()
            .create(new_user("alice@example.com", Role::User))
            .await
            .unwrap();
        assert_ne!(user.password_hash, "password1");
        assert!(verify_password(&user.password_hash, "password1"));
        assert_eq!(user.role, Role::User);
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict() {
        let repo = repo();
        repo.create(new_user("alice@example.com", Role::User)).await.unwrap();
        assert_eq!(
            repo.create(new_user("alice@example.com", Role::Admin)).await,
            Err(DomainError::conflict("user already exists"))
        );
    }

    #[tokio::test]
    async fn invalid_payload_is_validation_error() {
        let mut bad = new_user("alice@example.com", Role::User);
        bad.password = "123".to_string();
        assert!(matches!(repo().create(bad).await, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn update_rehashes_password_and_keeps_email() {
        let repo = repo();
        let created = repo.create(new_user("alice@example.com", Role::User)).await.unwrap();

        let updated = repo
            .update(
                "alice@example.com",
                UserPatch {
                    username: Some("alice2".to_string()),
                    password: Some("new-password".to_string()),
                    role: Some(Role::Admin),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.email, "alice@example.com");
        assert_eq!(updated.username, "alice2");
        assert_eq!(updated.role, Role::Admin);
        assert!(verify_password(&updated.password_hash, "new-password"));
        assert!(!verify_password(&updated.password_hash, "password1"));
    }

    /// Pre-checks see an empty table (or `existing`), but every write fails
    /// with `write_error`.
    struct FailingWriteStore {
        existing: Option<User>,
        write_error: StoreError,
    }

    #[async_trait]
    impl UserStore for FailingWriteStore {
        async fn find_by_id(&self, _: UserId) -> Result<Option<User>, StoreError> {
            Ok(self.existing.clone())
        }
        async fn find_by_email(&self, _: &str) -> Result<Option<User>, StoreError> {
            Ok(self.existing.clone())
        }
        async fn find_all(&self) -> Result<Vec<User>, StoreError> {
            Ok(self.existing.iter().cloned().collect())
        }
        async fn insert(&self, _: NewUserRecord) -> Result<User, StoreError> {
            Err(self.write_error.clone())
        }
        async fn update(&self, _: User) -> Result<Option<User>, StoreError> {
            Err(self.write_error.clone())
        }
        async fn delete_by_email(&self, _: &str) -> Result<u64, StoreError> {
            Err(self.write_error.clone())
        }
    }

    fn stored_alice() -> User {
        User {
            id: UserId::from_i64(1),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$argon2id$stored".to_string(),
            role: Role::User,
        }
    }

    fn failing(existing: Option<User>, write_error: StoreError) -> UserRepository {
        UserRepository::new(Arc::new(FailingWriteStore {
            existing,
            write_error,
        }))
    }

    #[tokio::test]
    async fn create_losing_email_race_is_conflict() {
        let repo = failing(None, StoreError::UniqueViolation("users_email_key".to_string()));
        assert_eq!(
            repo.create(new_user("alice@example.com", Role::User)).await,
            Err(DomainError::conflict("user already exists"))
        );
    }

    #[tokio::test]
    async fn update_store_errors_are_translated() {
        let patch = || UserPatch {
            username: Some("alice2".to_string()),
            ..Default::default()
        };

        let racing = failing(
            Some(stored_alice()),
            StoreError::UniqueViolation("users_email_key".to_string()),
        );
        assert_eq!(
            racing.update("alice@example.com", patch()).await,
            Err(DomainError::conflict("user already exists"))
        );

        let down = failing(
            Some(stored_alice()),
            StoreError::Backend("connection reset".to_string()),
        );
        assert!(matches!(
            down.update("alice@example.com", patch()).await,
            Err(DomainError::Internal(_))
        ));
    }

    #[tokio::test]
    async fn update_missing_user_is_not_found() {
        assert_eq!(
            repo().update("ghost@example.com", UserPatch::default()).await,
            Err(DomainError::not_found("user not found"))
        );
    }

    #[tokio::test]
    async fn delete_twice_is_ok_then_not_found() {
        let repo = repo();
        repo.create(new_user("alice@example.com", Role::User)).await.unwrap();

        assert_eq!(repo.delete_by_email("alice@example.com").await, Ok(()));
        assert_eq!(
            repo.delete_by_email("alice@example.com").await,
            Err(DomainError::not_found("user not found"))
        );
    }

    #[tokio::test]
    async fn verifier_sees_role_changes_through_repository() {
        let repo = repo();
        repo.create(new_user("alice@example.com", Role::User)).await.unwrap();

        let verifier =
            CredentialVerifier::new(repo.clone(), Hs256Jwt::new("secret"), Duration::hours(1));
        let now = Utc::now();
        let token = verifier
            .authenticate("alice@example.com", "password1", now)
            .await
            .unwrap();

        repo.update(
            "alice@example.com",
            UserPatch {
                role: Some(Role::Admin),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let identity = verifier.resolve(&token.access_token, now).await.unwrap();
        assert_eq!(identity.role, Role::Admin);
    }
}

//! Store boundary: the only shared resource between requests.
//!
//! Unique constraints are enforced here, by the store itself. Callers may
//! check before writing, but a `UniqueViolation` from the store is the
//! authoritative answer under concurrent writers.

use async_trait::async_trait;
use thiserror::Error;

use clientdesk_auth::{NewUserRecord, User};
use clientdesk_clients::{Client, NewClient};
use clientdesk_core::{ClientId, UserId};

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryClientStore, InMemoryUserStore};
pub use postgres::PostgresStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("store backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait ClientStore: Send + Sync {
    async fn find_by_id(&self, id: ClientId) -> Result<Option<Client>, StoreError>;
    async fn find_by_cpf(&self, cpf: &str) -> Result<Option<Client>, StoreError>;
    async fn find_all(&self) -> Result<Vec<Client>, StoreError>;
    async fn insert(&self, client: NewClient) -> Result<Client, StoreError>;
    /// Replace the record with `client.id`; `None` when no row matched.
    async fn update(&self, client: Client) -> Result<Option<Client>, StoreError>;
    /// Rows removed (0 or 1).
    async fn delete_by_id(&self, id: ClientId) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_all(&self) -> Result<Vec<User>, StoreError>;
    async fn insert(&self, user: NewUserRecord) -> Result<User, StoreError>;
    /// Replace the record keyed by `user.email`; `None` when no row matched.
    async fn update(&self, user: User) -> Result<Option<User>, StoreError>;
    /// Rows removed (0 or 1).
    async fn delete_by_email(&self, email: &str) -> Result<u64, StoreError>;
}

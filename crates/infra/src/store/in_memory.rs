//! In-memory stores for tests/dev.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use clientdesk_auth::{NewUserRecord, User};
use clientdesk_clients::{Client, NewClient};
use clientdesk_core::{ClientId, UserId};

use super::{ClientStore, StoreError, UserStore};

/// Id-ordered rows plus a unique string key per row.
#[derive(Debug)]
struct Table<V> {
    next_id: i64,
    rows: BTreeMap<i64, V>,
    constraint: &'static str,
    unique_key: fn(&V) -> &str,
}

impl<V: Clone> Table<V> {
    fn new(constraint: &'static str, unique_key: fn(&V) -> &str) -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
            constraint,
            unique_key,
        }
    }

    fn find_by_key(&self, key: &str) -> Option<&V> {
        self.rows.values().find(|v| (self.unique_key)(v) == key)
    }

    fn key_taken_by_other(&self, key: &str, id: i64) -> bool {
        self.rows
            .iter()
            .any(|(row_id, v)| *row_id != id && (self.unique_key)(v) == key)
    }

    fn insert_with(&mut self, key: &str, build: impl FnOnce(i64) -> V) -> Result<V, StoreError> {
        if self.find_by_key(key).is_some() {
            return Err(StoreError::UniqueViolation(self.constraint.to_string()));
        }
        let id = self.next_id;
        self.next_id += 1;
        let row = build(id);
        self.rows.insert(id, row.clone());
        Ok(row)
    }

    fn replace(&mut self, id: i64, row: V) -> Result<Option<V>, StoreError> {
        if !self.rows.contains_key(&id) {
            return Ok(None);
        }
        if self.key_taken_by_other((self.unique_key)(&row), id) {
            return Err(StoreError::UniqueViolation(self.constraint.to_string()));
        }
        self.rows.insert(id, row.clone());
        Ok(Some(row))
    }
}

fn client_cpf(client: &Client) -> &str {
    &client.cpf
}

fn user_email(user: &User) -> &str {
    &user.email
}

fn poisoned() -> StoreError {
    StoreError::Backend("in-memory store lock poisoned".to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Clients
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct InMemoryClientStore {
    inner: RwLock<Table<Client>>,
}

impl InMemoryClientStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Table::new("clients_cpf_key", client_cpf)),
        }
    }
}

impl Default for InMemoryClientStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClientStore for InMemoryClientStore {
    async fn find_by_id(&self, id: ClientId) -> Result<Option<Client>, StoreError> {
        let table = self.inner.read().map_err(|_| poisoned())?;
        Ok(table.rows.get(&id.as_i64()).cloned())
    }

    async fn find_by_cpf(&self, cpf: &str) -> Result<Option<Client>, StoreError> {
        let table = self.inner.read().map_err(|_| poisoned())?;
        Ok(table.find_by_key(cpf).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Client>, StoreError> {
        let table = self.inner.read().map_err(|_| poisoned())?;
        Ok(table.rows.values().cloned().collect())
    }

    async fn insert(&self, client: NewClient) -> Result<Client, StoreError> {
        let mut table = self.inner.write().map_err(|_| poisoned())?;
        let cpf = client.cpf.clone();
        table.insert_with(&cpf, |id| client.into_client(ClientId::from_i64(id)))
    }

    async fn update(&self, client: Client) -> Result<Option<Client>, StoreError> {
        let mut table = self.inner.write().map_err(|_| poisoned())?;
        table.replace(client.id.as_i64(), client)
    }

    async fn delete_by_id(&self, id: ClientId) -> Result<u64, StoreError> {
        let mut table = self.inner.write().map_err(|_| poisoned())?;
        Ok(table.rows.remove(&id.as_i64()).map_or(0, |_| 1))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct InMemoryUserStore {
    inner: RwLock<Table<User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Table::new("users_email_key", user_email)),
        }
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let table = self.inner.read().map_err(|_| poisoned())?;
        Ok(table.rows.get(&id.as_i64()).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let table = self.inner.read().map_err(|_| poisoned())?;
        Ok(table.find_by_key(email).cloned())
    }

    async fn find_all(&self) -> Result<Vec<User>, StoreError> {
        let table = self.inner.read().map_err(|_| poisoned())?;
        Ok(table.rows.values().cloned().collect())
    }

    async fn insert(&self, user: NewUserRecord) -> Result<User, StoreError> {
        let mut table = self.inner.write().map_err(|_| poisoned())?;
        let email = user.email.clone();
        table.insert_with(&email, |id| user.into_user(UserId::from_i64(id)))
    }

    async fn update(&self, user: User) -> Result<Option<User>, StoreError> {
        let mut table = self.inner.write().map_err(|_| poisoned())?;
        let Some(id) = table.find_by_key(&user.email).map(|u| u.id.as_i64()) else {
            return Ok(None);
        };
        table.replace(id, User {
            id: UserId::from_i64(id),
            ..user
        })
    }

    async fn delete_by_email(&self, email: &str) -> Result<u64, StoreError> {
        let mut table = self.inner.write().map_err(|_| poisoned())?;
        let Some(id) = table.find_by_key(email).map(|u| u.id.as_i64()) else {
            return Ok(0);
        };
        table.rows.remove(&id);
        Ok(1)
    }
}

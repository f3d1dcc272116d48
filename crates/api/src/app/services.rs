//! Service wiring: store selection, repositories, verifier, seeding.

use std::sync::Arc;

use thiserror::Error;

use clientdesk_auth::{CredentialVerifier, Hs256Jwt};
use clientdesk_core::DomainError;
use clientdesk_infra::{
    seed, AppConfig, ClientRepository, ClientStore, InMemoryClientStore, InMemoryUserStore,
    PostgresStore, StoreError, UserRepository, UserStore,
};

pub type Verifier = CredentialVerifier<UserRepository>;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("store unavailable: {0}")]
    Store(#[from] StoreError),

    #[error("seeding failed: {0}")]
    Seed(#[from] DomainError),
}

/// Everything a request handler needs. Built once at startup.
pub struct AppServices {
    pub clients: ClientRepository,
    pub verifier: Verifier,
}

impl AppServices {
    pub fn new(clients: ClientRepository, verifier: Verifier) -> Self {
        Self { clients, verifier }
    }

    pub fn users(&self) -> &UserRepository {
        self.verifier.directory()
    }
}

struct Stores {
    clients: Arc<dyn ClientStore>,
    users: Arc<dyn UserStore>,
}

async fn open_stores(config: &AppConfig) -> Result<Stores, StoreError> {
    match &config.database_url {
        Some(url) => {
            let store = Arc::new(PostgresStore::connect(url).await?);
            store.migrate().await?;
            tracing::info!("using postgres store");
            Ok(Stores {
                clients: store.clone(),
                users: store,
            })
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store");
            Ok(Stores {
                clients: Arc::new(InMemoryClientStore::new()),
                users: Arc::new(InMemoryUserStore::new()),
            })
        }
    }
}

pub async fn build_services(config: &AppConfig) -> Result<AppServices, StartupError> {
    let stores = open_stores(config).await?;
    let clients = ClientRepository::new(stores.clients);
    let users = UserRepository::new(stores.users);

    seed(&users, &clients, &config.seed).await?;

    let jwt = Hs256Jwt::new(&config.jwt_secret);
    let verifier = CredentialVerifier::new(users, jwt, config.token_ttl);
    Ok(AppServices::new(clients, verifier))
}

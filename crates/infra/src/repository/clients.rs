use std::sync::Arc;

use clientdesk_clients::{Client, ClientPatch, NewClient};
use clientdesk_core::{ClientId, DomainError, DomainResult};

use super::store_error;
use crate::store::ClientStore;

const CLIENT_EXISTS: &str = "client already exists";
const CLIENT_NOT_FOUND: &str = "client not found";

#[derive(Clone)]
pub struct ClientRepository {
    store: Arc<dyn ClientStore>,
}

impl ClientRepository {
    pub fn new(store: Arc<dyn ClientStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, client: NewClient) -> DomainResult<Client> {
        client.validate()?;

        let existing = self
            .store
            .find_by_cpf(&client.cpf)
            .await
            .map_err(|e| store_error(e, CLIENT_EXISTS))?;
        if existing.is_some() {
            return Err(DomainError::conflict(CLIENT_EXISTS));
        }

        let created = self
            .store
            .insert(client)
            .await
            .map_err(|e| store_error(e, CLIENT_EXISTS))?;
        tracing::debug!(client_id = %created.id, "client registered");
        Ok(created)
    }

    pub async fn list(&self) -> DomainResult<Vec<Client>> {
        self.store
            .find_all()
            .await
            .map_err(|e| store_error(e, CLIENT_EXISTS))
    }

    pub async fn get_by_id(&self, id: ClientId) -> DomainResult<Client> {
        self.store
            .find_by_id(id)
            .await
            .map_err(|e| store_error(e, CLIENT_EXISTS))?
            .ok_or_else(|| DomainError::not_found(CLIENT_NOT_FOUND))
    }

    pub async fn update(&self, id: ClientId, patch: ClientPatch) -> DomainResult<Client> {
        patch.validate()?;

        let mut client = self.get_by_id(id).await?;

        if let Some(cpf) = patch.cpf.as_deref().filter(|cpf| *cpf != client.cpf) {
            let owner = self
                .store
                .find_by_cpf(cpf)
                .await
                .map_err(|e| store_error(e, CLIENT_EXISTS))?;
            if owner.is_some_and(|other| other.id != id) {
                return Err(DomainError::conflict(CLIENT_EXISTS));
            }
        }

        client.apply(patch);
        self.store
            .update(client)
            .await
            .map_err(|e| store_error(e, CLIENT_EXISTS))?
            .ok_or_else(|| DomainError::not_found(CLIENT_NOT_FOUND))
    }

    pub async fn delete_by_id(&self, id: ClientId) -> DomainResult<()> {
        let removed = self
            .store
            .delete_by_id(id)
            .await
            .map_err(|e| store_error(e, CLIENT_EXISTS))?;
        if removed == 0 {
            return Err(DomainError::not_found(CLIENT_NOT_FOUND));
        }
        tracing::debug!(client_id = %id, "client deleted");
        Ok(())
    }
}

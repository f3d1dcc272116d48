//! Record repository facade: uniform CRUD over the stores.
//!
//! Validation runs first, then a best-effort uniqueness pre-check, then the write.
//! The store's own unique constraint still decides under concurrent writers,
//! and its violation is reported as the same `Conflict`.

use clientdesk_core::DomainError;

use crate::store::StoreError;

pub mod clients;
pub mod users;

pub use clients::ClientRepository;
pub use users::UserRepository;

fn store_error(err: StoreError, conflict: &str) -> DomainError {
    match err {
        StoreError::UniqueViolation(_) => DomainError::conflict(conflict),
        StoreError::Backend(msg) => DomainError::internal(msg),
    }
}

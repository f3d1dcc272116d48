//! `clientdesk-core`: shared building blocks for the record-keeping backend.
//!
//! This crate contains **pure** primitives (no IO): the error taxonomy,
//! record identifiers and field validation helpers.

pub mod error;
pub mod id;
pub mod validate;

pub use error::{DomainError, DomainResult, FieldViolation, ValidationErrors};
pub use id::{ClientId, UserId};
pub use validate::FieldChecks;

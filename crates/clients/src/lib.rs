//! Clients domain module (customer records).
//!
//! Pure record model plus the field constraints enforced at the boundary
//! before anything reaches a store.

pub mod client;

pub use client::{Client, ClientPatch, NewClient};

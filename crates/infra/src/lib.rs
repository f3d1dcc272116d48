//! Infrastructure layer: stores, repository facade, seeding, config.

pub mod config;
pub mod repository;
pub mod seeder;
pub mod store;

pub use config::{AdminSeed, AppConfig, ConfigError, SeedConfig};
pub use repository::{ClientRepository, UserRepository};
pub use seeder::{seed, SeedReport};
pub use store::{
    ClientStore, InMemoryClientStore, InMemoryUserStore, PostgresStore, StoreError, UserStore,
};

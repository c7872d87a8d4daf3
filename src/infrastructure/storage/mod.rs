//! Storage infrastructure - in-memory and PostgreSQL backends

mod factory;
mod in_memory;
pub mod migrations;
mod postgres;

pub use factory::{Repositories, StorageFactory};
pub use in_memory::InMemoryStorage;
pub use migrations::{revert_last_migration, run_storage_migrations, Migration, PostgresMigrator};
pub use postgres::{connect_pool, PostgresConfig, PostgresStorage};
pub(crate) use postgres::is_unique_violation;

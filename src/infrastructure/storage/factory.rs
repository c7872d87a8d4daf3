//! Builds the configured persistence backend

use std::sync::Arc;

use crate::config::{StorageBackend, StorageSettings};
use crate::domain::profile::Profile;
use crate::domain::storage::Storage;
use crate::domain::verification::VerificationCode;
use crate::domain::DomainError;
use crate::domain::user::UserRepository;
use crate::infrastructure::user::{InMemoryUserRepository, PostgresUserRepository};

use super::in_memory::InMemoryStorage;
use super::migrations::{run_storage_migrations, PROFILES_TABLE, VERIFICATION_CODES_TABLE};
use super::postgres::{connect_pool, PostgresConfig, PostgresStorage};

/// Every store the services need, sharing one backend
#[derive(Debug, Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub profiles: Arc<dyn Storage<Profile>>,
    pub verification_codes: Arc<dyn Storage<VerificationCode>>,
}

#[derive(Debug)]
pub struct StorageFactory;

impl StorageFactory {
    /// Connect (and migrate) the configured backend
    pub async fn create(settings: &StorageSettings) -> Result<Repositories, DomainError> {
        match settings.backend {
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on restart");
                Ok(Self::in_memory())
            }
            StorageBackend::Postgres => {
                let config = Self::postgres_config(settings)?;
                let pool = connect_pool(&config).await?;
                let applied = run_storage_migrations(&pool).await?;

                tracing::info!(
                    max_connections = config.max_connections,
                    migrations_applied = applied,
                    "Connected to PostgreSQL"
                );

                Ok(Repositories {
                    users: Arc::new(PostgresUserRepository::new(pool.clone())),
                    profiles: Arc::new(PostgresStorage::new(pool.clone(), PROFILES_TABLE)),
                    verification_codes: Arc::new(PostgresStorage::new(
                        pool,
                        VERIFICATION_CODES_TABLE,
                    )),
                })
            }
        }
    }

    pub fn in_memory() -> Repositories {
        Repositories {
            users: Arc::new(InMemoryUserRepository::new()),
            profiles: Arc::new(InMemoryStorage::new()),
            verification_codes: Arc::new(InMemoryStorage::new()),
        }
    }

    pub fn postgres_config(settings: &StorageSettings) -> Result<PostgresConfig, DomainError> {
        let url = settings.database_url.as_deref().ok_or_else(|| {
            DomainError::configuration("storage.database_url is required for postgres")
        })?;

        Ok(PostgresConfig::new(url).with_max_connections(settings.max_connections))
    }
}

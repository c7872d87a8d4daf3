//! In-memory storage implementation

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::domain::storage::{Storage, StorageEntity, StorageKey};
use crate::domain::DomainError;

/// Thread-safe map-backed storage
///
/// Used for development and tests. Data is lost when the process exits.
#[derive(Debug)]
pub struct InMemoryStorage<E>
where
    E: StorageEntity,
{
    entities: RwLock<HashMap<String, E>>,
}

impl<E> Default for InMemoryStorage<E>
where
    E: StorageEntity,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> InMemoryStorage<E>
where
    E: StorageEntity,
{
    pub fn new() -> Self {
        Self {
            entities: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_entities(entities: Vec<E>) -> Self {
        let map = entities
            .into_iter()
            .map(|entity| (entity.key().as_str().to_string(), entity))
            .collect();

        Self {
            entities: RwLock::new(map),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, E>>, DomainError> {
        self.entities
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, E>>, DomainError> {
        self.entities
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))
    }
}

#[async_trait]
impl<E> Storage<E> for InMemoryStorage<E>
where
    E: StorageEntity + 'static,
{
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError> {
        Ok(self.read()?.get(key.as_str()).cloned())
    }

    async fn list(&self) -> Result<Vec<E>, DomainError> {
        Ok(self.read()?.values().cloned().collect())
    }

    async fn create(&self, entity: E) -> Result<E, DomainError> {
        let key = entity.key().as_str().to_string();
        let mut entities = self.write()?;

        if entities.contains_key(&key) {
            return Err(DomainError::conflict(format!(
                "Entity with key '{}' already exists",
                key
            )));
        }

        entities.insert(key, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: E) -> Result<E, DomainError> {
        let key = entity.key().as_str().to_string();
        let mut entities = self.write()?;

        match entities.get_mut(&key) {
            Some(slot) => {
                *slot = entity.clone();
                Ok(entity)
            }
            None => Err(DomainError::not_found(format!(
                "Entity with key '{}' not found",
                key
            ))),
        }
    }

    async fn save(&self, entity: E) -> Result<E, DomainError> {
        let key = entity.key().as_str().to_string();
        self.write()?.insert(key, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, key: &E::Key) -> Result<bool, DomainError> {
        Ok(self.write()?.remove(key.as_str()).is_some())
    }

    async fn exists(&self, key: &E::Key) -> Result<bool, DomainError> {
        Ok(self.read()?.contains_key(key.as_str()))
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.read()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::profile::{Profile, ProfileId};
    use crate::domain::user::UserId;

    fn profile(name: &str) -> Profile {
        Profile::new(
            ProfileId::generate(),
            UserId::generate(),
            name,
            "http://iptv.example.com",
            "user",
            "pass",
        )
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let storage: InMemoryStorage<Profile> = InMemoryStorage::new();
        let p = profile("Home");

        storage.create(p.clone()).await.unwrap();

        let found = storage.get(p.id()).await.unwrap().unwrap();
        assert_eq!(found.name(), "Home");
    }

    #[tokio::test]
    async fn test_create_conflict() {
        let storage: InMemoryStorage<Profile> = InMemoryStorage::new();
        let p = profile("Home");

        storage.create(p.clone()).await.unwrap();
        let result = storage.create(p).await;

        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_update() {
        let storage: InMemoryStorage<Profile> = InMemoryStorage::new();
        let mut p = profile("Home");
        storage.create(p.clone()).await.unwrap();

        p.set_name("Office");
        storage.update(p.clone()).await.unwrap();

        assert_eq!(storage.get(p.id()).await.unwrap().unwrap().name(), "Office");
    }

    #[tokio::test]
    async fn test_update_not_found() {
        let storage: InMemoryStorage<Profile> = InMemoryStorage::new();
        let result = storage.update(profile("Home")).await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_save_upserts() {
        let storage: InMemoryStorage<Profile> = InMemoryStorage::new();
        let mut p = profile("Home");

        storage.save(p.clone()).await.unwrap();
        p.set_name("Cabin");
        storage.save(p.clone()).await.unwrap();

        assert_eq!(storage.count().await.unwrap(), 1);
        assert_eq!(storage.get(p.id()).await.unwrap().unwrap().name(), "Cabin");
    }

    #[tokio::test]
    async fn test_delete() {
        let storage: InMemoryStorage<Profile> = InMemoryStorage::new();
        let p = profile("Home");
        storage.create(p.clone()).await.unwrap();

        assert!(storage.delete(p.id()).await.unwrap());
        assert!(!storage.exists(p.id()).await.unwrap());
        assert!(!storage.delete(p.id()).await.unwrap());
    }

    #[tokio::test]
    async fn test_with_entities_and_list() {
        let storage: InMemoryStorage<Profile> =
            InMemoryStorage::with_entities(vec![profile("A"), profile("B")]);

        assert_eq!(storage.count().await.unwrap(), 2);
        assert_eq!(storage.list().await.unwrap().len(), 2);
    }
}

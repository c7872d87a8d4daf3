//! In-memory user repository implementation

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::user::{normalize_email, User, UserId, UserRepository, UserStatus};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct UserTable {
    users: HashMap<String, User>,
    /// Normalized email -> user ID
    email_index: HashMap<String, String>,
}

/// In-memory implementation of UserRepository
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    table: RwLock<UserTable>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<User>) -> Self {
        let mut table = UserTable::default();

        for user in users {
            let id = user.id().as_str().to_string();
            table.email_index.insert(user.email().to_string(), id.clone());
            table.users.insert(id, user);
        }

        Self {
            table: RwLock::new(table),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        Ok(self.table.read().await.users.get(id.as_str()).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;

        Ok(table
            .email_index
            .get(&normalize_email(email))
            .and_then(|id| table.users.get(id))
            .cloned())
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut table = self.table.write().await;
        let id = user.id().as_str().to_string();

        if table.users.contains_key(&id) {
            return Err(DomainError::conflict(format!(
                "User with ID '{}' already exists",
                id
            )));
        }

        if table.email_index.contains_key(user.email()) {
            return Err(DomainError::conflict(format!(
                "Email '{}' is already registered",
                user.email()
            )));
        }

        table.email_index.insert(user.email().to_string(), id.clone());
        table.users.insert(id, user.clone());

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut table = self.table.write().await;
        let id = user.id().as_str().to_string();

        let old_email = match table.users.get(&id) {
            Some(existing) => existing.email().to_string(),
            None => return Err(DomainError::not_found(format!("User '{}' not found", id))),
        };

        if old_email != user.email() {
            if table.email_index.contains_key(user.email()) {
                return Err(DomainError::conflict(format!(
                    "Email '{}' is already registered",
                    user.email()
                )));
            }

            table.email_index.remove(&old_email);
            table.email_index.insert(user.email().to_string(), id.clone());
        }

        table.users.insert(id, user.clone());

        Ok(user.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, DomainError> {
        let mut table = self.table.write().await;

        match table.users.remove(id.as_str()) {
            Some(user) => {
                table.email_index.remove(user.email());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list(&self, status: Option<UserStatus>) -> Result<Vec<User>, DomainError> {
        let table = self.table.read().await;

        let mut users: Vec<User> = table
            .users
            .values()
            .filter(|u| status.is_none_or(|s| u.status() == s))
            .cloned()
            .collect();

        users.sort_by_key(|u| u.created_at());
        Ok(users)
    }

    async fn count(&self, status: Option<UserStatus>) -> Result<usize, DomainError> {
        let table = self.table.read().await;

        Ok(table
            .users
            .values()
            .filter(|u| status.is_none_or(|s| u.status() == s))
            .count())
    }

    async fn record_login(&self, id: &UserId) -> Result<(), DomainError> {
        let mut table = self.table.write().await;

        match table.users.get_mut(id.as_str()) {
            Some(user) => {
                user.record_login();
                Ok(())
            }
            None => Err(DomainError::not_found(format!("User '{}' not found", id))),
        }
    }
}

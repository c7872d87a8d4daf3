//! Application state for shared services

use std::sync::Arc;

use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::auth::{ApiKeyVerifier, JwtGenerator};
use crate::infrastructure::catalog::CatalogService;
use crate::infrastructure::email::Mailer;
use crate::infrastructure::profile::ProfileService;
use crate::infrastructure::user::{AuthOutcome, PasswordHasher, RegisterRequest, UserService};
use crate::infrastructure::verification::VerificationService;

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServiceTrait>,
    pub verification_service: Arc<VerificationService>,
    pub profile_service: Arc<ProfileService>,
    pub catalog_service: Arc<CatalogService>,
    pub mailer: Arc<Mailer>,
    pub jwt_service: Arc<dyn JwtGenerator>,
    pub api_keys: Arc<ApiKeyVerifier>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("api_keys", &self.api_keys)
            .finish_non_exhaustive()
    }
}

/// Trait for user service operations
#[async_trait::async_trait]
pub trait UserServiceTrait: Send + Sync {
    async fn register(&self, request: RegisterRequest) -> Result<User, DomainError>;
    async fn authenticate(&self, email: &str, password: &str) -> Result<AuthOutcome, DomainError>;
    async fn mark_verified(&self, id: &UserId) -> Result<User, DomainError>;
    async fn get(&self, id: &str) -> Result<Option<User>, DomainError>;
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;
    async fn update_name(&self, id: &str, name: &str) -> Result<User, DomainError>;
    async fn change_password(
        &self,
        id: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<User, DomainError>;
    async fn set_password(&self, id: &UserId, new_password: &str) -> Result<User, DomainError>;
    async fn delete(&self, id: &str) -> Result<bool, DomainError>;
}

#[async_trait::async_trait]
impl<R, H> UserServiceTrait for UserService<R, H>
where
    R: UserRepository + ?Sized + 'static,
    H: PasswordHasher + 'static,
{
    async fn register(&self, request: RegisterRequest) -> Result<User, DomainError> {
        UserService::register(self, request).await
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<AuthOutcome, DomainError> {
        UserService::authenticate(self, email, password).await
    }

    async fn mark_verified(&self, id: &UserId) -> Result<User, DomainError> {
        UserService::mark_verified(self, id).await
    }

    async fn get(&self, id: &str) -> Result<Option<User>, DomainError> {
        UserService::get(self, id).await
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        UserService::get_by_email(self, email).await
    }

    async fn update_name(&self, id: &str, name: &str) -> Result<User, DomainError> {
        UserService::update_name(self, id, name).await
    }

    async fn change_password(
        &self,
        id: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<User, DomainError> {
        UserService::change_password(self, id, current_password, new_password).await
    }

    async fn set_password(&self, id: &UserId, new_password: &str) -> Result<User, DomainError> {
        UserService::set_password(self, id, new_password).await
    }

    async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        UserService::delete(self, id).await
    }
}

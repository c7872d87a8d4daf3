//! User service for registration, authentication and account management

use std::sync::Arc;

use crate::domain::user::{
    normalize_email, validate_email, validate_name, validate_password, User, UserId,
    UserRepository,
};
use crate::domain::DomainError;

use super::password::PasswordHasher;

#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Result of checking a login attempt
#[derive(Debug, Clone)]
pub enum AuthOutcome {
    Authenticated(User),
    /// Unknown email or wrong password; callers must not tell these apart
    InvalidCredentials,
    Unverified,
    Suspended,
}

#[derive(Debug)]
pub struct UserService<R: UserRepository + ?Sized, H: PasswordHasher> {
    repository: Arc<R>,
    hasher: Arc<H>,
}

impl<R: UserRepository + ?Sized, H: PasswordHasher> UserService<R, H> {
    pub fn new(repository: Arc<R>, hasher: Arc<H>) -> Self {
        Self { repository, hasher }
    }

    /// Create an unverified account
    pub async fn register(&self, request: RegisterRequest) -> Result<User, DomainError> {
        let email = normalize_email(&request.email);

        validate_email(&email).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_name(&request.name).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_password(&request.password)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        if self.repository.email_exists(&email).await? {
            return Err(DomainError::conflict(format!(
                "Email '{}' is already registered",
                email
            )));
        }

        let password_hash = self.hasher.hash(&request.password)?;
        let user = User::new(UserId::generate(), &email, request.name, password_hash);

        let user = self.repository.create(user).await?;
        tracing::info!(user_id = %user.id(), "User registered");

        Ok(user)
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<AuthOutcome, DomainError> {
        let Some(user) = self.repository.get_by_email(&normalize_email(email)).await? else {
            return Ok(AuthOutcome::InvalidCredentials);
        };

        if !self.hasher.verify(password, user.password_hash()) {
            return Ok(AuthOutcome::InvalidCredentials);
        }

        if !user.is_active() {
            return Ok(AuthOutcome::Suspended);
        }

        if !user.is_email_verified() {
            return Ok(AuthOutcome::Unverified);
        }

        self.repository.record_login(user.id()).await?;

        let user = self.require(user.id()).await?;
        Ok(AuthOutcome::Authenticated(user))
    }

    /// Mark the email as verified and record the login that follows it
    pub async fn mark_verified(&self, id: &UserId) -> Result<User, DomainError> {
        let mut user = self.require(id).await?;

        user.mark_email_verified();
        user.record_login();

        self.repository.update(&user).await
    }

    pub async fn get(&self, id: &str) -> Result<Option<User>, DomainError> {
        let user_id = parse_id(id)?;
        self.repository.get(&user_id).await
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.repository.get_by_email(&normalize_email(email)).await
    }

    pub async fn update_name(&self, id: &str, name: &str) -> Result<User, DomainError> {
        validate_name(name).map_err(|e| DomainError::validation(e.to_string()))?;

        let mut user = self.require(&parse_id(id)?).await?;
        user.set_name(name);

        self.repository.update(&user).await
    }

    /// Change the password after checking the current one
    pub async fn change_password(
        &self,
        id: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<User, DomainError> {
        let mut user = self.require(&parse_id(id)?).await?;

        if !self.hasher.verify(current_password, user.password_hash()) {
            return Err(DomainError::validation("Current password is incorrect"));
        }

        validate_password(new_password).map_err(|e| DomainError::validation(e.to_string()))?;

        user.set_password_hash(self.hasher.hash(new_password)?);
        self.repository.update(&user).await
    }

    /// Replace the password without the current one (reset flow)
    pub async fn set_password(&self, id: &UserId, new_password: &str) -> Result<User, DomainError> {
        validate_password(new_password).map_err(|e| DomainError::validation(e.to_string()))?;

        let mut user = self.require(id).await?;
        user.set_password_hash(self.hasher.hash(new_password)?);

        self.repository.update(&user).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        let user_id = parse_id(id)?;
        let deleted = self.repository.delete(&user_id).await?;

        if deleted {
            tracing::info!(user_id = %user_id, "User deleted");
        }

        Ok(deleted)
    }

    async fn require(&self, id: &UserId) -> Result<User, DomainError> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))
    }
}

fn parse_id(id: &str) -> Result<UserId, DomainError> {
    UserId::new(id).map_err(|e| DomainError::invalid_id(e.to_string()))
}

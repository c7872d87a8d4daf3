//! Profile service - per-user upstream credentials

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::profile::{
    normalize_provider_url, validate_credential, validate_profile_name, Profile, ProfileId,
};
use crate::domain::storage::Storage;
use crate::domain::user::UserId;
use crate::domain::DomainError;
use crate::infrastructure::xtream::{UpstreamClient, UpstreamCredentials};

#[derive(Debug, Clone)]
pub struct CreateProfileRequest {
    pub name: String,
    pub url: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl UpdateProfileRequest {
    fn changes_credentials(&self) -> bool {
        self.url.is_some() || self.username.is_some() || self.password.is_some()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ProfileLimits {
    pub max_per_user: usize,
    /// Log in upstream before accepting new or changed credentials
    pub verify_credentials: bool,
}

impl Default for ProfileLimits {
    fn default() -> Self {
        Self {
            max_per_user: 10,
            verify_credentials: false,
        }
    }
}

#[derive(Debug)]
pub struct ProfileService {
    storage: Arc<dyn Storage<Profile>>,
    upstream: Arc<dyn UpstreamClient>,
    limits: ProfileLimits,
}

impl ProfileService {
    pub fn new(
        storage: Arc<dyn Storage<Profile>>,
        upstream: Arc<dyn UpstreamClient>,
        limits: ProfileLimits,
    ) -> Self {
        Self {
            storage,
            upstream,
            limits,
        }
    }

    /// The user's profiles, oldest first
    pub async fn list(&self, user_id: &UserId) -> Result<Vec<Profile>, DomainError> {
        let mut profiles: Vec<Profile> = self
            .storage
            .list()
            .await?
            .into_iter()
            .filter(|p| p.is_owned_by(user_id))
            .collect();

        profiles.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().as_str().cmp(b.id().as_str()))
        });

        Ok(profiles)
    }

    /// A profile owned by someone else is reported as missing
    pub async fn get(&self, user_id: &UserId, id: &str) -> Result<Profile, DomainError> {
        let profile_id = ProfileId::new(id).map_err(|e| DomainError::invalid_id(e.to_string()))?;

        self.storage
            .get(&profile_id)
            .await?
            .filter(|p| p.is_owned_by(user_id))
            .ok_or_else(|| DomainError::not_found(format!("Profile '{}' not found", id)))
    }

    pub async fn credentials(
        &self,
        user_id: &UserId,
        id: &str,
    ) -> Result<UpstreamCredentials, DomainError> {
        let profile = self.get(user_id, id).await?;
        Ok(UpstreamCredentials::from(&profile))
    }

    pub async fn create(
        &self,
        user_id: &UserId,
        request: CreateProfileRequest,
    ) -> Result<Profile, DomainError> {
        validate_profile_name(&request.name).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_credential("Username", &request.username)
            .map_err(|e| DomainError::validation(e.to_string()))?;
        validate_credential("Password", &request.password)
            .map_err(|e| DomainError::validation(e.to_string()))?;
        let url =
            normalize_provider_url(&request.url).map_err(|e| DomainError::validation(e.to_string()))?;

        let owned = self.list(user_id).await?.len();
        if owned >= self.limits.max_per_user {
            return Err(DomainError::conflict(format!(
                "Profile limit of {} reached",
                self.limits.max_per_user
            )));
        }

        let profile = Profile::new(
            ProfileId::generate(),
            user_id.clone(),
            request.name,
            url,
            request.username,
            request.password,
        );

        if self.limits.verify_credentials {
            self.verify_upstream(&profile).await?;
        }

        let profile = self.storage.create(profile).await?;
        info!(user_id = %user_id, profile_id = %profile.id(), "Profile created");

        Ok(profile)
    }

    pub async fn update(
        &self,
        user_id: &UserId,
        id: &str,
        request: UpdateProfileRequest,
    ) -> Result<Profile, DomainError> {
        let mut profile = self.get(user_id, id).await?;
        let recheck = request.changes_credentials();

        if let Some(name) = request.name {
            validate_profile_name(&name).map_err(|e| DomainError::validation(e.to_string()))?;
            profile.set_name(name);
        }

        if let Some(url) = request.url {
            let url =
                normalize_provider_url(&url).map_err(|e| DomainError::validation(e.to_string()))?;
            profile.set_url(url);
        }

        if let Some(username) = request.username {
            validate_credential("Username", &username)
                .map_err(|e| DomainError::validation(e.to_string()))?;
            profile.set_username(username);
        }

        if let Some(password) = request.password {
            validate_credential("Password", &password)
                .map_err(|e| DomainError::validation(e.to_string()))?;
            profile.set_password(password);
        }

        if recheck && self.limits.verify_credentials {
            self.verify_upstream(&profile).await?;
        }

        let profile = self.storage.update(profile).await?;
        info!(user_id = %user_id, profile_id = %profile.id(), "Profile updated");

        Ok(profile)
    }

    pub async fn delete(&self, user_id: &UserId, id: &str) -> Result<(), DomainError> {
        let profile = self.get(user_id, id).await?;

        if !self.storage.delete(profile.id()).await? {
            return Err(DomainError::not_found(format!("Profile '{}' not found", id)));
        }

        info!(user_id = %user_id, profile_id = %id, "Profile deleted");
        Ok(())
    }

    /// Remove every profile of a user; returns how many were deleted
    pub async fn delete_all_for_user(&self, user_id: &UserId) -> Result<usize, DomainError> {
        let mut deleted = 0;

        for profile in self.list(user_id).await? {
            if self.storage.delete(profile.id()).await? {
                deleted += 1;
            }
        }

        debug!(user_id = %user_id, deleted, "Profiles removed");
        Ok(deleted)
    }

    async fn verify_upstream(&self, profile: &Profile) -> Result<(), DomainError> {
        let account = self
            .upstream
            .account_info(&UpstreamCredentials::from(profile))
            .await?;

        if !account.is_authenticated() {
            return Err(DomainError::validation(
                "Provider rejected the profile credentials",
            ));
        }

        Ok(())
    }
}

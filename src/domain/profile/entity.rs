//! Profile entity - saved upstream provider credentials

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::ProfileValidationError;
use crate::domain::storage::{StorageEntity, StorageKey};
use crate::domain::user::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProfileId(String);

impl ProfileId {
    pub fn new(id: impl Into<String>) -> Result<Self, ProfileValidationError> {
        let id = id.into();
        let parsed = Uuid::parse_str(&id).map_err(|_| ProfileValidationError::InvalidId(id))?;
        Ok(Self(parsed.hyphenated().to_string()))
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().hyphenated().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProfileId {
    type Error = ProfileValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProfileId> for String {
    fn from(id: ProfileId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ProfileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StorageKey for ProfileId {
    fn as_str(&self) -> &str {
        &self.0
    }
}

/// Credentials for one upstream provider account, owned by one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    id: ProfileId,
    user_id: UserId,
    name: String,
    /// Normalized provider base URL
    url: String,
    username: String,
    password: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Profile {
    /// Create a profile; callers validate and normalize the inputs first
    pub fn new(
        id: ProfileId,
        user_id: UserId,
        name: impl Into<String>,
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let now = Utc::now();

        Self {
            id,
            user_id,
            name: name.into().trim().to_string(),
            url: url.into(),
            username: username.into(),
            password: password.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &ProfileId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into().trim().to_string();
        self.touch();
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
        self.touch();
    }

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = username.into();
        self.touch();
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl StorageEntity for Profile {
    type Key = ProfileId;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}

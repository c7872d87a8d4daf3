//! Profile CRUD endpoints for the authenticated user

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::profile::Profile;
use crate::infrastructure::profile::{CreateProfileRequest, UpdateProfileRequest};

pub fn create_profiles_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_profiles).post(create_profile))
        .route(
            "/{id}",
            get(get_profile).put(update_profile).delete(delete_profile),
        )
}

#[derive(Debug, Deserialize)]
pub struct CreateProfileBody {
    pub name: String,
    pub url: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileBody {
    pub name: Option<String>,
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Profiles are only ever shown to their owner, credentials included
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: String,
    pub name: String,
    pub url: String,
    pub username: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Profile> for ProfileResponse {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id().as_str().to_string(),
            name: profile.name().to_string(),
            url: profile.url().to_string(),
            username: profile.username().to_string(),
            password: profile.password().to_string(),
            created_at: profile.created_at(),
            updated_at: profile.updated_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfilesListResponse {
    pub profiles: Vec<ProfileResponse>,
    pub total: usize,
}

/// GET /profiles
pub async fn list_profiles(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<ProfilesListResponse>, ApiError> {
    let profiles: Vec<ProfileResponse> = state
        .profile_service
        .list(user.id())
        .await?
        .iter()
        .map(ProfileResponse::from)
        .collect();

    Ok(Json(ProfilesListResponse {
        total: profiles.len(),
        profiles,
    }))
}

/// POST /profiles
pub async fn create_profile(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<CreateProfileBody>,
) -> Result<(StatusCode, Json<ProfileResponse>), ApiError> {
    let profile = state
        .profile_service
        .create(
            user.id(),
            CreateProfileRequest {
                name: body.name,
                url: body.url,
                username: body.username,
                password: body.password,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ProfileResponse::from(&profile))))
}

/// GET /profiles/{id}
pub async fn get_profile(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = state.profile_service.get(user.id(), &id).await?;
    Ok(Json(ProfileResponse::from(&profile)))
}

/// PUT /profiles/{id}
///
/// Fields left out of the body keep their values.
pub async fn update_profile(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateProfileBody>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = state
        .profile_service
        .update(
            user.id(),
            &id,
            UpdateProfileRequest {
                name: body.name,
                url: body.url,
                username: body.username,
                password: body.password,
            },
        )
        .await?;

    Ok(Json(ProfileResponse::from(&profile)))
}

/// DELETE /profiles/{id}
pub async fn delete_profile(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.profile_service.delete(user.id(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

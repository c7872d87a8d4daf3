//! Catalog endpoints proxied through a profile's provider

use axum::{
    extract::{Path, State},
    routing::{get, MethodRouter},
    Router,
};
use serde::Deserialize;
use serde_json::Value;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, Query};
use crate::domain::catalog::{CatalogItem, Category, ContentKind, Page, SearchResults, SortOrder};
use crate::domain::user::User;
use crate::infrastructure::catalog::ListQuery;
use crate::infrastructure::xtream::{AccountInfo, UpstreamCredentials};

/// Routes nested under `/profiles/{id}`
pub fn create_catalog_router() -> Router<AppState> {
    let mut router = Router::new()
        .route("/{id}/account", get(get_account))
        .route("/{id}/search", get(search))
        .route("/{id}/vod/{vod_id}", get(get_vod_info))
        .route("/{id}/series/{series_id}", get(get_series_info))
        .route("/{id}/live/{stream_id}/epg", get(get_short_epg));

    for kind in ContentKind::ALL {
        router = router
            .route(&format!("/{{id}}/{}", kind), list_route(kind))
            .route(&format!("/{{id}}/{}/categories", kind), categories_route(kind));
    }

    router
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub category_id: Option<String>,
    pub sort: Option<SortOrder>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EpgParams {
    pub limit: Option<usize>,
}

fn list_route(kind: ContentKind) -> MethodRouter<AppState> {
    get(
        move |state: State<AppState>,
              user: RequireUser,
              path: Path<String>,
              params: Query<ListParams>| list_items(kind, state, user, path, params),
    )
}

fn categories_route(kind: ContentKind) -> MethodRouter<AppState> {
    get(
        move |state: State<AppState>, user: RequireUser, path: Path<String>| {
            list_categories(kind, state, user, path)
        },
    )
}

async fn credentials(
    state: &AppState,
    user: &User,
    profile_id: &str,
) -> Result<UpstreamCredentials, ApiError> {
    Ok(state.profile_service.credentials(user.id(), profile_id).await?)
}

/// GET /profiles/{id}/account
pub async fn get_account(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<AccountInfo>, ApiError> {
    let creds = credentials(&state, &user, &id).await?;
    Ok(Json(state.catalog_service.account(&creds).await?))
}

/// GET /profiles/{id}/{kind}/categories
async fn list_categories(
    kind: ContentKind,
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<Category>>, ApiError> {
    let creds = credentials(&state, &user, &id).await?;
    Ok(Json(state.catalog_service.categories(&creds, kind).await?))
}

/// GET /profiles/{id}/{kind}?category_id&sort&page&limit
async fn list_items(
    kind: ContentKind,
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<CatalogItem>>, ApiError> {
    let creds = credentials(&state, &user, &id).await?;

    let page = state
        .catalog_service
        .list(
            &creds,
            kind,
            ListQuery {
                category_id: params.category_id,
                sort: params.sort.unwrap_or_default(),
                page: params.page,
                limit: params.limit,
            },
        )
        .await?;

    Ok(Json(page))
}

/// GET /profiles/{id}/vod/{vod_id}
pub async fn get_vod_info(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path((id, vod_id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let creds = credentials(&state, &user, &id).await?;
    Ok(Json(state.catalog_service.vod_info(&creds, &vod_id).await?))
}

/// GET /profiles/{id}/series/{series_id}
pub async fn get_series_info(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path((id, series_id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let creds = credentials(&state, &user, &id).await?;
    Ok(Json(state.catalog_service.series_info(&creds, &series_id).await?))
}

/// GET /profiles/{id}/live/{stream_id}/epg?limit
pub async fn get_short_epg(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path((id, stream_id)): Path<(String, String)>,
    Query(params): Query<EpgParams>,
) -> Result<Json<Value>, ApiError> {
    let creds = credentials(&state, &user, &id).await?;
    let epg = state
        .catalog_service
        .short_epg(&creds, &stream_id, params.limit)
        .await?;

    Ok(Json(epg))
}

/// GET /profiles/{id}/search?q&limit
pub async fn search(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResults>, ApiError> {
    let creds = credentials(&state, &user, &id).await?;
    let results = state
        .catalog_service
        .search(&creds, &params.q, params.limit)
        .await?;

    Ok(Json(results))
}

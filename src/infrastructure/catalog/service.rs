//! Catalog service - paginated, sorted and searchable views over the provider

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::domain::catalog::{
    CatalogItem, Category, ContentKind, Page, PageRequest, SearchQuery, SearchResults, SortOrder,
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
use crate::domain::DomainError;
use crate::infrastructure::xtream::{AccountInfo, UpstreamClient, UpstreamCredentials};

/// Paging knobs for catalog listings
#[derive(Debug, Clone, Copy)]
pub struct CatalogSettings {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

/// Listing parameters as received from a client
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub category_id: Option<String>,
    pub sort: SortOrder,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug)]
pub struct CatalogService {
    upstream: Arc<dyn UpstreamClient>,
    settings: CatalogSettings,
}

impl CatalogService {
    pub fn new(upstream: Arc<dyn UpstreamClient>, settings: CatalogSettings) -> Self {
        Self { upstream, settings }
    }

    pub async fn account(&self, creds: &UpstreamCredentials) -> Result<AccountInfo, DomainError> {
        self.upstream.account_info(creds).await
    }

    pub async fn categories(
        &self,
        creds: &UpstreamCredentials,
        kind: ContentKind,
    ) -> Result<Vec<Category>, DomainError> {
        self.upstream.categories(creds, kind).await
    }

    /// Fetch a whole collection, sort it, then cut out the requested page
    pub async fn list(
        &self,
        creds: &UpstreamCredentials,
        kind: ContentKind,
        query: ListQuery,
    ) -> Result<Page<CatalogItem>, DomainError> {
        // validate before spending an upstream round trip
        let request = PageRequest::new(
            query.page,
            query.limit,
            self.settings.default_page_size,
            self.settings.max_page_size,
        )?;

        let category = query
            .category_id
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());

        let mut items = self.upstream.streams(creds, kind, category).await?;
        query.sort.apply(&mut items, kind);

        debug!(
            kind = %kind,
            total = items.len(),
            page = request.page(),
            limit = request.limit(),
            "Catalog page built"
        );

        Ok(Page::from_vec(items, request))
    }

    pub async fn vod_info(
        &self,
        creds: &UpstreamCredentials,
        vod_id: &str,
    ) -> Result<Value, DomainError> {
        self.upstream.vod_info(creds, vod_id).await
    }

    pub async fn series_info(
        &self,
        creds: &UpstreamCredentials,
        series_id: &str,
    ) -> Result<Value, DomainError> {
        self.upstream.series_info(creds, series_id).await
    }

    pub async fn short_epg(
        &self,
        creds: &UpstreamCredentials,
        stream_id: &str,
        limit: Option<usize>,
    ) -> Result<Value, DomainError> {
        self.upstream.short_epg(creds, stream_id, limit).await
    }

    /// Name search across live, VOD and series; any failed fetch fails the search
    pub async fn search(
        &self,
        creds: &UpstreamCredentials,
        query: &str,
        limit: Option<usize>,
    ) -> Result<SearchResults, DomainError> {
        let query = SearchQuery::new(query, limit)?;

        let (live, vod, series) = futures::try_join!(
            self.upstream.streams(creds, ContentKind::Live, None),
            self.upstream.streams(creds, ContentKind::Vod, None),
            self.upstream.streams(creds, ContentKind::Series, None),
        )?;

        let results = SearchResults {
            query: query.as_str().to_string(),
            live: query.filter(live),
            vod: query.filter(vod),
            series: query.filter(series),
        };

        debug!(query = %results.query, hits = results.total(), "Catalog search finished");
        Ok(results)
    }
}

//! Cross-collection name search

use serde::Serialize;

use super::content::CatalogItem;
use crate::domain::DomainError;

pub const MIN_QUERY_LENGTH: usize = 2;
pub const DEFAULT_SEARCH_LIMIT: usize = 20;
pub const MAX_SEARCH_LIMIT: usize = 100;

/// A validated, case-folded search term with a per-collection cap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    raw: String,
    needle: String,
    limit: usize,
}

impl SearchQuery {
    pub fn new(query: &str, limit: Option<usize>) -> Result<Self, DomainError> {
        let raw = query.trim();

        if raw.chars().count() < MIN_QUERY_LENGTH {
            return Err(DomainError::validation(format!(
                "search query must be at least {} characters",
                MIN_QUERY_LENGTH
            )));
        }

        let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
        if limit == 0 || limit > MAX_SEARCH_LIMIT {
            return Err(DomainError::validation(format!(
                "limit must be between 1 and {}",
                MAX_SEARCH_LIMIT
            )));
        }

        Ok(Self {
            raw: raw.to_string(),
            needle: raw.to_lowercase(),
            limit,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn matches(&self, item: &CatalogItem) -> bool {
        item.name()
            .map(|name| name.to_lowercase().contains(&self.needle))
            .unwrap_or(false)
    }

    /// Keep matching items in upstream order, up to the limit
    pub fn filter(&self, items: Vec<CatalogItem>) -> Vec<CatalogItem> {
        items
            .into_iter()
            .filter(|item| self.matches(item))
            .take(self.limit)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub live: Vec<CatalogItem>,
    pub vod: Vec<CatalogItem>,
    pub series: Vec<CatalogItem>,
}

impl SearchResults {
    pub fn total(&self) -> usize {
        self.live.len() + self.vod.len() + self.series.len()
    }
}

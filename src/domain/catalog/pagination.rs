//! Page slicing over fully fetched collections

use serde::Serialize;

use crate::domain::DomainError;

pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const MAX_PAGE_SIZE: usize = 500;

/// A validated 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: usize,
    limit: usize,
}

impl PageRequest {
    /// Build a request from optional query values
    ///
    /// Missing values fall back to page 1 and `default_limit`.
    pub fn new(
        page: Option<usize>,
        limit: Option<usize>,
        default_limit: usize,
        max_limit: usize,
    ) -> Result<Self, DomainError> {
        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(default_limit);

        if page == 0 {
            return Err(DomainError::validation("page must be at least 1"));
        }

        if limit == 0 {
            return Err(DomainError::validation("limit must be at least 1"));
        }

        if limit > max_limit {
            return Err(DomainError::validation(format!(
                "limit must not exceed {}",
                max_limit
            )));
        }

        Ok(Self { page, limit })
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of a larger collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Slice `items` according to `request`; past the end yields an empty page
    pub fn from_vec(items: Vec<T>, request: PageRequest) -> Self {
        let total = items.len();
        let total_pages = total.div_ceil(request.limit);

        let items = items
            .into_iter()
            .skip(request.offset())
            .take(request.limit)
            .collect();

        Self {
            items,
            page: request.page,
            limit: request.limit,
            total,
            total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

//! Catalog domain - upstream content, sorting, pagination and search

mod content;
mod pagination;
mod search;

pub use content::{parse_timestamp, CatalogItem, Category, ContentKind, SortOrder};
pub(crate) use content::deserialize_optional_number_as_string;
pub use pagination::{Page, PageRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use search::{
    SearchQuery, SearchResults, DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT, MIN_QUERY_LENGTH,
};

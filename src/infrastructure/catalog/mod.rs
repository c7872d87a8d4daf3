//! Catalog browsing over a profile's provider

mod service;

pub use service::{CatalogService, CatalogSettings, ListQuery};

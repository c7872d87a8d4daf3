//! Storage domain - document storage abstraction used for profiles and
//! verification codes

mod entity;
mod repository;

pub use entity::{StorageEntity, StorageKey};
pub use repository::Storage;

#[cfg(test)]
pub use repository::mock;

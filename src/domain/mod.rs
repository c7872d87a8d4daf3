//! Domain layer - Core business logic and entities

pub mod catalog;
pub mod error;
pub mod profile;
pub mod storage;
pub mod user;
pub mod verification;

pub use error::DomainError;
pub use storage::{Storage, StorageEntity, StorageKey};

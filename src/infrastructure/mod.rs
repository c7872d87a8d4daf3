//! Infrastructure layer - adapters and services behind the HTTP API

pub mod auth;
pub mod catalog;
pub mod email;
pub mod logging;
pub mod observability;
pub mod profile;
pub mod storage;
pub mod user;
pub mod verification;
pub mod xtream;

//! Xtream Codes upstream access

mod client;
mod http;
mod types;

pub use client::{UpstreamClient, ACCOUNT_ACTION};
pub use http::{XtreamClient, XtreamClientConfig};
pub use types::{AccountInfo, UpstreamCredentials, UserInfo};

#[cfg(test)]
pub use client::mock;

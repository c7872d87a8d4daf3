//! Upstream provider port with typed helpers

use std::fmt::Debug;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::catalog::{CatalogItem, Category, ContentKind};
use crate::domain::DomainError;

use super::types::{AccountInfo, UpstreamCredentials};

/// Label used for the login call, which carries no `action`
pub const ACCOUNT_ACTION: &str = "account_info";

#[async_trait]
pub trait UpstreamClient: Send + Sync + Debug {
    /// Raw call to the provider API; `None` performs the login request
    async fn call(
        &self,
        credentials: &UpstreamCredentials,
        action: Option<&str>,
        params: &[(&str, String)],
    ) -> Result<Value, DomainError>;

    async fn account_info(
        &self,
        credentials: &UpstreamCredentials,
    ) -> Result<AccountInfo, DomainError> {
        let value = self.call(credentials, None, &[]).await?;
        decode(ACCOUNT_ACTION, value)
    }

    async fn categories(
        &self,
        credentials: &UpstreamCredentials,
        kind: ContentKind,
    ) -> Result<Vec<Category>, DomainError> {
        let action = kind.categories_action();
        let value = self.call(credentials, Some(action), &[]).await?;
        decode_list(action, value)
    }

    async fn streams(
        &self,
        credentials: &UpstreamCredentials,
        kind: ContentKind,
        category_id: Option<&str>,
    ) -> Result<Vec<CatalogItem>, DomainError> {
        let action = kind.list_action();
        let params: Vec<(&str, String)> = category_id
            .map(|id| vec![("category_id", id.to_string())])
            .unwrap_or_default();

        let value = self.call(credentials, Some(action), &params).await?;
        decode_list(action, value)
    }

    async fn vod_info(
        &self,
        credentials: &UpstreamCredentials,
        vod_id: &str,
    ) -> Result<Value, DomainError> {
        self.call(credentials, Some("get_vod_info"), &[("vod_id", vod_id.to_string())])
            .await
    }

    async fn series_info(
        &self,
        credentials: &UpstreamCredentials,
        series_id: &str,
    ) -> Result<Value, DomainError> {
        self.call(
            credentials,
            Some("get_series_info"),
            &[("series_id", series_id.to_string())],
        )
        .await
    }

    async fn short_epg(
        &self,
        credentials: &UpstreamCredentials,
        stream_id: &str,
        limit: Option<usize>,
    ) -> Result<Value, DomainError> {
        let mut params = vec![("stream_id", stream_id.to_string())];
        if let Some(limit) = limit {
            params.push(("limit", limit.to_string()));
        }

        self.call(credentials, Some("get_short_epg"), &params).await
    }
}

fn decode<T: DeserializeOwned>(action: &str, value: Value) -> Result<T, DomainError> {
    serde_json::from_value(value)
        .map_err(|e| DomainError::upstream(action, format!("Unexpected response: {}", e)))
}

/// Providers answer an empty list with `[]`, `{}`, `null` or `false`
///
/// Elements that do not decode are dropped so one bad entry cannot fail
/// the whole listing.
fn decode_list<T: DeserializeOwned>(action: &str, value: Value) -> Result<Vec<T>, DomainError> {
    match value {
        Value::Array(elements) => {
            let total = elements.len();
            let items: Vec<T> = elements
                .into_iter()
                .filter_map(|element| serde_json::from_value(element).ok())
                .collect();

            if items.len() < total {
                tracing::warn!(
                    action,
                    skipped = total - items.len(),
                    total,
                    "Skipped malformed list entries from provider"
                );
            }

            Ok(items)
        }
        Value::Null | Value::Bool(false) => Ok(Vec::new()),
        Value::Object(ref map) if map.is_empty() => Ok(Vec::new()),
        other => Err(DomainError::upstream(
            action,
            format!("Expected a list, got {}", json_kind(&other)),
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// One recorded call: action label and query parameters
    pub type RecordedCall = (String, Vec<(String, String)>);

    /// Canned responses keyed by action label
    #[derive(Debug, Default)]
    pub struct MockUpstreamClient {
        responses: HashMap<String, Value>,
        errors: HashMap<String, String>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl MockUpstreamClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_response(mut self, action: &str, response: Value) -> Self {
            self.responses.insert(action.to_string(), response);
            self
        }

        pub fn with_error(mut self, action: &str, error: &str) -> Self {
            self.errors.insert(action.to_string(), error.to_string());
            self
        }

        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl UpstreamClient for MockUpstreamClient {
        async fn call(
            &self,
            _credentials: &UpstreamCredentials,
            action: Option<&str>,
            params: &[(&str, String)],
        ) -> Result<Value, DomainError> {
            let label = action.unwrap_or(ACCOUNT_ACTION);

            self.calls.lock().unwrap().push((
                label.to_string(),
                params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
            ));

            if let Some(error) = self.errors.get(label) {
                return Err(DomainError::upstream(label, error.clone()));
            }

            self.responses
                .get(label)
                .cloned()
                .ok_or_else(|| DomainError::upstream(label, "No mock response"))
        }
    }
}

//! Xtream Codes `player_api.php` client over reqwest

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::DomainError;
use crate::infrastructure::observability::record_upstream_request;

use super::client::{UpstreamClient, ACCOUNT_ACTION};
use super::types::UpstreamCredentials;

#[derive(Debug, Clone)]
pub struct XtreamClientConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for XtreamClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("iptv-gateway/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct XtreamClient {
    client: reqwest::Client,
}

impl XtreamClient {
    pub fn new(config: XtreamClientConfig) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn fetch(
        &self,
        credentials: &UpstreamCredentials,
        label: &str,
        action: Option<&str>,
        params: &[(&str, String)],
    ) -> Result<Value, DomainError> {
        let mut query: Vec<(&str, &str)> = vec![
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
        ];
        if let Some(action) = action {
            query.push(("action", action));
        }
        query.extend(params.iter().map(|(k, v)| (*k, v.as_str())));

        // reqwest errors carry the full URL, including the password
        let response = self
            .client
            .get(credentials.api_url())
            .query(&query)
            .send()
            .await
            .map_err(|e| DomainError::upstream(label, e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::upstream(label, format!("HTTP {}", status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DomainError::upstream(label, e.without_url().to_string()))?;

        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(DomainError::upstream(label, "Empty response body"));
        }

        serde_json::from_slice(&body)
            .map_err(|e| DomainError::upstream(label, format!("Invalid JSON: {}", e)))
    }
}

#[async_trait]
impl UpstreamClient for XtreamClient {
    async fn call(
        &self,
        credentials: &UpstreamCredentials,
        action: Option<&str>,
        params: &[(&str, String)],
    ) -> Result<Value, DomainError> {
        let label = action.unwrap_or(ACCOUNT_ACTION);
        let start = Instant::now();

        let result = self.fetch(credentials, label, action, params).await;
        let elapsed = start.elapsed();

        record_upstream_request(label, result.is_ok(), elapsed);

        match &result {
            Ok(_) => tracing::debug!(
                host = %credentials.host(),
                action = label,
                duration_ms = elapsed.as_millis() as u64,
                "Upstream call succeeded"
            ),
            Err(e) => tracing::warn!(
                host = %credentials.host(),
                action = label,
                duration_ms = elapsed.as_millis() as u64,
                error = %e,
                "Upstream call failed"
            ),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::ContentKind;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> XtreamClient {
        XtreamClient::new(XtreamClientConfig {
            timeout: Duration::from_secs(5),
            user_agent: "test-agent".to_string(),
        })
        .unwrap()
    }

    fn creds(server: &MockServer) -> UpstreamCredentials {
        UpstreamCredentials::new(server.uri(), "john", "s3cret")
    }

    #[tokio::test]
    async fn test_login_sends_credentials_without_action() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/player_api.php"))
            .and(query_param("username", "john"))
            .and(query_param("password", "s3cret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user_info": { "username": "john", "auth": 1, "status": "Active" },
                "server_info": { "url": "iptv.example.com" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let info = client().account_info(&creds(&server)).await.unwrap();
        assert!(info.is_authenticated());
        assert_eq!(info.user_info.status.as_deref(), Some("Active"));
    }

    #[tokio::test]
    async fn test_action_and_params_are_forwarded() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/player_api.php"))
            .and(query_param("action", "get_vod_streams"))
            .and(query_param("category_id", "9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "stream_id": 1, "name": "Movie", "category_id": "9" }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let items = client()
            .streams(&creds(&server), ContentKind::Vod, Some("9"))
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name(), Some("Movie"));
    }

    #[tokio::test]
    async fn test_http_error_is_upstream_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = client()
            .call(&creds(&server), Some("get_live_categories"), &[])
            .await;

        match result {
            Err(DomainError::Upstream { action, message }) => {
                assert_eq!(action, "get_live_categories");
                assert!(message.contains("503"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_and_invalid_bodies() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("action", "get_series"))
            .respond_with(ResponseTemplate::new(200).set_body_string("  "))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("action", "get_live_streams"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let empty = client().call(&creds(&server), Some("get_series"), &[]).await;
        assert!(matches!(empty, Err(DomainError::Upstream { ref message, .. }) if message.contains("Empty")));

        let invalid = client()
            .call(&creds(&server), Some("get_live_streams"), &[])
            .await;
        assert!(matches!(invalid, Err(DomainError::Upstream { ref message, .. }) if message.contains("Invalid JSON")));
    }

    #[tokio::test]
    async fn test_connection_error_does_not_leak_password() {
        let creds = UpstreamCredentials::new("http://127.0.0.1:1", "john", "s3cret");

        let error = client().call(&creds, None, &[]).await.unwrap_err();
        assert!(!error.to_string().contains("s3cret"));
    }
}

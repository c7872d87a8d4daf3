//! Upstream request and response types

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::catalog::deserialize_optional_number_as_string;
use crate::domain::profile::Profile;

/// Where and as whom to call the provider
#[derive(Clone, PartialEq, Eq)]
pub struct UpstreamCredentials {
    pub base_url: String,
    pub username: String,
    pub password: String,
}

impl UpstreamCredentials {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn api_url(&self) -> String {
        format!("{}/player_api.php", self.base_url)
    }

    /// Host part of the base URL, safe for logs
    pub fn host(&self) -> String {
        reqwest::Url::parse(&self.base_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| "unknown".to_string())
    }
}

impl From<&Profile> for UpstreamCredentials {
    fn from(profile: &Profile) -> Self {
        Self::new(profile.url(), profile.username(), profile.password())
    }
}

impl std::fmt::Debug for UpstreamCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamCredentials")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"[hidden]")
            .finish()
    }
}

fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(i64::from(b)),
        _ => None,
    })
}

/// Subscription details from the provider's login response
///
/// The provider echoes the account password back; it is deliberately not
/// captured here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub auth: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_number_as_string")]
    pub exp_date: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_number_as_string")]
    pub is_trial: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_number_as_string")]
    pub active_cons: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_number_as_string")]
    pub max_connections: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_number_as_string")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub allowed_output_formats: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    #[serde(default)]
    pub user_info: UserInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_info: Option<Value>,
}

impl AccountInfo {
    pub fn is_authenticated(&self) -> bool {
        self.user_info.auth == Some(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = UpstreamCredentials::new("http://iptv.example.com/", "john", "s3cret");

        assert_eq!(creds.base_url, "http://iptv.example.com");
        assert_eq!(creds.api_url(), "http://iptv.example.com/player_api.php");
        assert_eq!(creds.host(), "iptv.example.com");
        assert!(!format!("{:?}", creds).contains("s3cret"));
    }

    #[test]
    fn test_account_info_tolerates_mixed_types() {
        let info: AccountInfo = serde_json::from_value(json!({
            "user_info": {
                "username": "john",
                "password": "s3cret",
                "auth": 1,
                "status": "Active",
                "exp_date": "1767225600",
                "is_trial": "0",
                "active_cons": 0,
                "max_connections": "2",
                "allowed_output_formats": ["m3u8", "ts"]
            },
            "server_info": { "url": "iptv.example.com", "port": "8080" }
        }))
        .unwrap();

        assert!(info.is_authenticated());
        assert_eq!(info.user_info.active_cons.as_deref(), Some("0"));
        assert_eq!(info.user_info.max_connections.as_deref(), Some("2"));

        let rendered = serde_json::to_string(&info).unwrap();
        assert!(!rendered.contains("s3cret"));
    }

    #[test]
    fn test_failed_login_is_not_authenticated() {
        let info: AccountInfo = serde_json::from_value(json!({"user_info": {"auth": "0"}})).unwrap();
        assert!(!info.is_authenticated());

        let empty: AccountInfo = serde_json::from_value(json!({})).unwrap();
        assert!(!empty.is_authenticated());
    }
}

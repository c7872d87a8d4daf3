use std::fmt;

use serde::{Deserialize, Serialize};

const REDACTED: &str = "[REDACTED]";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub storage: StorageSettings,
    pub auth: AuthConfig,
    pub verification: VerificationConfig,
    pub email: EmailConfig,
    pub upstream: UpstreamConfig,
    pub profiles: ProfilesConfig,
    pub catalog: CatalogConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_hours: u64,
    /// Keys accepted in the `x-api-key` header; empty disables the check
    pub api_keys: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    pub code_ttl_minutes: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmailProvider {
    /// Write messages to the log instead of sending them
    #[default]
    Log,
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub provider: EmailProvider,
    pub api_url: String,
    pub api_key: Option<String>,
    pub sender_email: String,
    pub sender_name: String,
    pub timeout_secs: u64,
    /// Log message bodies (including codes) at debug level with the log provider
    pub log_body: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilesConfig {
    pub max_per_user: usize,
    /// Check credentials against the provider before saving a profile
    pub verify_on_create: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_url: None,
            max_connections: 10,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_hours: 24,
            api_keys: Vec::new(),
        }
    }
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            code_ttl_minutes: 15,
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            provider: EmailProvider::default(),
            api_url: "https://api.brevo.com/v3/smtp/email".to_string(),
            api_key: None,
            sender_email: "no-reply@localhost".to_string(),
            sender_name: "IPTV Gateway".to_string(),
            timeout_secs: 10,
            log_body: false,
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("iptv-gateway/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for ProfilesConfig {
    fn default() -> Self {
        Self {
            max_per_user: 10,
            verify_on_create: false,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_page_size: 50,
            max_page_size: 500,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("auth.api_keys")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject combinations the server cannot start with
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let fail = |msg: &str| Err(config::ConfigError::Message(msg.to_string()));

        if self.auth.jwt_secret.trim().is_empty() {
            return fail("auth.jwt_secret must not be empty");
        }

        if self.auth.jwt_expiration_hours == 0 {
            return fail("auth.jwt_expiration_hours must be at least 1");
        }

        if self.verification.code_ttl_minutes <= 0 {
            return fail("verification.code_ttl_minutes must be positive");
        }

        if self.storage.backend == StorageBackend::Postgres && self.storage.database_url.is_none() {
            return fail("storage.database_url is required for the postgres backend");
        }

        if self.email.provider == EmailProvider::Http && self.email.api_key.is_none() {
            return fail("email.api_key is required for the http email provider");
        }

        if self.catalog.default_page_size == 0
            || self.catalog.default_page_size > self.catalog.max_page_size
        {
            return fail("catalog.default_page_size must be between 1 and catalog.max_page_size");
        }

        Ok(())
    }

    /// Copy with every secret replaced, safe to print
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();

        config.auth.jwt_secret = REDACTED.to_string();
        config.auth.api_keys = vec![REDACTED.to_string(); config.auth.api_keys.len()];
        config.email.api_key = config.email.api_key.as_ref().map(|_| REDACTED.to_string());
        config.storage.database_url = config.storage.database_url.as_deref().map(redact_url);

        config
    }
}

/// Hide the password part of a connection URL
fn redact_url(url: &str) -> String {
    match reqwest::Url::parse(url) {
        Ok(mut parsed) if parsed.password().is_some() => {
            let _ = parsed.set_password(Some(REDACTED));
            parsed.to_string()
        }
        Ok(parsed) => parsed.to_string(),
        Err(_) => REDACTED.to_string(),
    }
}

impl fmt::Display for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = serde_json::to_string_pretty(&self.redacted()).map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}

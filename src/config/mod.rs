//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, AuthConfig, CatalogConfig, EmailConfig, EmailProvider, LogFormat, LoggingConfig,
    MetricsConfig, ProfilesConfig, ServerConfig, StorageBackend, StorageSettings, UpstreamConfig,
    VerificationConfig,
};

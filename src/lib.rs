//! IPTV Gateway
//!
//! User accounts with email verification, per-user profiles holding
//! upstream Xtream Codes credentials, and a paginated, sortable and
//! searchable proxy over each profile's provider.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use api::state::AppState;
use config::{EmailConfig, EmailProvider};
use domain::DomainError;
use infrastructure::{
    auth::{ApiKeyVerifier, JwtConfig, JwtService},
    catalog::{CatalogService, CatalogSettings},
    email::{EmailSender, HttpEmailConfig, HttpEmailSender, LogEmailSender, Mailer},
    profile::{ProfileLimits, ProfileService},
    storage::{Repositories, StorageFactory},
    user::{Argon2Hasher, UserService},
    verification::{RandomCodeGenerator, VerificationService},
    xtream::{UpstreamClient, XtreamClient, XtreamClientConfig},
};
use tracing::{info, warn};

/// Create the application state with all services initialized
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let repositories = StorageFactory::create(&config.storage).await?;
    info!(backend = ?config.storage.backend, "Storage ready");

    let email_sender = create_email_sender(&config.email)?;

    let upstream: Arc<dyn UpstreamClient> = Arc::new(XtreamClient::new(XtreamClientConfig {
        timeout: Duration::from_secs(config.upstream.timeout_secs),
        user_agent: config.upstream.user_agent.clone(),
    })?);

    Ok(build_app_state(config, repositories, email_sender, upstream))
}

/// Wire services over already constructed adapters
///
/// Tests use this to swap in in-memory storage, a recording email sender
/// and a stub provider.
pub fn build_app_state(
    config: &AppConfig,
    repositories: Repositories,
    email_sender: Arc<dyn EmailSender>,
    upstream: Arc<dyn UpstreamClient>,
) -> AppState {
    let api_keys = ApiKeyVerifier::new(&config.auth.api_keys);
    if api_keys.is_enabled() {
        info!(keys = api_keys.key_count(), "API key check enabled");
    } else {
        warn!("No API keys configured; the API key check is disabled");
    }

    let user_service = UserService::new(repositories.users, Arc::new(Argon2Hasher::new()));

    let verification_service = VerificationService::new(
        repositories.verification_codes,
        Arc::new(RandomCodeGenerator::new()),
        chrono::Duration::minutes(config.verification.code_ttl_minutes),
    );

    let profile_service = ProfileService::new(
        repositories.profiles,
        upstream.clone(),
        ProfileLimits {
            max_per_user: config.profiles.max_per_user,
            verify_credentials: config.profiles.verify_on_create,
        },
    );

    let catalog_service = CatalogService::new(
        upstream,
        CatalogSettings {
            default_page_size: config.catalog.default_page_size,
            max_page_size: config.catalog.max_page_size,
        },
    );

    let jwt_service = JwtService::new(JwtConfig::new(
        config.auth.jwt_secret.clone(),
        config.auth.jwt_expiration_hours,
    ));

    AppState {
        user_service: Arc::new(user_service),
        verification_service: Arc::new(verification_service),
        profile_service: Arc::new(profile_service),
        catalog_service: Arc::new(catalog_service),
        mailer: Arc::new(Mailer::new(email_sender, config.email.sender_name.clone())),
        jwt_service: Arc::new(jwt_service),
        api_keys: Arc::new(api_keys),
    }
}

fn create_email_sender(config: &EmailConfig) -> Result<Arc<dyn EmailSender>, DomainError> {
    match config.provider {
        EmailProvider::Log => {
            warn!("Email provider is 'log'; messages are written to the log only");
            let sender = if config.log_body {
                warn!("email.log_body is set; verification codes will appear in debug logs");
                LogEmailSender::with_body()
            } else {
                LogEmailSender::new()
            };
            Ok(Arc::new(sender))
        }
        EmailProvider::Http => {
            let api_key = config.api_key.clone().ok_or_else(|| {
                DomainError::configuration("email.api_key is required for the http provider")
            })?;

            let sender = HttpEmailSender::new(HttpEmailConfig {
                api_url: config.api_url.clone(),
                api_key,
                sender_email: config.sender_email.clone(),
                sender_name: config.sender_name.clone(),
                timeout: Duration::from_secs(config.timeout_secs),
            })?;

            info!(api_url = %config.api_url, "HTTP email provider configured");
            Ok(Arc::new(sender))
        }
    }
}

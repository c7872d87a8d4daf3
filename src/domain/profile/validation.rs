//! Profile validation utilities

use reqwest::Url;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProfileValidationError {
    #[error("Invalid profile ID '{0}'. Expected a UUID")]
    InvalidId(String),

    #[error("Profile name cannot be empty")]
    EmptyName,

    #[error("Profile name exceeds maximum length of {0} characters")]
    NameTooLong(usize),

    #[error("Provider URL is not valid: {0}")]
    InvalidUrl(String),

    #[error("Provider URL must use http or https")]
    UnsupportedScheme,

    #[error("{0} cannot be empty")]
    EmptyCredential(&'static str),

    #[error("{0} exceeds maximum length of {1} characters")]
    CredentialTooLong(&'static str, usize),
}

const MAX_NAME_LENGTH: usize = 100;
const MAX_CREDENTIAL_LENGTH: usize = 255;

pub fn validate_profile_name(name: &str) -> Result<(), ProfileValidationError> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ProfileValidationError::EmptyName);
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ProfileValidationError::NameTooLong(MAX_NAME_LENGTH));
    }

    Ok(())
}

/// Validate and normalize a provider base URL
///
/// The result keeps scheme, host, port and any path prefix, drops query,
/// fragment and a trailing slash. A trailing `player_api.php` is stripped so
/// users can paste the full API address.
pub fn normalize_provider_url(raw: &str) -> Result<String, ProfileValidationError> {
    let raw = raw.trim();
    let url = Url::parse(raw).map_err(|e| ProfileValidationError::InvalidUrl(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ProfileValidationError::UnsupportedScheme);
    }

    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| ProfileValidationError::InvalidUrl("missing host".to_string()))?;

    let mut base = match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    };

    let path = url.path().trim_end_matches('/');
    let path = path.strip_suffix("/player_api.php").unwrap_or(path);

    if !path.is_empty() {
        base.push_str(path);
    }

    Ok(base)
}

pub fn validate_credential(field: &'static str, value: &str) -> Result<(), ProfileValidationError> {
    if value.trim().is_empty() {
        return Err(ProfileValidationError::EmptyCredential(field));
    }

    if value.chars().count() > MAX_CREDENTIAL_LENGTH {
        return Err(ProfileValidationError::CredentialTooLong(field, MAX_CREDENTIAL_LENGTH));
    }

    Ok(())
}

//! Profile domain - per-user upstream provider credentials

mod entity;
mod validation;

pub use entity::{Profile, ProfileId};
pub use validation::{
    normalize_provider_url, validate_credential, validate_profile_name, ProfileValidationError,
};

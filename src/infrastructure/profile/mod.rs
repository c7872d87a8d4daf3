//! Profile management

mod service;

pub use service::{CreateProfileRequest, ProfileLimits, ProfileService, UpdateProfileRequest};

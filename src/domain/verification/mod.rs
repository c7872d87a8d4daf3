//! Verification domain - one-time codes delivered by email

mod entity;

pub use entity::{
    CodeFormatError, VerificationCode, VerificationCodeValue, VerificationPurpose, CODE_LENGTH,
    MAX_FAILED_ATTEMPTS,
};

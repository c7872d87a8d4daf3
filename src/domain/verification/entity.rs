//! Verification code entity

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::storage::{StorageEntity, StorageKey};
use crate::domain::user::UserId;

/// Number of digits in every verification code
pub const CODE_LENGTH: usize = 6;

/// Wrong guesses tolerated before a code is revoked
pub const MAX_FAILED_ATTEMPTS: u32 = 5;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CodeFormatError {
    #[error("Verification code must be exactly 6 digits")]
    InvalidFormat,
}

/// A six-digit one-time code; leading zeros are significant
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VerificationCodeValue(String);

impl VerificationCodeValue {
    pub fn new(value: impl Into<String>) -> Result<Self, CodeFormatError> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.len() != CODE_LENGTH || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(CodeFormatError::InvalidFormat);
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Build a code from a number in `0..1_000_000`, zero padded
    pub fn from_number(number: u32) -> Self {
        Self(format!("{:06}", number % 1_000_000))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for VerificationCodeValue {
    type Error = CodeFormatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VerificationCodeValue> for String {
    fn from(value: VerificationCodeValue) -> Self {
        value.0
    }
}

impl StorageKey for VerificationCodeValue {
    fn as_str(&self) -> &str {
        &self.0
    }
}

/// What a code authorizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationPurpose {
    EmailVerification,
    PasswordReset,
}

impl VerificationPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmailVerification => "email_verification",
            Self::PasswordReset => "password_reset",
        }
    }
}

impl std::fmt::Display for VerificationPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Code issued to a user for a single purpose
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationCode {
    code: VerificationCodeValue,
    user_id: UserId,
    purpose: VerificationPurpose,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    consumed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    failed_attempts: u32,
}

impl VerificationCode {
    pub fn new(
        code: VerificationCodeValue,
        user_id: UserId,
        purpose: VerificationPurpose,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();

        Self {
            code,
            user_id,
            purpose,
            created_at: now,
            expires_at: now + ttl,
            consumed_at: None,
            failed_attempts: 0,
        }
    }

    pub fn code(&self) -> &VerificationCodeValue {
        &self.code
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn purpose(&self) -> VerificationPurpose {
        self.purpose
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn consumed_at(&self) -> Option<DateTime<Utc>> {
        self.consumed_at
    }

    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_exhausted(&self) -> bool {
        self.failed_attempts >= MAX_FAILED_ATTEMPTS
    }

    /// Not consumed, not expired at `now` and not locked by wrong guesses
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.consumed_at.is_none() && !self.is_expired_at(now) && !self.is_exhausted()
    }

    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }

    /// Whether this code was issued to `user_id` for `purpose`
    pub fn belongs_to(&self, user_id: &UserId, purpose: VerificationPurpose) -> bool {
        &self.user_id == user_id && self.purpose == purpose
    }

    /// Count a wrong guess against this code; returns the new total
    pub fn record_failed_attempt(&mut self) -> u32 {
        self.failed_attempts = self.failed_attempts.saturating_add(1);
        self.failed_attempts
    }

    pub fn consume(&mut self) {
        if self.consumed_at.is_none() {
            self.consumed_at = Some(Utc::now());
        }
    }
}

impl StorageEntity for VerificationCode {
    type Key = VerificationCodeValue;

    fn key(&self) -> &Self::Key {
        &self.code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(value: &str, ttl: Duration) -> VerificationCode {
        VerificationCode::new(
            VerificationCodeValue::new(value).unwrap(),
            UserId::generate(),
            VerificationPurpose::EmailVerification,
            ttl,
        )
    }

    #[test]
    fn test_code_value_format() {
        assert!(VerificationCodeValue::new("012345").is_ok());
        assert_eq!(VerificationCodeValue::new(" 987654 ").unwrap().as_str(), "987654");
        assert!(VerificationCodeValue::new("12345").is_err());
        assert!(VerificationCodeValue::new("1234567").is_err());
        assert!(VerificationCodeValue::new("12a456").is_err());
        assert!(VerificationCodeValue::new("").is_err());
    }

    #[test]
    fn test_from_number_pads_leading_zeros() {
        assert_eq!(VerificationCodeValue::from_number(42).as_str(), "000042");
        assert_eq!(VerificationCodeValue::from_number(999_999).as_str(), "999999");
    }

    #[test]
    fn test_active_until_expiry() {
        let c = code("123456", Duration::minutes(10));
        let now = c.created_at();

        assert!(c.is_active_at(now));
        assert!(c.is_active_at(now + Duration::minutes(9)));
        assert!(!c.is_active_at(now + Duration::minutes(10)));
    }

    #[test]
    fn test_consumed_code_is_inactive() {
        let mut c = code("123456", Duration::minutes(10));
        c.consume();

        assert!(c.consumed_at().is_some());
        assert!(!c.is_active());
    }

    #[test]
    fn test_belongs_to() {
        let c = code("123456", Duration::minutes(10));
        let owner = c.user_id().clone();

        assert!(c.belongs_to(&owner, VerificationPurpose::EmailVerification));
        assert!(!c.belongs_to(&owner, VerificationPurpose::PasswordReset));
        assert!(!c.belongs_to(&UserId::generate(), VerificationPurpose::EmailVerification));
    }

    #[test]
    fn test_serde_round_trip_keeps_leading_zeros() {
        let c = code("000123", Duration::minutes(5));
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["code"], "000123");

        let back: VerificationCode = serde_json::from_value(json).unwrap();
        assert_eq!(back.code().as_str(), "000123");
    }

    #[test]
    fn test_failed_attempts_exhaust_code() {
        let mut code = code("123456", Duration::minutes(15));

        for _ in 1..MAX_FAILED_ATTEMPTS {
            code.record_failed_attempt();
        }
        assert!(code.is_active());

        assert_eq!(code.record_failed_attempt(), MAX_FAILED_ATTEMPTS);
        assert!(code.is_exhausted());
        assert!(!code.is_active());
    }

    #[test]
    fn test_failed_attempts_default_when_missing() {
        let stored = serde_json::json!({
            "code": "000111",
            "user_id": UserId::generate().as_str(),
            "purpose": "password_reset",
            "created_at": "2026-01-01T00:00:00Z",
            "expires_at": "2026-01-01T00:15:00Z"
        });

        let code: VerificationCode = serde_json::from_value(stored).unwrap();
        assert_eq!(code.failed_attempts(), 0);
    }
}

//! Issuing and redeeming one-time verification codes

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::domain::storage::Storage;
use crate::domain::user::UserId;
use crate::domain::verification::{VerificationCode, VerificationCodeValue, VerificationPurpose};
use crate::domain::DomainError;

use super::generator::CodeGenerator;

const MAX_GENERATION_ATTEMPTS: usize = 10;
const INVALID_CODE_MESSAGE: &str = "Invalid or expired verification code";

#[derive(Debug)]
pub struct VerificationService {
    codes: Arc<dyn Storage<VerificationCode>>,
    generator: Arc<dyn CodeGenerator>,
    ttl: Duration,
}

impl VerificationService {
    pub fn new(
        codes: Arc<dyn Storage<VerificationCode>>,
        generator: Arc<dyn CodeGenerator>,
        ttl: Duration,
    ) -> Self {
        Self {
            codes,
            generator,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a fresh code, revoking the user's earlier codes for `purpose`
    ///
    /// The value is never shared with another active code.
    pub async fn issue(
        &self,
        user_id: &UserId,
        purpose: VerificationPurpose,
    ) -> Result<VerificationCode, DomainError> {
        let revoked = self.revoke(user_id, purpose).await?;
        if revoked > 0 {
            tracing::debug!(user_id = %user_id, %purpose, revoked, "Revoked previous codes");
        }

        for _ in 0..MAX_GENERATION_ATTEMPTS {
            let value = self.generator.generate();
            let code = VerificationCode::new(value, user_id.clone(), purpose, self.ttl);

            let stored = match self.codes.get(code.code()).await? {
                Some(holder) if holder.is_active() => continue,
                Some(_) => self.codes.save(code).await,
                None => self.codes.create(code).await,
            };

            match stored {
                Ok(code) => {
                    tracing::info!(user_id = %user_id, %purpose, "Verification code issued");
                    return Ok(code);
                }
                Err(DomainError::Conflict { .. }) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(DomainError::internal(
            "Could not allocate a unique verification code",
        ))
    }

    /// Redeem a code; succeeds at most once per issued code
    ///
    /// A wrong guess counts against the user's active code for `purpose`,
    /// which is revoked after `MAX_FAILED_ATTEMPTS` misses.
    pub async fn consume(
        &self,
        user_id: &UserId,
        purpose: VerificationPurpose,
        raw_code: &str,
    ) -> Result<(), DomainError> {
        let Some(mut code) = self.find_redeemable(user_id, purpose, raw_code).await? else {
            self.record_failure(user_id, purpose).await?;
            return Err(DomainError::validation(INVALID_CODE_MESSAGE));
        };

        // Delete is the single point where concurrent redemptions race
        if !self.codes.delete(code.code()).await? {
            return Err(DomainError::validation(INVALID_CODE_MESSAGE));
        }

        // Keep a consumed marker unless the value was already reissued
        code.consume();
        match self.codes.create(code).await {
            Ok(_) | Err(DomainError::Conflict { .. }) => {}
            Err(e) => return Err(e),
        }

        tracing::info!(user_id = %user_id, %purpose, "Verification code consumed");
        Ok(())
    }

    /// Delete consumed and expired codes
    pub async fn purge_expired(&self) -> Result<usize, DomainError> {
        let now = Utc::now();
        let mut purged = 0;

        for code in self.codes.list().await? {
            if !code.is_active_at(now) && self.codes.delete(code.code()).await? {
                purged += 1;
            }
        }

        if purged > 0 {
            tracing::info!(purged, "Purged inactive verification codes");
        }

        Ok(purged)
    }

    async fn revoke(
        &self,
        user_id: &UserId,
        purpose: VerificationPurpose,
    ) -> Result<usize, DomainError> {
        let mut revoked = 0;

        for code in self.codes.list().await? {
            if code.belongs_to(user_id, purpose)
                && code.is_active()
                && self.codes.delete(code.code()).await?
            {
                revoked += 1;
            }
        }

        Ok(revoked)
    }

    async fn find_redeemable(
        &self,
        user_id: &UserId,
        purpose: VerificationPurpose,
        raw_code: &str,
    ) -> Result<Option<VerificationCode>, DomainError> {
        let Ok(value) = VerificationCodeValue::new(raw_code) else {
            return Ok(None);
        };

        Ok(self
            .codes
            .get(&value)
            .await?
            .filter(|code| code.belongs_to(user_id, purpose) && code.is_active()))
    }

    async fn record_failure(
        &self,
        user_id: &UserId,
        purpose: VerificationPurpose,
    ) -> Result<(), DomainError> {
        let active = self
            .codes
            .list()
            .await?
            .into_iter()
            .find(|code| code.belongs_to(user_id, purpose) && code.is_active());

        let Some(mut code) = active else {
            return Ok(());
        };

        let attempts = code.record_failed_attempt();
        if code.is_exhausted() {
            self.codes.delete(code.code()).await?;
            tracing::warn!(
                user_id = %user_id,
                %purpose,
                attempts,
                "Verification code revoked after failed attempts"
            );
        } else {
            self.codes.save(code).await?;
            tracing::debug!(user_id = %user_id, %purpose, attempts, "Wrong verification code");
        }

        Ok(())
    }
}

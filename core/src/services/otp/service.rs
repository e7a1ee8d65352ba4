//! OTP ledger implementation

use chrono::Utc;
use constant_time_eq::constant_time_eq;
use rand::{rngs::OsRng, Rng};
use sha2::{Digest, Sha256};
use tracing::debug;
use uuid::Uuid;

use crate::domain::entities::{OtpPurpose, OtpRecord};
use crate::errors::{AuthError, DomainResult};
use crate::repositories::OtpRepository;

use super::config::OtpServiceConfig;

/// Hex-encoded SHA-256 digest of a code, as stored by the ledger
pub fn hash_code(code: &str) -> String {
    hex::encode(Sha256::digest(code.as_bytes()))
}

/// Issues and validates one-time passwords inside a caller's unit of work
#[derive(Debug, Clone)]
pub struct OtpService {
    config: OtpServiceConfig,
}

impl OtpService {
    pub fn new(config: OtpServiceConfig) -> Self {
        Self { config }
    }

    /// Generate a uniformly random numeric code using the OS RNG
    pub fn generate_code(&self) -> String {
        let mut rng = OsRng;
        (0..self.config.code_length)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect()
    }

    /// Issue a new code for `(user_id, purpose)`, replacing any previous one
    ///
    /// # Returns
    ///
    /// The plaintext code. It is not persisted and must go straight into the
    /// outgoing email job.
    pub async fn issue<R>(&self, repo: &mut R, user_id: Uuid, purpose: OtpPurpose) -> DomainResult<String>
    where
        R: OtpRepository + ?Sized,
    {
        let code = self.generate_code();
        let record = OtpRecord::new(user_id, purpose, hash_code(&code), Utc::now(), self.config.ttl);
        repo.replace_otp(&record).await?;

        debug!(
            event = "otp_issued",
            user_id = %user_id,
            purpose = purpose.as_str(),
            expires_at = %record.expires_at,
            "One-time password issued"
        );
        Ok(code)
    }

    /// Validate and consume a code
    ///
    /// The comparison runs in constant time. On success the record is deleted
    /// so the code cannot be replayed.
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidVerificationCode` - No active code, or the code does not match
    /// * `AuthError::VerificationCodeExpired` - The code matched a record past its expiry
    pub async fn validate<R>(
        &self,
        repo: &mut R,
        user_id: Uuid,
        purpose: OtpPurpose,
        code: &str,
    ) -> DomainResult<()>
    where
        R: OtpRepository + ?Sized,
    {
        let record = repo
            .find_otp(user_id, purpose)
            .await?
            .ok_or(AuthError::InvalidVerificationCode)?;

        if record.is_expired_at(Utc::now()) {
            return Err(AuthError::VerificationCodeExpired.into());
        }

        let candidate = hash_code(code.trim());
        if !constant_time_eq(candidate.as_bytes(), record.code_hash.as_bytes()) {
            return Err(AuthError::InvalidVerificationCode.into());
        }

        repo.delete_otps(user_id, purpose).await?;
        debug!(event = "otp_consumed", user_id = %user_id, "One-time password consumed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DomainError;
    use crate::repositories::{AuthStore, InMemoryAuthStore};
    use chrono::Duration;

    fn service() -> OtpService {
        OtpService::new(OtpServiceConfig::default())
    }

    #[test]
    fn test_generated_codes_are_numeric_with_configured_length() {
        let otp = OtpService::new(OtpServiceConfig {
            code_length: 8,
            ttl: Duration::minutes(1),
        });
        for _ in 0..50 {
            let code = otp.generate_code();
            assert_eq!(code.len(), 8);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_hash_code_is_sha256_hex() {
        let digest = hash_code("123456");
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, hash_code("123456"));
        assert_ne!(digest, hash_code("654321"));
    }

    #[tokio::test]
    async fn test_code_is_single_use() {
        let store = InMemoryAuthStore::new();
        let otp = service();
        let user_id = Uuid::new_v4();

        let mut tx = store.begin().await.unwrap();
        let code = otp.issue(tx.as_mut(), user_id, OtpPurpose::Verification).await.unwrap();
        otp.validate(tx.as_mut(), user_id, OtpPurpose::Verification, &code)
            .await
            .unwrap();

        let replay = otp
            .validate(tx.as_mut(), user_id, OtpPurpose::Verification, &code)
            .await
            .unwrap_err();
        assert!(matches!(replay, DomainError::Auth(AuthError::InvalidVerificationCode)));
    }

    #[tokio::test]
    async fn test_reissue_invalidates_previous_code() {
        let store = InMemoryAuthStore::new();
        let otp = service();
        let user_id = Uuid::new_v4();

        let mut tx = store.begin().await.unwrap();
        let first = otp.issue(tx.as_mut(), user_id, OtpPurpose::Verification).await.unwrap();
        let mut second = otp.issue(tx.as_mut(), user_id, OtpPurpose::Verification).await.unwrap();
        while second == first {
            second = otp.issue(tx.as_mut(), user_id, OtpPurpose::Verification).await.unwrap();
        }

        let err = otp
            .validate(tx.as_mut(), user_id, OtpPurpose::Verification, &first)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Auth(AuthError::InvalidVerificationCode)));
        assert!(otp
            .validate(tx.as_mut(), user_id, OtpPurpose::Verification, &second)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_expired_code_is_distinct_from_wrong_code() {
        let store = InMemoryAuthStore::new();
        let otp = service();
        let user_id = Uuid::new_v4();
        let issued = Utc::now() - Duration::minutes(11);
        let record = OtpRecord::new(
            user_id,
            OtpPurpose::Verification,
            hash_code("111111"),
            issued,
            Duration::minutes(10),
        );

        let mut tx = store.begin().await.unwrap();
        tx.replace_otp(&record).await.unwrap();

        let err = otp
            .validate(tx.as_mut(), user_id, OtpPurpose::Verification, "111111")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Auth(AuthError::VerificationCodeExpired)));
    }

    #[tokio::test]
    async fn test_wrong_code_keeps_record() {
        let store = InMemoryAuthStore::new();
        let otp = service();
        let user_id = Uuid::new_v4();

        let mut tx = store.begin().await.unwrap();
        let code = otp.issue(tx.as_mut(), user_id, OtpPurpose::Verification).await.unwrap();
        let wrong = if code == "000000" { "000001" } else { "000000" };

        assert!(otp
            .validate(tx.as_mut(), user_id, OtpPurpose::Verification, wrong)
            .await
            .is_err());
        assert!(otp
            .validate(tx.as_mut(), user_id, OtpPurpose::Verification, &code)
            .await
            .is_ok());
    }
}

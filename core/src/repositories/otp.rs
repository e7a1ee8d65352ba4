//! One-time password repository trait.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::{OtpPurpose, OtpRecord};
use crate::errors::DomainError;

#[async_trait]
pub trait OtpRepository: Send {
    /// Store `record` as the only active code for its (user, purpose) pair,
    /// removing any previous one.
    async fn replace_otp(&mut self, record: &OtpRecord) -> Result<(), DomainError>;

    /// The active code for a (user, purpose) pair, if any
    async fn find_otp(
        &mut self,
        user_id: Uuid,
        purpose: OtpPurpose,
    ) -> Result<Option<OtpRecord>, DomainError>;

    /// Remove every code for a (user, purpose) pair
    async fn delete_otps(&mut self, user_id: Uuid, purpose: OtpPurpose) -> Result<(), DomainError>;
}

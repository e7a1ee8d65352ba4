//! bcrypt-backed credential store

use tracing::error;

use crate::errors::{DomainError, DomainResult};

/// Hashes and verifies passwords with bcrypt
///
/// bcrypt is CPU bound, so both operations run on the blocking pool instead
/// of stalling the async executor.
#[derive(Debug, Clone, Copy)]
pub struct CredentialService {
    cost: u32,
}

impl Default for CredentialService {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl CredentialService {
    /// Create a credential service with the given bcrypt work factor
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a plaintext password
    ///
    /// # Returns
    ///
    /// The bcrypt hash string, or `DomainError::Internal` if hashing failed
    pub async fn hash_password(&self, plain: &str) -> DomainResult<String> {
        let plain = plain.to_owned();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost))
            .await
            .map_err(|e| DomainError::internal(format!("Hashing task failed: {}", e)))?
            .map_err(|e| {
                error!(event = "password_hash_failed", error = %e, "Failed to hash password");
                DomainError::internal("Failed to hash password")
            })
    }

    /// Check a plaintext password against a stored hash
    ///
    /// A malformed stored hash verifies as `false`.
    pub async fn verify_password(&self, plain: &str, hash: &str) -> DomainResult<bool> {
        let plain = plain.to_owned();
        let hash = hash.to_owned();
        let matches = tokio::task::spawn_blocking(move || bcrypt::verify(plain, &hash).unwrap_or(false))
            .await
            .map_err(|e| DomainError::internal(format!("Hashing task failed: {}", e)))?;
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_then_verify() {
        let credentials = CredentialService::new(4);
        let hash = credentials.hash_password("Secret123!").await.unwrap();

        assert_ne!(hash, "Secret123!");
        assert!(credentials.verify_password("Secret123!", &hash).await.unwrap());
        assert!(!credentials.verify_password("secret123!", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash_does_not_verify() {
        let credentials = CredentialService::new(4);
        assert!(!credentials.verify_password("anything", "not-a-bcrypt-hash").await.unwrap());
    }

    #[tokio::test]
    async fn test_hashes_are_salted() {
        let credentials = CredentialService::new(4);
        let a = credentials.hash_password("Secret123!").await.unwrap();
        let b = credentials.hash_password("Secret123!").await.unwrap();
        assert_ne!(a, b);
    }
}

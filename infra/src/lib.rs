//! # Infrastructure Layer
//!
//! Concrete implementations of the collaborators the core crate depends on.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Database**: MySQL implementation of the transactional auth store using SQLx
//! - **Queue**: Redis-backed durable notification job queue
//! - **Mail**: SMTP mail transport using lettre, plus a logging fallback
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)
//! - `redis-queue`: Enable the Redis job queue (default)

use sf_core::errors::DomainError;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Durable job queue backed by Redis
#[cfg(feature = "redis-queue")]
pub mod queue;

/// Mail transports
pub mod mail;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection or query error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Redis error
    #[error("Queue error: {0}")]
    Queue(#[from] redis::RedisError),

    /// Stored data could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A stored row or entry does not match the domain model
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        tracing::error!(event = "infrastructure_error", error = %err, "Infrastructure failure");
        DomainError::internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_core::errors::ErrorKind;

    #[test]
    fn test_infrastructure_errors_are_internal() {
        let err: DomainError = InfrastructureError::Config("missing url".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.public_message(), "Internal server error");
    }
}

//! Domain-specific error types and error handling.

mod types;

pub use types::{AuthError, TokenError, ValidationError};

use thiserror::Error;

/// Coarse classification of a [`DomainError`], used by the presentation
/// layer to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller could not be authenticated
    Unauthorized,
    /// The caller is authenticated but lacks permission
    Forbidden,
    Conflict,
    NotFound,
    BadRequest,
    Internal,
}

/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{message}")]
    Conflict { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("{message}")]
    BadRequest { message: String },

    #[error("{message}")]
    Forbidden { message: String },

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl DomainError {
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict { message: message.into() }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into() }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// Classify the error for the boundary layer
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Conflict { .. } => ErrorKind::Conflict,
            DomainError::NotFound { .. } => ErrorKind::NotFound,
            DomainError::BadRequest { .. } | DomainError::Validation(_) => ErrorKind::BadRequest,
            DomainError::Forbidden { .. } => ErrorKind::Forbidden,
            DomainError::Unauthorized | DomainError::Auth(_) => ErrorKind::Unauthorized,
            DomainError::Token(TokenError::TokenGenerationFailed) => ErrorKind::Internal,
            DomainError::Token(_) => ErrorKind::Unauthorized,
            DomainError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Message safe to return to clients. Internal details are replaced by a
    /// generic message.
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::Internal => String::from("Internal server error"),
            _ => self.to_string(),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_and_forbidden_are_distinct() {
        assert_eq!(DomainError::Unauthorized.kind(), ErrorKind::Unauthorized);
        assert_eq!(DomainError::forbidden("no").kind(), ErrorKind::Forbidden);
        assert_eq!(
            DomainError::from(AuthError::InvalidCredentials).kind(),
            ErrorKind::Unauthorized
        );
    }

    #[test]
    fn test_token_errors_classify_as_unauthorized() {
        assert_eq!(DomainError::from(TokenError::TokenExpired).kind(), ErrorKind::Unauthorized);
        assert_eq!(
            DomainError::from(TokenError::InvalidSignature).kind(),
            ErrorKind::Unauthorized
        );
        assert_eq!(
            DomainError::from(TokenError::TokenGenerationFailed).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_validation_is_bad_request() {
        let err = DomainError::from(ValidationError::PasswordUnchanged);
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(
            err.public_message(),
            "New password must be different from current password"
        );
    }

    #[test]
    fn test_internal_message_is_hidden() {
        let err = DomainError::internal("pool timed out after 30s");
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_conflict_message() {
        let err = DomainError::conflict("Email already in use");
        assert_eq!(err.to_string(), "Email already in use");
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }
}

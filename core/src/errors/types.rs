//! Domain-specific error types for authentication, tokens and validation
//!
//! The presentation layer maps these to status codes through
//! [`DomainError::kind`](super::DomainError::kind); messages are safe to show
//! to clients and never contain secrets.

use thiserror::Error;

/// Authentication-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown email or wrong password. The two cases are deliberately
    /// indistinguishable.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Wrong credentials")]
    WrongPassword,

    #[error("Invalid verification code")]
    InvalidVerificationCode,

    #[error("Verification code expired")]
    VerificationCodeExpired,

    #[error("Invalid or expired reset link")]
    InvalidResetToken,

    #[error("User not found or unverified")]
    AccountNotActive,

    #[error("Authentication required")]
    MissingCredentials,
}

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token format")]
    InvalidTokenFormat,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid claims")]
    InvalidClaims,

    #[error("Refresh token expired")]
    RefreshTokenExpired,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Token generation failed")]
    TokenGenerationFailed,
}

/// Validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field: {field}")]
    RequiredField { field: String },

    #[error("Invalid format: {field}")]
    InvalidFormat { field: String },

    #[error("Invalid length: {field} (min: {min}, max: {max})")]
    InvalidLength { field: String, min: usize, max: usize },

    #[error("Invalid email")]
    InvalidEmail,

    #[error("Password must be at least 8 characters and include upper and lower case letters, a number and a symbol")]
    WeakPassword,

    #[error("New password must be different from current password")]
    PasswordUnchanged,

    #[error("Duplicate value: {field}")]
    DuplicateValue { field: String },
}

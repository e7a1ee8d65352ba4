//! Request and response bodies for the account endpoints.
//!
//! Field names are camelCase on the wire. Structural checks (required
//! fields, email shape, lengths) happen here; password policy and account
//! rules are enforced by the account service.

use serde::{Deserialize, Serialize};
use validator::Validate;

use sf_core::domain::entities::TokenPair;
use sf_core::domain::value_objects::UserSummary;
use sf_core::services::account::{LoginRequest, SignupRequest};

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupBody {
    #[validate(email(message = "email must be an email"))]
    pub email: String,

    #[validate(length(min = 1, max = 100, message = "name must be between 1 and 100 characters"))]
    pub name: String,

    #[validate(length(min = 1, message = "password should not be empty"))]
    pub password: String,

    #[validate(length(max = 32, message = "phone must be at most 32 characters"))]
    pub phone: Option<String>,

    #[validate(length(max = 255, message = "address must be at most 255 characters"))]
    pub address: Option<String>,
}

impl From<SignupBody> for SignupRequest {
    fn from(body: SignupBody) -> Self {
        Self {
            email: body.email,
            password: body.password,
            name: body.name,
            phone: body.phone,
            address: body.address,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    #[validate(email(message = "email must be an email"))]
    pub email: String,

    #[validate(length(min = 1, message = "password should not be empty"))]
    pub password: String,

    pub otp: Option<String>,
}

impl From<LoginBody> for LoginRequest {
    fn from(body: LoginBody) -> Self {
        Self {
            email: body.email,
            password: body.password,
            otp: body.otp,
        }
    }
}

/// Body of `resend-otp` and `forgot-password`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmailBody {
    #[validate(email(message = "email must be an email"))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenBody {
    #[validate(length(min = 1, message = "refreshToken should not be empty"))]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordBody {
    #[validate(length(min = 1, message = "oldPassword should not be empty"))]
    pub old_password: String,

    #[validate(length(min = 1, message = "newPassword should not be empty"))]
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordBody {
    #[validate(length(min = 1, message = "newPassword should not be empty"))]
    pub new_password: String,

    #[validate(length(min = 1, message = "resetToken should not be empty"))]
    pub reset_token: String,
}

/// Plain `{ "message": ... }` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Account verification state reported by login
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VerificationStatus {
    Unverified,
    Verified,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

impl From<TokenPair> for TokenResponse {
    fn from(tokens: TokenPair) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
        }
    }
}

/// Login response; token fields are absent while verification is pending
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub status: VerificationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
    #[serde(flatten)]
    pub tokens: Option<TokenResponse>,
}

impl LoginResponse {
    pub fn verification_required() -> Self {
        Self {
            message: "Account verification required".to_string(),
            status: VerificationStatus::Unverified,
            user: None,
            tokens: None,
        }
    }

    pub fn authenticated(tokens: TokenPair, user: UserSummary) -> Self {
        Self {
            message: "Login successful".to_string(),
            status: VerificationStatus::Verified,
            user: Some(user),
            tokens: Some(tokens.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordResponse {
    pub message: String,
    pub tokens: TokenResponse,
}

//! Request types and fixed response messages for the account service

use serde::{Deserialize, Serialize};

/// Returned by `forgot_password` whether or not the account exists
pub const FORGOT_PASSWORD_MESSAGE: &str = "If this user exists, they will receive an email";

/// Returned by `resend_otp` whether or not the account exists
pub const RESEND_OTP_MESSAGE: &str = "If your account exists, a new OTP has been sent";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl SignupRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            name: name.into(),
            phone: None,
            address: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Verification code, only consulted for unverified accounts
    pub otp: Option<String>,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            otp: None,
        }
    }

    pub fn with_otp(mut self, otp: impl Into<String>) -> Self {
        self.otp = Some(otp.into());
        self
    }
}

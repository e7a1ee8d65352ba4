//! Account lifecycle: signup, login with OTP verification, token refresh and
//! password management.

pub mod config;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use config::AccountServiceConfig;
pub use service::AccountService;
pub use types::{
    LoginRequest, SignupRequest, FORGOT_PASSWORD_MESSAGE, RESEND_OTP_MESSAGE,
};

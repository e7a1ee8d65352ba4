//! Configuration for the account service

use sf_shared::AuthConfig;

use crate::services::otp::OtpServiceConfig;
use crate::services::reset::ResetServiceConfig;

/// Configuration for the account service
#[derive(Debug, Clone)]
pub struct AccountServiceConfig {
    /// bcrypt work factor for new password hashes
    pub bcrypt_cost: u32,
    /// Role assigned to every new account
    pub default_role: String,
    pub otp: OtpServiceConfig,
    pub reset: ResetServiceConfig,
}

impl Default for AccountServiceConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: 10,
            default_role: "customer".to_string(),
            otp: OtpServiceConfig::default(),
            reset: ResetServiceConfig::default(),
        }
    }
}

impl From<&AuthConfig> for AccountServiceConfig {
    fn from(config: &AuthConfig) -> Self {
        Self {
            bcrypt_cost: config.bcrypt_cost,
            default_role: config.default_role.clone(),
            otp: OtpServiceConfig::from(&config.otp),
            reset: ResetServiceConfig::from(&config.reset),
        }
    }
}

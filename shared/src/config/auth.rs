//! Authentication configuration: token signing, OTP and reset-token policy

use serde::{Deserialize, Serialize};

const DEFAULT_ACCESS_SECRET: &str = "access-secret-change-in-production";
const DEFAULT_REFRESH_SECRET: &str = "refresh-secret-change-in-production";

/// JWT signing configuration
///
/// Access and refresh tokens are signed with separate secrets so a leaked
/// access secret cannot be used to mint refresh tokens.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Secret used to sign access tokens
    pub access_secret: String,

    /// Secret used to sign refresh tokens
    pub refresh_secret: String,

    /// Access token expiry time in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    pub refresh_token_expiry: i64,

    /// JWT issuer claim
    pub issuer: String,

    /// JWT audience claim
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_secret: String::from(DEFAULT_ACCESS_SECRET),
            refresh_secret: String::from(DEFAULT_REFRESH_SECRET),
            access_token_expiry: 3600,    // 1 hour
            refresh_token_expiry: 604800, // 7 days
            issuer: String::from("storefront"),
            audience: String::from("storefront-api"),
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with both secrets
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            ..Default::default()
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }

    /// Check if either secret is still the built-in default (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.access_secret == DEFAULT_ACCESS_SECRET || self.refresh_secret == DEFAULT_REFRESH_SECRET
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            access_secret: std::env::var("JWT_ACCESS_SECRET").unwrap_or(defaults.access_secret),
            refresh_secret: std::env::var("JWT_REFRESH_SECRET").unwrap_or(defaults.refresh_secret),
            access_token_expiry: env_or("JWT_ACCESS_EXPIRES_IN", defaults.access_token_expiry),
            refresh_token_expiry: env_or("JWT_REFRESH_EXPIRES_IN", defaults.refresh_token_expiry),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or(defaults.audience),
        }
    }
}

/// One-time password policy
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OtpConfig {
    /// Number of digits in a code
    pub length: usize,

    /// Code lifetime in seconds
    pub ttl_seconds: i64,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            length: 6,
            ttl_seconds: 600, // 10 minutes
        }
    }
}

/// Password reset token policy
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResetConfig {
    /// Reset token lifetime in seconds
    pub ttl_seconds: i64,

    /// Minimum spacing between two reset emails for one account, in seconds
    pub rate_limit_seconds: i64,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 3600,      // 1 hour
            rate_limit_seconds: 300, // 5 minutes
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,

    /// OTP configuration
    #[serde(default)]
    pub otp: OtpConfig,

    /// Reset token configuration
    #[serde(default)]
    pub reset: ResetConfig,

    /// bcrypt work factor
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,

    /// Role assigned to self-registered accounts
    #[serde(default = "default_role_name")]
    pub default_role: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt: JwtConfig::default(),
            otp: OtpConfig::default(),
            reset: ResetConfig::default(),
            bcrypt_cost: default_bcrypt_cost(),
            default_role: default_role_name(),
        }
    }
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let otp_defaults = OtpConfig::default();
        let reset_defaults = ResetConfig::default();
        Self {
            jwt: JwtConfig::from_env(),
            otp: OtpConfig {
                length: otp_defaults.length,
                ttl_seconds: env_or("OTP_TTL_SECONDS", otp_defaults.ttl_seconds),
            },
            reset: ResetConfig {
                ttl_seconds: env_or("RESET_TOKEN_TTL_SECONDS", reset_defaults.ttl_seconds),
                rate_limit_seconds: env_or(
                    "RESET_RATE_LIMIT_SECONDS",
                    reset_defaults.rate_limit_seconds,
                ),
            },
            bcrypt_cost: env_or("BCRYPT_COST", default_bcrypt_cost()),
            default_role: std::env::var("DEFAULT_ROLE").unwrap_or_else(|_| default_role_name()),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn default_bcrypt_cost() -> u32 {
    10
}

fn default_role_name() -> String {
    String::from("customer")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_config_default() {
        let config = JwtConfig::default();
        assert_eq!(config.access_token_expiry, 3600);
        assert_eq!(config.refresh_token_expiry, 604800);
        assert!(config.is_using_default_secret());
    }

    #[test]
    fn test_jwt_config_builder() {
        let config = JwtConfig::new("access", "refresh")
            .with_access_expiry_minutes(30)
            .with_refresh_expiry_days(14);

        assert_eq!(config.access_token_expiry, 1800);
        assert_eq!(config.refresh_token_expiry, 1209600);
        assert!(!config.is_using_default_secret());
    }

    #[test]
    fn test_auth_config_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.otp.length, 6);
        assert_eq!(config.reset.ttl_seconds, 3600);
        assert_eq!(config.reset.rate_limit_seconds, 300);
        assert_eq!(config.bcrypt_cost, 10);
        assert_eq!(config.default_role, "customer");
    }
}

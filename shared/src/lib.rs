//! Shared utilities and common types for the Storefront server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types loaded from the environment
//! - The API error envelope and error codes
//! - Input validation helpers (email format, password policy)

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, CacheConfig, CorsConfig, DatabaseConfig, Environment, JwtConfig,
    LogFormat, LoggingConfig, MailConfig, OtpConfig, ResetConfig, ServerConfig, WorkerConfig,
};
pub use errors::{error_codes, ErrorResponse};
pub use utils::validation;

//! One-time password ledger
//!
//! Issues numeric codes, stores only their SHA-256 digest and consumes a code
//! on its first successful validation.

mod config;
mod service;

pub use config::OtpServiceConfig;
pub use service::{hash_code, OtpService};

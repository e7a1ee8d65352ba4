//! Password reset token ledger

mod service;

pub use service::{ResetServiceConfig, ResetTokenService, RESET_TOKEN_LENGTH};

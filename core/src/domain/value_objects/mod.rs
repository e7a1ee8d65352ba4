//! Value objects representing immutable domain concepts.

pub mod auth_response;
pub mod principal;

// Re-export commonly used types
pub use auth_response::{LoginOutcome, UserSummary};
pub use principal::Principal;

//! Database module - MySQL implementations using SQLx
//!
//! - Connection pool management
//! - Transactional auth store over users, roles, OTPs and reset tokens
//! - Embedded schema migrations

pub mod connection;
pub mod mysql;

// Re-export commonly used types
pub use connection::{DatabasePool, PoolStatistics};
pub use mysql::{MySqlAuthStore, MySqlAuthTransaction};

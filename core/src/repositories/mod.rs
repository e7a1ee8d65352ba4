//! Repository interfaces for authentication state, plus an in-memory store.

pub mod memory;
pub mod otp;
pub mod reset_token;
pub mod role;
pub mod store;
pub mod user;

pub use memory::InMemoryAuthStore;
pub use otp::OtpRepository;
pub use reset_token::ResetTokenRepository;
pub use role::RoleRepository;
pub use store::{AuthStore, AuthTransaction};
pub use user::UserRepository;

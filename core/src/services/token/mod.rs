//! Token service module for JWT management
//!
//! Access and refresh tokens are stateless HS256 JWTs signed with separate
//! secrets. Nothing is persisted, so a token stays valid until it expires.

mod config;
mod service;

#[cfg(test)]
mod tests;

pub use config::TokenServiceConfig;
pub use service::TokenService;

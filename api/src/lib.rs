//! HTTP surface of the Storefront identity service.
//!
//! Library exports so the binary and the integration tests assemble the
//! same application through [`app::configure_app`].

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use app::{configure_app, AppState};

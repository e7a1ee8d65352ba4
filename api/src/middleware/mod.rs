pub mod auth;
pub mod cors;
pub mod security;

pub use auth::{bearer_token, require_permissions, AuthenticatedUser};
pub use cors::create_cors;
pub use security::SecurityHeaders;

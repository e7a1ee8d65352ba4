//! MySQL implementations of the core repository traits.

mod rows;
pub mod store;

pub use store::{MySqlAuthStore, MySqlAuthTransaction};

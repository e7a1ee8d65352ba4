//! Role administration

mod service;

#[cfg(test)]
mod tests;

pub use service::{RoleService, RoleUpdate, ROLE_NAME_MAX, ROLE_NAME_MIN};

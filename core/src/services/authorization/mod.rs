//! Role-based permission checks for authenticated principals.

mod evaluator;

pub use evaluator::{AccessDecision, DenyReason, PermissionEvaluator};

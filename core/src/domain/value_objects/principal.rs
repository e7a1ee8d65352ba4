//! The authenticated caller of an operation.

use uuid::Uuid;

/// Identity established by a verified access token
///
/// Principals are passed explicitly to every operation that needs one; there
/// is no ambient "current user".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Principal {
    pub user_id: Uuid,
}

impl Principal {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

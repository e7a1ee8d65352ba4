//! Authentication results returned to the presentation layer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::TokenPair;

/// Public projection of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

/// Result of a login attempt that passed the credential check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The account exists and the password matched, but the account is not
    /// verified and no code was supplied. No tokens are issued.
    VerificationRequired,

    /// Tokens issued
    Authenticated { tokens: TokenPair, user: UserSummary },
}

impl LoginOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, LoginOutcome::Authenticated { .. })
    }

    pub fn tokens(&self) -> Option<&TokenPair> {
        match self {
            LoginOutcome::Authenticated { tokens, .. } => Some(tokens),
            LoginOutcome::VerificationRequired => None,
        }
    }
}

//! User entity representing a registered storefront account.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::value_objects::UserSummary;

/// Verification status of an account
///
/// Accounts start `Unverified` and move to `Verified` exactly once, when the
/// owner proves control of the email address with a one-time code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Unverified,
    Verified,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Unverified => "unverified",
            AccountStatus::Verified => "verified",
        }
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unverified" => Ok(AccountStatus::Unverified),
            "verified" => Ok(AccountStatus::Verified),
            other => Err(format!("Invalid account status: {}", other)),
        }
    }
}

/// User entity representing a registered account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    /// Login email, stored normalized (trimmed, lower-case)
    pub email: String,

    /// Display name
    pub name: String,

    /// bcrypt hash of the password; never leaves the crate in serialized form
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Verification status
    pub status: AccountStatus,

    /// Role granting this user its permissions
    pub role_id: Option<Uuid>,

    pub phone: Option<String>,

    pub address: Option<String>,

    /// Timestamp when the user was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the user was last updated
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new, unverified user
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        password_hash: impl Into<String>,
        role_id: Option<Uuid>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            name: name.into(),
            password_hash: password_hash.into(),
            status: AccountStatus::Unverified,
            role_id,
            phone: None,
            address: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets optional contact details
    pub fn with_contact(mut self, phone: Option<String>, address: Option<String>) -> Self {
        self.phone = phone;
        self.address = address;
        self
    }

    pub fn is_verified(&self) -> bool {
        self.status == AccountStatus::Verified
    }

    /// Marks the user as verified. Returns `false` when the account was
    /// already verified, in which case nothing changes.
    pub fn verify(&mut self) -> bool {
        if self.is_verified() {
            return false;
        }
        self.status = AccountStatus::Verified;
        self.updated_at = Utc::now();
        true
    }

    /// Replaces the stored password hash
    pub fn set_password_hash(&mut self, password_hash: impl Into<String>) {
        self.password_hash = password_hash.into();
        self.updated_at = Utc::now();
    }

    /// Public projection of the user returned by login
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }
}

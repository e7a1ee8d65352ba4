//! Row decoding shared by the MySQL repositories.
//!
//! Identifiers are stored as `CHAR(36)` and enums as their lowercase names.

use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::types::Json;
use sqlx::Row;
use uuid::Uuid;

use sf_core::domain::entities::{
    AccountStatus, OtpPurpose, OtpRecord, Permission, ResetToken, Role, User,
};
use sf_core::errors::DomainError;

pub(super) const USER_COLUMNS: &str =
    "id, email, name, password_hash, status, role_id, phone, address, created_at, updated_at";

pub(super) const ROLE_COLUMNS: &str = "id, name, permissions, created_at, updated_at";

pub(super) const OTP_COLUMNS: &str = "id, user_id, purpose, code_hash, issued_at, expires_at";

pub(super) const RESET_COLUMNS: &str = "id, user_id, token, created_at, expires_at";

/// Map a driver error, turning unique-key violations into `Conflict`
pub(super) fn db_error(context: &str, conflict: &str, e: sqlx::Error) -> DomainError {
    let unique_violation = e
        .as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false);
    if unique_violation {
        return DomainError::conflict(conflict);
    }
    tracing::error!(event = "database_error", context, error = %e, "Query failed");
    DomainError::internal(format!("{}: {}", context, e))
}

/// Map a driver error from a statement that cannot conflict
pub(super) fn query_error(context: &str, e: sqlx::Error) -> DomainError {
    tracing::error!(event = "database_error", context, error = %e, "Query failed");
    DomainError::internal(format!("{}: {}", context, e))
}

fn column<'r, T>(row: &'r MySqlRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, sqlx::MySql> + sqlx::Type<sqlx::MySql>,
{
    row.try_get(name)
        .map_err(|e| DomainError::internal(format!("Failed to get {}: {}", name, e)))
}

fn uuid_column(row: &MySqlRow, name: &str) -> Result<Uuid, DomainError> {
    let raw: String = column(row, name)?;
    parse_uuid(name, &raw)
}

fn parse_uuid(name: &str, raw: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(raw).map_err(|e| DomainError::internal(format!("Invalid UUID in {}: {}", name, e)))
}

pub(super) fn row_to_user(row: &MySqlRow) -> Result<User, DomainError> {
    let status: String = column(row, "status")?;
    let role_id: Option<String> = column(row, "role_id")?;

    Ok(User {
        id: uuid_column(row, "id")?,
        email: column(row, "email")?,
        name: column(row, "name")?,
        password_hash: column(row, "password_hash")?,
        status: status.parse::<AccountStatus>().map_err(DomainError::internal)?,
        role_id: role_id.as_deref().map(|r| parse_uuid("role_id", r)).transpose()?,
        phone: column(row, "phone")?,
        address: column(row, "address")?,
        created_at: column::<DateTime<Utc>>(row, "created_at")?,
        updated_at: column::<DateTime<Utc>>(row, "updated_at")?,
    })
}

pub(super) fn row_to_role(row: &MySqlRow) -> Result<Role, DomainError> {
    let permissions: Json<Vec<Permission>> = column(row, "permissions")?;

    Ok(Role {
        id: uuid_column(row, "id")?,
        name: column(row, "name")?,
        permissions: permissions.0,
        created_at: column::<DateTime<Utc>>(row, "created_at")?,
        updated_at: column::<DateTime<Utc>>(row, "updated_at")?,
    })
}

pub(super) fn row_to_otp(row: &MySqlRow) -> Result<OtpRecord, DomainError> {
    let purpose: String = column(row, "purpose")?;

    Ok(OtpRecord {
        id: uuid_column(row, "id")?,
        user_id: uuid_column(row, "user_id")?,
        purpose: purpose.parse::<OtpPurpose>().map_err(DomainError::internal)?,
        code_hash: column(row, "code_hash")?,
        issued_at: column::<DateTime<Utc>>(row, "issued_at")?,
        expires_at: column::<DateTime<Utc>>(row, "expires_at")?,
    })
}

pub(super) fn row_to_reset_token(row: &MySqlRow) -> Result<ResetToken, DomainError> {
    Ok(ResetToken {
        id: uuid_column(row, "id")?,
        user_id: uuid_column(row, "user_id")?,
        token: column(row, "token")?,
        created_at: column::<DateTime<Utc>>(row, "created_at")?,
        expires_at: column::<DateTime<Utc>>(row, "expires_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_core::errors::ErrorKind;

    #[test]
    fn test_parse_uuid_reports_column() {
        let err = parse_uuid("role_id", "not-a-uuid").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(err.to_string().contains("role_id"));
    }

    #[test]
    fn test_non_database_error_is_internal() {
        let err = db_error("insert user", "Email already in use", sqlx::Error::RowNotFound);
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}

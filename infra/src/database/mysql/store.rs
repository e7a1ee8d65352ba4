//! Transactional MySQL auth store
//!
//! One [`MySqlAuthTransaction`] wraps one `sqlx::Transaction`. Dropping it
//! without committing rolls the database transaction back.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{MySql, MySqlPool, Transaction};
use uuid::Uuid;

use sf_core::domain::entities::{OtpPurpose, OtpRecord, ResetToken, Role, User};
use sf_core::errors::DomainError;
use sf_core::repositories::{
    AuthStore, AuthTransaction, OtpRepository, ResetTokenRepository, RoleRepository, UserRepository,
};

use super::rows::{
    db_error, query_error, row_to_otp, row_to_reset_token, row_to_role, row_to_user, OTP_COLUMNS,
    RESET_COLUMNS, ROLE_COLUMNS, USER_COLUMNS,
};

/// MySQL implementation of [`AuthStore`]
#[derive(Clone)]
pub struct MySqlAuthStore {
    pool: MySqlPool,
}

impl MySqlAuthStore {
    /// Create a new store over a connection pool
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthStore for MySqlAuthStore {
    async fn begin(&self) -> Result<Box<dyn AuthTransaction>, DomainError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| query_error("begin transaction", e))?;
        Ok(Box::new(MySqlAuthTransaction { tx }))
    }
}

/// A unit of work on one pooled connection
pub struct MySqlAuthTransaction {
    tx: Transaction<'static, MySql>,
}

impl MySqlAuthTransaction {
    async fn fetch_user(&mut self, sql: &str, key: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(sql)
            .bind(key)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| query_error("find user", e))?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn fetch_role(&mut self, sql: &str, key: &str) -> Result<Option<Role>, DomainError> {
        let row = sqlx::query(sql)
            .bind(key)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| query_error("find role", e))?;
        row.as_ref().map(row_to_role).transpose()
    }

    async fn exists(&mut self, sql: &str, id: Uuid) -> Result<bool, DomainError> {
        let row = sqlx::query(sql)
            .bind(id.to_string())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| query_error("check existence", e))?;
        Ok(row.is_some())
    }
}

#[async_trait]
impl UserRepository for MySqlAuthTransaction {
    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>, DomainError> {
        let sql = format!("SELECT {} FROM users WHERE email = ? LIMIT 1", USER_COLUMNS);
        self.fetch_user(&sql, email).await
    }

    async fn find_user_by_id(&mut self, id: Uuid) -> Result<Option<User>, DomainError> {
        let sql = format!("SELECT {} FROM users WHERE id = ? LIMIT 1", USER_COLUMNS);
        self.fetch_user(&sql, &id.to_string()).await
    }

    async fn lock_user(&mut self, id: Uuid) -> Result<Option<User>, DomainError> {
        let sql = format!("SELECT {} FROM users WHERE id = ? FOR UPDATE", USER_COLUMNS);
        self.fetch_user(&sql, &id.to_string()).await
    }

    async fn insert_user(&mut self, user: &User) -> Result<(), DomainError> {
        let query = r#"
            INSERT INTO users (
                id, email, name, password_hash, status, role_id, phone, address,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(user.id.to_string())
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.password_hash)
            .bind(user.status.as_str())
            .bind(user.role_id.map(|r| r.to_string()))
            .bind(&user.phone)
            .bind(&user.address)
            .bind(user.created_at)
            .bind(user.updated_at)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| db_error("insert user", "Email already in use", e))?;
        Ok(())
    }

    async fn update_user(&mut self, user: &User) -> Result<(), DomainError> {
        let query = r#"
            UPDATE users
            SET email = ?, name = ?, password_hash = ?, status = ?, role_id = ?,
                phone = ?, address = ?, updated_at = ?
            WHERE id = ?
        "#;

        let result = sqlx::query(query)
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.password_hash)
            .bind(user.status.as_str())
            .bind(user.role_id.map(|r| r.to_string()))
            .bind(&user.phone)
            .bind(&user.address)
            .bind(user.updated_at)
            .bind(user.id.to_string())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| db_error("update user", "Email already in use", e))?;

        // MySQL reports zero affected rows when nothing changed
        if result.rows_affected() == 0 && !self.exists("SELECT 1 FROM users WHERE id = ?", user.id).await? {
            return Err(DomainError::not_found("User"));
        }
        Ok(())
    }
}

#[async_trait]
impl RoleRepository for MySqlAuthTransaction {
    async fn find_role_by_id(&mut self, id: Uuid) -> Result<Option<Role>, DomainError> {
        let sql = format!("SELECT {} FROM roles WHERE id = ? LIMIT 1", ROLE_COLUMNS);
        self.fetch_role(&sql, &id.to_string()).await
    }

    async fn find_role_by_name(&mut self, name: &str) -> Result<Option<Role>, DomainError> {
        let sql = format!("SELECT {} FROM roles WHERE name = ? LIMIT 1", ROLE_COLUMNS);
        self.fetch_role(&sql, name).await
    }

    async fn list_roles(&mut self) -> Result<Vec<Role>, DomainError> {
        let sql = format!("SELECT {} FROM roles ORDER BY created_at DESC", ROLE_COLUMNS);
        let rows = sqlx::query(&sql)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| query_error("list roles", e))?;
        rows.iter().map(row_to_role).collect()
    }

    async fn insert_role(&mut self, role: &Role) -> Result<(), DomainError> {
        let conflict = format!("Role with name {} already exists", role.name);
        sqlx::query(
            "INSERT INTO roles (id, name, permissions, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(role.id.to_string())
        .bind(&role.name)
        .bind(Json(&role.permissions))
        .bind(role.created_at)
        .bind(role.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| db_error("insert role", &conflict, e))?;
        Ok(())
    }

    async fn update_role(&mut self, role: &Role) -> Result<(), DomainError> {
        let conflict = format!("Role with name {} already exists", role.name);
        let result = sqlx::query(
            "UPDATE roles SET name = ?, permissions = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&role.name)
        .bind(Json(&role.permissions))
        .bind(role.updated_at)
        .bind(role.id.to_string())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| db_error("update role", &conflict, e))?;

        if result.rows_affected() == 0 && !self.exists("SELECT 1 FROM roles WHERE id = ?", role.id).await? {
            return Err(DomainError::not_found(format!("Role with ID {}", role.id)));
        }
        Ok(())
    }

    async fn delete_role(&mut self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM roles WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| query_error("delete role", e))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl OtpRepository for MySqlAuthTransaction {
    async fn replace_otp(&mut self, record: &OtpRecord) -> Result<(), DomainError> {
        self.delete_otps(record.user_id, record.purpose).await?;

        let sql = format!("INSERT INTO otp_codes ({}) VALUES (?, ?, ?, ?, ?, ?)", OTP_COLUMNS);
        sqlx::query(&sql)
            .bind(record.id.to_string())
            .bind(record.user_id.to_string())
            .bind(record.purpose.as_str())
            .bind(&record.code_hash)
            .bind(record.issued_at)
            .bind(record.expires_at)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| query_error("insert otp", e))?;
        Ok(())
    }

    async fn find_otp(
        &mut self,
        user_id: Uuid,
        purpose: OtpPurpose,
    ) -> Result<Option<OtpRecord>, DomainError> {
        let sql = format!(
            "SELECT {} FROM otp_codes WHERE user_id = ? AND purpose = ? LIMIT 1",
            OTP_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(user_id.to_string())
            .bind(purpose.as_str())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| query_error("find otp", e))?;
        row.as_ref().map(row_to_otp).transpose()
    }

    async fn delete_otps(&mut self, user_id: Uuid, purpose: OtpPurpose) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM otp_codes WHERE user_id = ? AND purpose = ?")
            .bind(user_id.to_string())
            .bind(purpose.as_str())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| query_error("delete otps", e))?;
        Ok(())
    }
}

#[async_trait]
impl ResetTokenRepository for MySqlAuthTransaction {
    async fn latest_reset_token(&mut self, user_id: Uuid) -> Result<Option<ResetToken>, DomainError> {
        let sql = format!(
            "SELECT {} FROM password_reset_tokens WHERE user_id = ? ORDER BY created_at DESC LIMIT 1",
            RESET_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(user_id.to_string())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| query_error("find latest reset token", e))?;
        row.as_ref().map(row_to_reset_token).transpose()
    }

    async fn find_reset_token(&mut self, token: &str) -> Result<Option<ResetToken>, DomainError> {
        let sql = format!(
            "SELECT {} FROM password_reset_tokens WHERE token = ? LIMIT 1",
            RESET_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(token)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| query_error("find reset token", e))?;
        row.as_ref().map(row_to_reset_token).transpose()
    }

    async fn replace_reset_token(&mut self, token: &ResetToken) -> Result<(), DomainError> {
        self.delete_reset_tokens(token.user_id).await?;

        let sql = format!(
            "INSERT INTO password_reset_tokens ({}) VALUES (?, ?, ?, ?, ?)",
            RESET_COLUMNS
        );
        sqlx::query(&sql)
            .bind(token.id.to_string())
            .bind(token.user_id.to_string())
            .bind(&token.token)
            .bind(token.created_at)
            .bind(token.expires_at)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| db_error("insert reset token", "Reset token collision", e))?;
        Ok(())
    }

    async fn delete_reset_tokens(&mut self, user_id: Uuid) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM password_reset_tokens WHERE user_id = ?")
            .bind(user_id.to_string())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| query_error("delete reset tokens", e))?;
        Ok(())
    }
}

#[async_trait]
impl AuthTransaction for MySqlAuthTransaction {
    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        self.tx
            .commit()
            .await
            .map_err(|e| query_error("commit transaction", e))
    }
}

//! Main account service implementation

use std::sync::Arc;
use tracing::{error, info, warn};

use sf_shared::validation::{is_strong_password, is_valid_email, normalize_email};

use crate::domain::entities::{OtpPurpose, TokenPair, User};
use crate::domain::value_objects::{LoginOutcome, Principal, UserSummary};
use crate::errors::{AuthError, DomainError, DomainResult, TokenError, ValidationError};
use crate::repositories::AuthStore;
use crate::services::credential::CredentialService;
use crate::services::notification::{JobQueue, NotificationDispatcher};
use crate::services::otp::OtpService;
use crate::services::reset::ResetTokenService;
use crate::services::token::TokenService;

use super::config::AccountServiceConfig;
use super::types::{LoginRequest, SignupRequest, FORGOT_PASSWORD_MESSAGE, RESEND_OTP_MESSAGE};

/// Orchestrates the account lifecycle
///
/// Every operation that reads and then writes authentication state runs in
/// a single [`AuthStore`] transaction. Password hashing and verification
/// happen outside of any transaction. Emails are only enqueued; delivery is
/// the notification worker's job.
pub struct AccountService<S, Q>
where
    S: AuthStore,
    Q: JobQueue,
{
    /// Transactional persistence for users, roles, OTPs and reset tokens
    store: Arc<S>,
    /// Producer for outgoing email jobs
    notifications: NotificationDispatcher<Q>,
    /// JWT issuer shared with the request authenticator
    tokens: Arc<TokenService>,
    credentials: CredentialService,
    otp: OtpService,
    reset: ResetTokenService,
    config: AccountServiceConfig,
}

impl<S, Q> AccountService<S, Q>
where
    S: AuthStore,
    Q: JobQueue,
{
    /// Create a new account service
    ///
    /// # Arguments
    ///
    /// * `store` - Transactional store for authentication state
    /// * `notifications` - Dispatcher used to enqueue email jobs
    /// * `tokens` - Token issuer
    /// * `config` - Service configuration
    pub fn new(
        store: Arc<S>,
        notifications: NotificationDispatcher<Q>,
        tokens: Arc<TokenService>,
        config: AccountServiceConfig,
    ) -> Self {
        Self {
            store,
            notifications,
            tokens,
            credentials: CredentialService::new(config.bcrypt_cost),
            otp: OtpService::new(config.otp.clone()),
            reset: ResetTokenService::new(config.reset.clone()),
            config,
        }
    }

    /// Register a new, unverified account and email it a verification code
    ///
    /// The account, its OTP and the `send-otp` job are one unit: if the job
    /// cannot be enqueued the whole signup is rolled back.
    ///
    /// # Errors
    ///
    /// * `DomainError::Conflict` - The email is already registered
    /// * `DomainError::Validation` - Malformed email, weak password or empty name
    /// * `DomainError::Internal` - The default role is missing
    pub async fn signup(&self, request: SignupRequest) -> DomainResult<UserSummary> {
        let email = normalize_email(&request.email);
        validate_email(&email)?;
        validate_new_password(&request.password)?;
        let name = request.name.trim();
        if name.is_empty() {
            return Err(ValidationError::RequiredField {
                field: "name".to_string(),
            }
            .into());
        }

        let password_hash = self.credentials.hash_password(&request.password).await?;

        let mut tx = self.store.begin().await?;

        if tx.find_user_by_email(&email).await?.is_some() {
            return Err(DomainError::conflict("Email already in use"));
        }

        let role = tx
            .find_role_by_name(&self.config.default_role)
            .await?
            .ok_or_else(|| {
                error!(
                    event = "default_role_missing",
                    role = %self.config.default_role,
                    "Default role not found; seed data is missing"
                );
                DomainError::internal("Default role not found")
            })?;

        let user = User::new(&email, name, password_hash, Some(role.id))
            .with_contact(request.phone.clone(), request.address.clone());
        tx.insert_user(&user).await?;

        let code = self
            .otp
            .issue(tx.as_mut(), user.id, OtpPurpose::Verification)
            .await?;
        self.notifications.send_otp(&user.email, &code).await?;

        tx.commit().await?;

        info!(event = "user_signed_up", user_id = %user.id, role = %role.name, "New account created");
        Ok(user.summary())
    }

    /// Check credentials and, for unverified accounts, the verification code
    ///
    /// Unknown email and wrong password fail identically. A verified account
    /// never touches the OTP ledger.
    ///
    /// # Returns
    ///
    /// * `LoginOutcome::VerificationRequired` - Unverified account, no code given
    /// * `LoginOutcome::Authenticated` - Tokens issued
    pub async fn login(&self, request: LoginRequest) -> DomainResult<LoginOutcome> {
        let email = normalize_email(&request.email);
        let found = {
            let mut tx = self.store.begin().await?;
            let found = tx.find_user_by_email(&email).await?;
            found
        };

        let mut user = match found {
            Some(user) => user,
            None => {
                warn!(event = "login_failed", reason = "unknown_email", "Login failed");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !self
            .credentials
            .verify_password(&request.password, &user.password_hash)
            .await?
        {
            warn!(event = "login_failed", user_id = %user.id, reason = "wrong_password", "Login failed");
            return Err(AuthError::InvalidCredentials.into());
        }

        if !user.is_verified() {
            let code = match request.otp.as_deref().map(str::trim) {
                Some(code) if !code.is_empty() => code,
                _ => {
                    info!(event = "login_unverified", user_id = %user.id, "Verification required");
                    return Ok(LoginOutcome::VerificationRequired);
                }
            };

            let mut tx = self.store.begin().await?;
            // The password was checked against this exact hash
            let mut locked = match tx.lock_user(user.id).await? {
                Some(locked) if locked.password_hash == user.password_hash => locked,
                _ => return Err(AuthError::InvalidCredentials.into()),
            };
            if !locked.is_verified() {
                self.otp
                    .validate(tx.as_mut(), locked.id, OtpPurpose::Verification, code)
                    .await?;
                locked.verify();
                tx.update_user(&locked).await?;
                tx.commit().await?;
                info!(event = "account_verified", user_id = %locked.id, "Account verified");
            }
            user = locked;
        }

        let tokens = self.tokens.generate_tokens(user.id)?;
        info!(event = "login_succeeded", user_id = %user.id, "User logged in");
        Ok(LoginOutcome::Authenticated {
            tokens,
            user: user.summary(),
        })
    }

    /// Exchange a refresh token for a fresh pair
    ///
    /// The refresh token itself is not rotated.
    pub async fn refresh_token(&self, refresh_token: &str) -> DomainResult<TokenPair> {
        let claims = self.tokens.verify_refresh_token(refresh_token)?;
        let user_id = claims
            .user_id()
            .map_err(|_| DomainError::Token(TokenError::InvalidRefreshToken))?;

        let user = {
            let mut tx = self.store.begin().await?;
            let user = tx.find_user_by_id(user_id).await?;
            user
        };

        match user {
            Some(user) if user.is_verified() => self.tokens.generate_tokens(user.id),
            _ => {
                warn!(event = "refresh_rejected", user_id = %user_id, "Refresh for missing or unverified user");
                Err(AuthError::AccountNotActive.into())
            }
        }
    }

    /// Change the caller's password and return a fresh token pair
    ///
    /// Previously issued tokens remain valid until they expire.
    ///
    /// # Errors
    ///
    /// * `DomainError::NotFound` - The principal's account no longer exists
    /// * `AuthError::WrongPassword` - `old_password` does not match
    /// * `ValidationError::PasswordUnchanged` - `new_password` equals the current one
    /// * `DomainError::Conflict` - Another request changed the password meanwhile
    pub async fn change_password(
        &self,
        principal: &Principal,
        old_password: &str,
        new_password: &str,
    ) -> DomainResult<TokenPair> {
        let found = {
            let mut tx = self.store.begin().await?;
            let found = tx.find_user_by_id(principal.user_id).await?;
            found
        };
        let user = found.ok_or_else(|| DomainError::not_found("User"))?;

        if !self
            .credentials
            .verify_password(old_password, &user.password_hash)
            .await?
        {
            warn!(event = "change_password_failed", user_id = %user.id, "Wrong current password");
            return Err(AuthError::WrongPassword.into());
        }

        if self
            .credentials
            .verify_password(new_password, &user.password_hash)
            .await?
        {
            return Err(ValidationError::PasswordUnchanged.into());
        }
        validate_new_password(new_password)?;

        let hash = self.credentials.hash_password(new_password).await?;

        let mut tx = self.store.begin().await?;
        let mut locked = tx
            .lock_user(user.id)
            .await?
            .ok_or_else(|| DomainError::not_found("User"))?;
        if locked.password_hash != user.password_hash {
            return Err(DomainError::conflict("Password was changed by another request"));
        }
        locked.set_password_hash(hash);
        tx.update_user(&locked).await?;
        tx.commit().await?;

        info!(event = "password_changed", user_id = %user.id, "Password changed");
        self.tokens.generate_tokens(user.id)
    }

    /// Start a password reset
    ///
    /// Always returns the same message so callers cannot probe which emails
    /// are registered. A second request within the rate limit window is a
    /// silent no-op. Failing to enqueue the email is logged, not surfaced.
    pub async fn forgot_password(&self, email: &str) -> DomainResult<&'static str> {
        let email = normalize_email(email);
        let mut tx = self.store.begin().await?;

        let Some(user) = tx.find_user_by_email(&email).await? else {
            return Ok(FORGOT_PASSWORD_MESSAGE);
        };

        let token = self.reset.issue_if_allowed(tx.as_mut(), user.id).await?;
        tx.commit().await?;

        if let Some(token) = token {
            match self.notifications.send_password_reset(&user.email, &token).await {
                Ok(_) => info!(event = "password_reset_requested", user_id = %user.id, "Reset email queued"),
                Err(e) => error!(
                    event = "password_reset_enqueue_failed",
                    user_id = %user.id,
                    error = %e,
                    "Failed to enqueue reset email"
                ),
            }
        }
        Ok(FORGOT_PASSWORD_MESSAGE)
    }

    /// Set a new password using a reset token
    ///
    /// The owner's hash is updated and all of the owner's reset tokens are
    /// deleted in one transaction.
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidResetToken` - Unknown or expired token
    pub async fn reset_password(&self, new_password: &str, token: &str) -> DomainResult<()> {
        validate_new_password(new_password)?;
        let hash = self.credentials.hash_password(new_password).await?;

        let mut tx = self.store.begin().await?;
        let record = self.reset.find_valid(tx.as_mut(), token).await?;

        let mut user = tx
            .lock_user(record.user_id)
            .await?
            .ok_or(AuthError::InvalidResetToken)?;

        user.set_password_hash(hash);
        tx.update_user(&user).await?;
        tx.delete_reset_tokens(user.id).await?;
        tx.commit().await?;

        info!(event = "password_reset", user_id = %user.id, "Password reset via token");
        Ok(())
    }

    /// Issue a fresh verification code to an unverified account
    ///
    /// Unknown emails get the same response as a successful resend.
    ///
    /// # Errors
    ///
    /// * `DomainError::BadRequest` - The account is already verified
    pub async fn resend_otp(&self, email: &str) -> DomainResult<&'static str> {
        let email = normalize_email(email);
        let mut tx = self.store.begin().await?;

        let Some(found) = tx.find_user_by_email(&email).await? else {
            info!(event = "otp_resend_unknown_email", "OTP resend for unknown email");
            return Ok(RESEND_OTP_MESSAGE);
        };
        // Serializes concurrent resends for the same account
        let Some(user) = tx.lock_user(found.id).await? else {
            return Ok(RESEND_OTP_MESSAGE);
        };

        if user.is_verified() {
            return Err(DomainError::bad_request("Account already verified"));
        }

        let code = self
            .otp
            .issue(tx.as_mut(), user.id, OtpPurpose::Verification)
            .await?;
        self.notifications.send_otp(&user.email, &code).await?;
        tx.commit().await?;

        info!(event = "otp_resent", user_id = %user.id, "Verification code re-issued");
        Ok(RESEND_OTP_MESSAGE)
    }
}

fn validate_email(email: &str) -> DomainResult<()> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail.into())
    }
}

fn validate_new_password(password: &str) -> DomainResult<()> {
    if is_strong_password(password) {
        Ok(())
    } else {
        Err(ValidationError::WeakPassword.into())
    }
}

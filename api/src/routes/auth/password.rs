use actix_web::{web, HttpResponse};

use sf_core::repositories::AuthStore;
use sf_core::services::JobQueue;

use crate::app::AppState;
use crate::dto::{
    ChangePasswordBody, ChangePasswordResponse, EmailBody, MessageResponse, ResetPasswordBody,
};
use crate::handlers::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::routes::validated;

/// Handler for PUT /api/v1/auth/change-password
///
/// Requires a bearer access token. Returns a fresh token pair; tokens
/// issued before the change stay valid until they expire.
///
/// # Request Body
///
/// ```json
/// { "oldPassword": "Secret123!", "newPassword": "Secret456!" }
/// ```
///
/// ## Errors
/// - 400 Bad Request: New password is weak or equal to the current one
/// - 401 Unauthorized: Missing or invalid token, or wrong current password
/// - 404 Not Found: The account no longer exists
pub async fn change_password<S: AuthStore, Q: JobQueue>(
    state: web::Data<AppState<S, Q>>,
    user: AuthenticatedUser,
    body: web::Json<ChangePasswordBody>,
) -> Result<HttpResponse, ApiError> {
    let body = validated(body)?;
    let tokens = state
        .accounts
        .change_password(&user, &body.old_password, &body.new_password)
        .await?;

    Ok(HttpResponse::Ok().json(ChangePasswordResponse {
        message: "Password updated successfully".to_string(),
        tokens: tokens.into(),
    }))
}

/// Handler for POST /api/v1/auth/forgot-password
///
/// Always answers with the same message, whether or not the email is
/// registered.
pub async fn forgot_password<S: AuthStore, Q: JobQueue>(
    state: web::Data<AppState<S, Q>>,
    body: web::Json<EmailBody>,
) -> Result<HttpResponse, ApiError> {
    let body = validated(body)?;
    let message = state.accounts.forgot_password(&body.email).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new(message)))
}

/// Handler for PUT /api/v1/auth/reset-password
///
/// # Request Body
///
/// ```json
/// { "newPassword": "Secret456!", "resetToken": "9f2c..." }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Weak password
/// - 401 Unauthorized: Unknown or expired reset token
pub async fn reset_password<S: AuthStore, Q: JobQueue>(
    state: web::Data<AppState<S, Q>>,
    body: web::Json<ResetPasswordBody>,
) -> Result<HttpResponse, ApiError> {
    let body = validated(body)?;
    state
        .accounts
        .reset_password(&body.new_password, &body.reset_token)
        .await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Password reset successfully")))
}

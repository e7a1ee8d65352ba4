use actix_web::{web, HttpResponse};

use sf_core::repositories::AuthStore;
use sf_core::services::JobQueue;

use crate::app::AppState;
use crate::dto::{EmailBody, MessageResponse};
use crate::handlers::ApiError;
use crate::routes::validated;

/// Handler for POST /api/v1/auth/resend-otp
///
/// Replaces the account's verification code and emails the new one.
/// Unknown emails receive the same response as a successful resend.
///
/// ## Errors
/// - 400 Bad Request: The account is already verified
pub async fn resend_otp<S: AuthStore, Q: JobQueue>(
    state: web::Data<AppState<S, Q>>,
    body: web::Json<EmailBody>,
) -> Result<HttpResponse, ApiError> {
    let body = validated(body)?;
    let message = state.accounts.resend_otp(&body.email).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new(message)))
}

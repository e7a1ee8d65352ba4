use actix_web::{web, HttpResponse};

use sf_core::domain::value_objects::LoginOutcome;
use sf_core::repositories::AuthStore;
use sf_core::services::JobQueue;

use crate::app::AppState;
use crate::dto::{LoginBody, LoginResponse};
use crate::handlers::ApiError;
use crate::routes::validated;

/// Handler for POST /api/v1/auth/login
///
/// For an unverified account the first call (without `otp`) only reports
/// that verification is needed; a second call with the emailed code
/// verifies the account and logs in.
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "message": "Login successful",
///     "status": "VERIFIED",
///     "user": { "id": "...", "email": "user@example.com", "name": "Jane" },
///     "accessToken": "eyJ...",
///     "refreshToken": "eyJ...",
///     "expiresIn": 900
/// }
/// ```
///
/// ## Verification pending (200 OK)
/// ```json
/// { "message": "Account verification required", "status": "UNVERIFIED" }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: Wrong credentials, or an invalid or expired code
pub async fn login<S: AuthStore, Q: JobQueue>(
    state: web::Data<AppState<S, Q>>,
    body: web::Json<LoginBody>,
) -> Result<HttpResponse, ApiError> {
    let body = validated(body)?;

    let response = match state.accounts.login(body.into()).await? {
        LoginOutcome::VerificationRequired => LoginResponse::verification_required(),
        LoginOutcome::Authenticated { tokens, user } => LoginResponse::authenticated(tokens, user),
    };
    Ok(HttpResponse::Ok().json(response))
}

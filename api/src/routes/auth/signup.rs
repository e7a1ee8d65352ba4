use actix_web::{web, HttpResponse};

use sf_core::repositories::AuthStore;
use sf_core::services::JobQueue;

use crate::app::AppState;
use crate::dto::{MessageResponse, SignupBody};
use crate::handlers::ApiError;
use crate::routes::validated;

/// Handler for POST /api/v1/auth/signup
///
/// Creates an unverified account with the default role and emails it a
/// verification code.
///
/// # Request Body
///
/// ```json
/// {
///     "email": "user@example.com",
///     "name": "Jane",
///     "password": "Secret123!",
///     "phone": "+1234567890",
///     "address": "1 Main St"
/// }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// { "message": "User created successfully and Otp sent to email" }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Malformed email, weak password or missing name
/// - 409 Conflict: Email already registered
pub async fn signup<S: AuthStore, Q: JobQueue>(
    state: web::Data<AppState<S, Q>>,
    body: web::Json<SignupBody>,
) -> Result<HttpResponse, ApiError> {
    let body = validated(body)?;
    state.accounts.signup(body.into()).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new(
        "User created successfully and Otp sent to email",
    )))
}

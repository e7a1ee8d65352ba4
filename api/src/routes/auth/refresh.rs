use actix_web::{web, HttpResponse};

use sf_core::repositories::AuthStore;
use sf_core::services::JobQueue;

use crate::app::AppState;
use crate::dto::{RefreshTokenBody, TokenResponse};
use crate::handlers::ApiError;
use crate::routes::validated;

/// Handler for POST /api/v1/auth/refresh
///
/// Exchanges a valid refresh token for a new token pair.
///
/// # Request Body
///
/// ```json
/// { "refreshToken": "eyJ..." }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// { "accessToken": "eyJ...", "refreshToken": "eyJ...", "expiresIn": 900 }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: Invalid or expired refresh token, or the account is
///   missing or unverified
pub async fn refresh_token<S: AuthStore, Q: JobQueue>(
    state: web::Data<AppState<S, Q>>,
    body: web::Json<RefreshTokenBody>,
) -> Result<HttpResponse, ApiError> {
    let body = validated(body)?;
    let tokens = state.accounts.refresh_token(&body.refresh_token).await?;
    Ok(HttpResponse::Ok().json(TokenResponse::from(tokens)))
}

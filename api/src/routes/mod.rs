pub mod auth;
pub mod roles;

use actix_web::web;
use validator::Validate;

use crate::handlers::ApiError;

/// Unwrap a JSON body and run its field validators
pub(crate) fn validated<T: Validate>(body: web::Json<T>) -> Result<T, ApiError> {
    let body = body.into_inner();
    body.validate()?;
    Ok(body)
}

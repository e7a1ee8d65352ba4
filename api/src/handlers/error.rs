//! Mapping from domain and request errors to HTTP responses.
//!
//! Every failure leaves the API as the shared [`ErrorResponse`] envelope.
//! Internal details are logged here and replaced by a generic message.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;
use validator::ValidationErrors;

use sf_core::errors::{DomainError, ErrorKind, TokenError};
use sf_shared::{error_codes, ErrorResponse};

/// Error type returned by every handler and extractor
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Request body failed DTO validation
    #[error("Validation failed")]
    Validation(#[from] ValidationErrors),

    /// Body could not be parsed or a path parameter is malformed
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            ApiError::Domain(DomainError::Token(TokenError::TokenExpired))
            | ApiError::Domain(DomainError::Token(TokenError::RefreshTokenExpired)) => {
                error_codes::TOKEN_EXPIRED
            }
            ApiError::Domain(DomainError::Token(TokenError::TokenGenerationFailed)) => {
                error_codes::INTERNAL_ERROR
            }
            ApiError::Domain(DomainError::Token(_)) => error_codes::TOKEN_INVALID,
            ApiError::Domain(DomainError::Validation(_)) | ApiError::Validation(_) => {
                error_codes::VALIDATION_ERROR
            }
            ApiError::Domain(error) => match error.kind() {
                ErrorKind::Unauthorized => error_codes::UNAUTHORIZED,
                ErrorKind::Forbidden => error_codes::FORBIDDEN,
                ErrorKind::Conflict => error_codes::CONFLICT,
                ErrorKind::NotFound => error_codes::NOT_FOUND,
                ErrorKind::BadRequest => error_codes::BAD_REQUEST,
                ErrorKind::Internal => error_codes::INTERNAL_ERROR,
            },
            ApiError::BadRequest(_) => error_codes::BAD_REQUEST,
        }
    }

    fn body(&self) -> ErrorResponse {
        match self {
            ApiError::Domain(error) => ErrorResponse::new(self.error_code(), error.public_message()),
            ApiError::Validation(errors) => {
                let mut response = ErrorResponse::new(self.error_code(), "Validation failed");
                for (field, failures) in errors.field_errors() {
                    let messages: Vec<String> = failures
                        .iter()
                        .map(|failure| match &failure.message {
                            Some(message) => message.to_string(),
                            None => failure.code.to_string(),
                        })
                        .collect();
                    response = response.add_detail(field, messages);
                }
                response
            }
            ApiError::BadRequest(message) => ErrorResponse::new(self.error_code(), message.clone()),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Domain(error) => match error.kind() {
                ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
                ErrorKind::Forbidden => StatusCode::FORBIDDEN,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
                ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(event = "request_failed", error = ?self, "Internal error while handling request");
        } else {
            tracing::debug!(event = "request_rejected", status = status.as_u16(), error = %self, "Request rejected");
        }
        HttpResponse::build(status).json(self.body())
    }
}

/// Handler for unmatched routes
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(error_codes::NOT_FOUND, "Endpoint not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_core::errors::{AuthError, ValidationError};

    #[test]
    fn test_status_mapping() {
        let cases = [
            (DomainError::Unauthorized, StatusCode::UNAUTHORIZED),
            (DomainError::forbidden("no"), StatusCode::FORBIDDEN),
            (DomainError::conflict("taken"), StatusCode::CONFLICT),
            (DomainError::not_found("Role"), StatusCode::NOT_FOUND),
            (DomainError::from(ValidationError::WeakPassword), StatusCode::BAD_REQUEST),
            (DomainError::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, expected) in cases {
            assert_eq!(ApiError::from(error).status_code(), expected);
        }
    }

    #[test]
    fn test_token_error_codes() {
        let expired = ApiError::from(DomainError::from(TokenError::TokenExpired));
        assert_eq!(expired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(expired.error_code(), error_codes::TOKEN_EXPIRED);

        let invalid = ApiError::from(DomainError::from(TokenError::InvalidSignature));
        assert_eq!(invalid.error_code(), error_codes::TOKEN_INVALID);
    }

    #[test]
    fn test_internal_message_hidden() {
        let error = ApiError::from(DomainError::internal("connection refused"));
        let body = error.body();
        assert_eq!(body.error, error_codes::INTERNAL_ERROR);
        assert_eq!(body.message, "Internal server error");
    }

    #[test]
    fn test_auth_error_message_preserved() {
        let error = ApiError::from(DomainError::from(AuthError::InvalidCredentials));
        let body = error.body();
        assert_eq!(body.error, error_codes::UNAUTHORIZED);
        assert_eq!(body.message, "Invalid credentials");
    }
}

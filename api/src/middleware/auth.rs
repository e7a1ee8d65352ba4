//! Bearer token authentication.
//!
//! [`AuthenticatedUser`] verifies the `Authorization: Bearer <jwt>` header
//! against the [`TokenService`] registered as app data. Use it directly to
//! require a caller, or as `Option<AuthenticatedUser>` and hand the result to
//! [`require_permissions`] so that a missing caller (401) and an insufficient
//! role (403) stay distinct.

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use std::ops::Deref;

use sf_core::domain::entities::Permission;
use sf_core::domain::value_objects::Principal;
use sf_core::errors::{AuthError, DomainError};
use sf_core::repositories::AuthStore;
use sf_core::services::{PermissionEvaluator, TokenService};

use crate::handlers::ApiError;

/// Principal established from a verified access token
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub Principal);

impl Deref for AuthenticatedUser {
    type Target = Principal;

    fn deref(&self) -> &Principal {
        &self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map(AuthenticatedUser))
    }
}

fn authenticate(req: &HttpRequest) -> Result<Principal, ApiError> {
    let token = bearer_token(req).ok_or(DomainError::Auth(AuthError::MissingCredentials))?;
    let tokens = req
        .app_data::<web::Data<TokenService>>()
        .ok_or_else(|| DomainError::internal("Token service not registered"))?;

    let principal = tokens.authenticate(token).map_err(|e| {
        tracing::debug!(event = "bearer_rejected", error = %e, "Access token rejected");
        e
    })?;
    Ok(principal)
}

/// Token from an `Authorization: Bearer` header, if present and well formed
pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Check that the caller holds every permission in `required`
///
/// Returns the caller on success. No caller is `401`; a caller whose role
/// does not grant the permissions is `403`.
pub async fn require_permissions<S: AuthStore>(
    evaluator: &PermissionEvaluator<S>,
    user: Option<AuthenticatedUser>,
    required: &[Permission],
) -> Result<Principal, ApiError> {
    let principal = user.map(|user| user.0);
    evaluator.enforce(principal.as_ref(), required).await?;
    principal.ok_or(ApiError::Domain(DomainError::Unauthorized))
}

//! Role administration endpoints under `/roles`.
//!
//! Every route requires a bearer token and a `users` permission matching the
//! operation: `read` to list or fetch, `create`, `update` and `delete` for the
//! corresponding writes.

use actix_web::{web, HttpResponse};
use uuid::Uuid;

use sf_core::domain::entities::{Action, Permission, Resource};
use sf_core::repositories::AuthStore;
use sf_core::services::JobQueue;

use crate::app::AppState;
use crate::dto::{CreateRoleBody, MessageResponse, RoleResponse, UpdateRoleBody};
use crate::handlers::ApiError;
use crate::middleware::{require_permissions, AuthenticatedUser};
use crate::routes::validated;

pub fn configure<S: AuthStore, Q: JobQueue>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/roles")
            .route("", web::get().to(list_roles::<S, Q>))
            .route("", web::post().to(create_role::<S, Q>))
            .route("/{id}", web::get().to(get_role::<S, Q>))
            .route("/{id}", web::patch().to(update_role::<S, Q>))
            .route("/{id}", web::delete().to(delete_role::<S, Q>)),
    );
}

fn users(action: Action) -> [Permission; 1] {
    [Permission::new(Resource::Users, [action])]
}

/// Handler for GET /api/v1/roles
///
/// Lists every role, newest first.
pub async fn list_roles<S: AuthStore, Q: JobQueue>(
    state: web::Data<AppState<S, Q>>,
    user: Option<AuthenticatedUser>,
) -> Result<HttpResponse, ApiError> {
    require_permissions(&state.evaluator, user, &users(Action::Read)).await?;

    let roles: Vec<RoleResponse> = state
        .roles
        .list_roles()
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();
    Ok(HttpResponse::Ok().json(roles))
}

/// Handler for GET /api/v1/roles/{id}
pub async fn get_role<S: AuthStore, Q: JobQueue>(
    state: web::Data<AppState<S, Q>>,
    user: Option<AuthenticatedUser>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    require_permissions(&state.evaluator, user, &users(Action::Read)).await?;

    let role = state.roles.get_role(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(RoleResponse::from(role)))
}

/// Handler for POST /api/v1/roles
///
/// # Request Body
///
/// ```json
/// {
///     "name": "catalog_manager",
///     "permissions": [
///         { "resource": "products", "actions": ["create", "read", "update"] }
///     ]
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Name length, unknown resource or action, or a
///   resource listed twice
/// - 409 Conflict: A role with this name exists
pub async fn create_role<S: AuthStore, Q: JobQueue>(
    state: web::Data<AppState<S, Q>>,
    user: Option<AuthenticatedUser>,
    body: web::Json<CreateRoleBody>,
) -> Result<HttpResponse, ApiError> {
    require_permissions(&state.evaluator, user, &users(Action::Create)).await?;
    let body = validated(body)?;

    let role = state.roles.create_role(&body.name, body.permissions).await?;
    Ok(HttpResponse::Ok().json(RoleResponse::from(role)))
}

/// Handler for PATCH /api/v1/roles/{id}
///
/// Renames the role and/or replaces its permission list.
pub async fn update_role<S: AuthStore, Q: JobQueue>(
    state: web::Data<AppState<S, Q>>,
    user: Option<AuthenticatedUser>,
    id: web::Path<Uuid>,
    body: web::Json<UpdateRoleBody>,
) -> Result<HttpResponse, ApiError> {
    require_permissions(&state.evaluator, user, &users(Action::Update)).await?;
    let body = validated(body)?;

    let role = state.roles.update_role(id.into_inner(), body.into()).await?;
    Ok(HttpResponse::Ok().json(RoleResponse::from(role)))
}

/// Handler for DELETE /api/v1/roles/{id}
///
/// Users holding the role are left without one. The built-in super admin
/// role cannot be deleted.
pub async fn delete_role<S: AuthStore, Q: JobQueue>(
    state: web::Data<AppState<S, Q>>,
    user: Option<AuthenticatedUser>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    require_permissions(&state.evaluator, user, &users(Action::Delete)).await?;

    state.roles.delete_role(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Role deleted successfully")))
}

//! Application wiring: shared state, route table and request limits.

use actix_web::{error::JsonPayloadError, web, HttpRequest, HttpResponse};
use serde_json::json;
use std::sync::Arc;

use sf_core::repositories::AuthStore;
use sf_core::services::{
    AccountService, AccountServiceConfig, JobQueue, NotificationDispatcher, PermissionEvaluator,
    RoleService, TokenService, TokenServiceConfig,
};
use sf_shared::config::AuthConfig;

use crate::handlers::ApiError;
use crate::routes;

/// Services shared by all handlers
pub struct AppState<S: AuthStore, Q: JobQueue> {
    pub accounts: AccountService<S, Q>,
    pub roles: RoleService<S>,
    pub evaluator: PermissionEvaluator<S>,
    pub tokens: Arc<TokenService>,
}

impl<S: AuthStore, Q: JobQueue> AppState<S, Q> {
    /// Build every service over one store and one job queue
    pub fn new(store: Arc<S>, queue: Arc<Q>, auth: &AuthConfig) -> Self {
        let tokens = Arc::new(TokenService::new(TokenServiceConfig::from(&auth.jwt)));
        let accounts = AccountService::new(
            Arc::clone(&store),
            NotificationDispatcher::new(queue),
            Arc::clone(&tokens),
            AccountServiceConfig::from(auth),
        );

        Self {
            accounts,
            roles: RoleService::new(Arc::clone(&store)),
            evaluator: PermissionEvaluator::new(store),
            tokens,
        }
    }
}

/// Register state, body limits and every route
///
/// Returns a closure for [`actix_web::App::configure`] so that the binary
/// and the tests build the same application.
pub fn configure_app<S: AuthStore, Q: JobQueue>(
    state: web::Data<AppState<S, Q>>,
    max_payload_size: usize,
) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::Data::from(Arc::clone(&state.tokens)))
            .app_data(state)
            .app_data(
                web::JsonConfig::default()
                    .limit(max_payload_size)
                    .error_handler(json_error_handler),
            )
            .app_data(web::PathConfig::default().error_handler(|err, _req| {
                ApiError::BadRequest(err.to_string()).into()
            }))
            .route("/health", web::get().to(health_check))
            .service(
                web::scope("/api/v1")
                    .configure(routes::auth::configure::<S, Q>)
                    .configure(routes::roles::configure::<S, Q>),
            );
    }
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = match &err {
        JsonPayloadError::Deserialize(e) => format!("Invalid request body: {}", e),
        JsonPayloadError::ContentType => "Content type must be application/json".to_string(),
        other => other.to_string(),
    };
    ApiError::BadRequest(message).into()
}

/// Health check endpoint
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": "storefront-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

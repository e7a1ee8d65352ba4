//! CORS configuration for browser clients of the storefront.

use actix_cors::Cors;
use actix_web::http::{header, Method};

use sf_shared::config::CorsConfig;

/// Build the CORS middleware from configuration
///
/// `*` in `allowed_origins` allows any origin; otherwise only the listed
/// origins are accepted. An empty list rejects all cross-origin requests.
pub fn create_cors(config: &CorsConfig) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec![
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::ORIGIN,
        ])
        .max_age(config.max_age);

    if config.allows_any_origin() {
        tracing::info!(event = "cors_configured", mode = "any_origin", "CORS allows any origin");
        return cors.allow_any_origin();
    }

    tracing::info!(
        event = "cors_configured",
        origins = ?config.allowed_origins,
        "CORS restricted to configured origins"
    );
    config
        .allowed_origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, web, App, HttpResponse};

    #[actix_web::test]
    async fn test_configured_origin_allowed() {
        let config = CorsConfig {
            allowed_origins: vec!["https://shop.example.com".to_string()],
            ..CorsConfig::default()
        };
        let app = test::init_service(
            App::new()
                .wrap(create_cors(&config))
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, "https://shop.example.com"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://shop.example.com"
        );
    }

    #[actix_web::test]
    async fn test_unknown_origin_rejected() {
        let config = CorsConfig {
            allowed_origins: vec!["https://shop.example.com".to_string()],
            ..CorsConfig::default()
        };
        let app = test::init_service(
            App::new()
                .wrap(create_cors(&config))
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, "https://evil.example.net"))
            .to_request();
        if let Ok(resp) = test::try_call_service(&app, req).await {
            assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        }
    }
}

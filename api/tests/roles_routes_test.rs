//! Role administration over HTTP: authentication and permission checks at
//! the boundary, then the CRUD flow.

mod common;

use actix_web::{
    http::{header, StatusCode},
    test, App,
};
use serde_json::{json, Value};

use sf_api::configure_app;

use common::{latest_otp, setup, ADMIN_EMAIL, ADMIN_PASSWORD, MAX_PAYLOAD};

/// Log in and return the access token
macro_rules! login {
    ($app:expr, $email:expr, $password:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({"email": $email, "password": $password}))
            .to_request();
        let body: Value = test::call_and_read_body_json($app, req).await;
        body["accessToken"].as_str().expect("access token").to_string()
    }};
}

#[actix_web::test]
async fn test_roles_require_authentication() {
    let ctx = setup().await;
    let app = test::init_service(App::new().configure(configure_app(ctx.state.clone(), MAX_PAYLOAD))).await;

    let req = test::TestRequest::get().uri("/api/v1/roles").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "UNAUTHORIZED");

    let req = test::TestRequest::get()
        .uri("/api/v1/roles")
        .insert_header((header::AUTHORIZATION, "Bearer garbage"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_customer_is_forbidden() {
    let ctx = setup().await;
    let app = test::init_service(App::new().configure(configure_app(ctx.state.clone(), MAX_PAYLOAD))).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/signup")
        .set_json(json!({"email": "shopper@example.com", "name": "Shopper", "password": "Secret123!"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    let code = latest_otp(&ctx.queue, "shopper@example.com").await.expect("otp job");

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({"email": "shopper@example.com", "password": "Secret123!", "otp": code}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let token = body["accessToken"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/v1/roles")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "FORBIDDEN");
    assert_eq!(body["message"], "User does not have required resource permission");
}

#[actix_web::test]
async fn test_admin_role_crud() {
    let ctx = setup().await;
    let app = test::init_service(App::new().configure(configure_app(ctx.state.clone(), MAX_PAYLOAD))).await;
    let bearer = format!("Bearer {}", login!(&app, ADMIN_EMAIL, ADMIN_PASSWORD));

    let req = test::TestRequest::get()
        .uri("/api/v1/roles")
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .to_request();
    let roles: Value = test::call_and_read_body_json(&app, req).await;
    let names: Vec<&str> = roles
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"super_admin"));
    assert!(names.contains(&"customer"));

    let create = json!({
        "name": "catalog_manager",
        "permissions": [{"resource": "products", "actions": ["create", "read", "update"]}]
    });
    let req = test::TestRequest::post()
        .uri("/api/v1/roles")
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .set_json(&create)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let role: Value = test::read_body_json(resp).await;
    let id = role["id"].as_str().unwrap().to_string();
    assert_eq!(role["permissions"][0]["resource"], "products");

    let req = test::TestRequest::post()
        .uri("/api/v1/roles")
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .set_json(&create)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/roles/{}", id))
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .set_json(json!({"name": "catalog_admin"}))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["name"], "catalog_admin");
    assert_eq!(updated["permissions"], role["permissions"]);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/roles/{}", id))
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .to_request();
    let fetched: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched["name"], "catalog_admin");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/roles/{}", id))
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .to_request();
    let deleted: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(deleted["message"], "Role deleted successfully");

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/roles/{}", id))
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_role_body_errors() {
    let ctx = setup().await;
    let app = test::init_service(App::new().configure(configure_app(ctx.state.clone(), MAX_PAYLOAD))).await;
    let bearer = format!("Bearer {}", login!(&app, ADMIN_EMAIL, ADMIN_PASSWORD));

    let req = test::TestRequest::post()
        .uri("/api/v1/roles")
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .set_json(json!({"name": "ab", "permissions": []}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/v1/roles")
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .set_json(json!({"name": "warehouse", "permissions": [{"resource": "warehouse", "actions": ["read"]}]}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri("/api/v1/roles/not-a-uuid")
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_super_admin_role_cannot_be_deleted() {
    let ctx = setup().await;
    let app = test::init_service(App::new().configure(configure_app(ctx.state.clone(), MAX_PAYLOAD))).await;
    let bearer = format!("Bearer {}", login!(&app, ADMIN_EMAIL, ADMIN_PASSWORD));

    let req = test::TestRequest::get()
        .uri("/api/v1/roles")
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .to_request();
    let roles: Value = test::call_and_read_body_json(&app, req).await;
    let super_admin = roles
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["name"] == "super_admin")
        .expect("super_admin role");
    let id = super_admin["id"].as_str().unwrap();

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/roles/{}", id))
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
}

//! End-to-end tests for the `/api/v1/auth` endpoints over the in-memory
//! store and job queue.

mod common;

use actix_web::{http::header, http::StatusCode, test, App};
use serde_json::{json, Value};

use sf_api::configure_app;

use common::{latest_otp, latest_reset_token, setup, ADMIN_EMAIL, ADMIN_PASSWORD, MAX_PAYLOAD};

#[actix_web::test]
async fn test_signup_then_verify_with_otp() {
    let ctx = setup().await;
    let app = test::init_service(App::new().configure(configure_app(ctx.state.clone(), MAX_PAYLOAD))).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/signup")
        .set_json(json!({"email": "Jane@Example.com", "name": "Jane", "password": "Secret123!"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "User created successfully and Otp sent to email");

    // No code yet: verification is requested, no tokens are issued
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({"email": "jane@example.com", "password": "Secret123!"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "UNVERIFIED");
    assert_eq!(body["message"], "Account verification required");
    assert!(body.get("accessToken").is_none());

    let code = latest_otp(&ctx.queue, "jane@example.com").await.expect("otp job");

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({"email": "jane@example.com", "password": "Secret123!", "otp": code}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "VERIFIED");
    assert_eq!(body["user"]["email"], "jane@example.com");
    assert!(body["accessToken"].is_string());
    let refresh = body["refreshToken"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(json!({"refreshToken": refresh}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["accessToken"].is_string());
    assert!(body["expiresIn"].as_i64().unwrap() > 0);
}

#[actix_web::test]
async fn test_duplicate_signup_conflicts() {
    let ctx = setup().await;
    let app = test::init_service(App::new().configure(configure_app(ctx.state.clone(), MAX_PAYLOAD))).await;

    let signup = json!({"email": "dup@example.com", "name": "Dup", "password": "Secret123!"});
    let req = test::TestRequest::post().uri("/api/v1/auth/signup").set_json(&signup).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post().uri("/api/v1/auth/signup").set_json(&signup).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "CONFLICT");
    assert_eq!(ctx.store.user_count().await, 2);
}

#[actix_web::test]
async fn test_signup_validation_errors() {
    let ctx = setup().await;
    let app = test::init_service(App::new().configure(configure_app(ctx.state.clone(), MAX_PAYLOAD))).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/signup")
        .set_json(json!({"email": "not-an-email", "name": "X", "password": "Secret123!"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(body["details"]["email"].is_array());

    // Weak password is rejected by the account rules, not the DTO
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/signup")
        .set_json(json!({"email": "weak@example.com", "name": "Weak", "password": "password"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/signup")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "BAD_REQUEST");
}

#[actix_web::test]
async fn test_login_wrong_password_is_unauthorized() {
    let ctx = setup().await;
    let app = test::init_service(App::new().configure(configure_app(ctx.state.clone(), MAX_PAYLOAD))).await;

    for (email, password) in [(ADMIN_EMAIL, "Wrong123!"), ("nobody@example.com", ADMIN_PASSWORD)] {
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({"email": email, "password": password}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Invalid credentials");
    }
}

#[actix_web::test]
async fn test_change_password_requires_bearer_token() {
    let ctx = setup().await;
    let app = test::init_service(App::new().configure(configure_app(ctx.state.clone(), MAX_PAYLOAD))).await;

    let change = json!({"oldPassword": ADMIN_PASSWORD, "newPassword": "Changed123!"});
    let req = test::TestRequest::put()
        .uri("/api/v1/auth/change-password")
        .set_json(&change)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::put()
        .uri("/api/v1/auth/change-password")
        .insert_header((header::AUTHORIZATION, "Bearer not.a.jwt"))
        .set_json(&change)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "TOKEN_INVALID");

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({"email": ADMIN_EMAIL, "password": ADMIN_PASSWORD}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let access = body["accessToken"].as_str().unwrap().to_string();

    let req = test::TestRequest::put()
        .uri("/api/v1/auth/change-password")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", access)))
        .set_json(&change)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Password updated successfully");
    assert!(body["tokens"]["accessToken"].is_string());

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({"email": ADMIN_EMAIL, "password": "Changed123!"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_forgot_and_reset_password() {
    let ctx = setup().await;
    let app = test::init_service(App::new().configure(configure_app(ctx.state.clone(), MAX_PAYLOAD))).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/forgot-password")
        .set_json(json!({"email": "nobody@example.com"}))
        .to_request();
    let unknown: Value = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/forgot-password")
        .set_json(json!({"email": ADMIN_EMAIL}))
        .to_request();
    let known: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(unknown["message"], known["message"]);

    let req = test::TestRequest::put()
        .uri("/api/v1/auth/reset-password")
        .set_json(json!({"newPassword": "Reset123!", "resetToken": "bogus"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let token = latest_reset_token(&ctx.queue, ADMIN_EMAIL).await.expect("reset job");
    let req = test::TestRequest::put()
        .uri("/api/v1/auth/reset-password")
        .set_json(json!({"newPassword": "Reset123!", "resetToken": token}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    // Tokens are single use
    let req = test::TestRequest::put()
        .uri("/api/v1/auth/reset-password")
        .set_json(json!({"newPassword": "Again123!", "resetToken": token}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({"email": ADMIN_EMAIL, "password": "Reset123!"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_resend_otp() {
    let ctx = setup().await;
    let app = test::init_service(App::new().configure(configure_app(ctx.state.clone(), MAX_PAYLOAD))).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/resend-otp")
        .set_json(json!({"email": "nobody@example.com"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    // Already verified
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/resend-otp")
        .set_json(json!({"email": ADMIN_EMAIL}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_health_check() {
    let ctx = setup().await;
    let app = test::init_service(App::new().configure(configure_app(ctx.state.clone(), MAX_PAYLOAD))).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "healthy");
}

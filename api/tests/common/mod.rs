#![allow(dead_code)]

use actix_web::web;
use std::sync::Arc;

use sf_api::AppState;
use sf_core::domain::entities::{job_names, JobPayload};
use sf_core::repositories::InMemoryAuthStore;
use sf_core::services::bootstrap::{seed_defaults, AdminSeed};
use sf_core::services::notification::{decode_job, InMemoryJobQueue};
use sf_core::services::CredentialService;
use sf_shared::config::AuthConfig;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "Admin123!";
pub const MAX_PAYLOAD: usize = 64 * 1024;

pub type TestState = AppState<InMemoryAuthStore, InMemoryJobQueue>;

pub struct TestContext {
    pub store: Arc<InMemoryAuthStore>,
    pub queue: Arc<InMemoryJobQueue>,
    pub state: web::Data<TestState>,
}

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        bcrypt_cost: 4,
        ..AuthConfig::default()
    }
}

/// Seeded store with the built-in roles and a verified super admin
pub async fn setup() -> TestContext {
    let store = Arc::new(InMemoryAuthStore::new());
    let queue = Arc::new(InMemoryJobQueue::new());
    let config = auth_config();

    let admin = AdminSeed {
        email: ADMIN_EMAIL.to_string(),
        password: ADMIN_PASSWORD.to_string(),
    };
    seed_defaults(
        store.as_ref(),
        &CredentialService::new(config.bcrypt_cost),
        Some(&admin),
    )
    .await
    .expect("seed");

    let state = web::Data::new(AppState::new(Arc::clone(&store), Arc::clone(&queue), &config));
    TestContext { store, queue, state }
}

/// Most recent verification code emailed to `email`
pub async fn latest_otp(queue: &InMemoryJobQueue, email: &str) -> Option<String> {
    let mut jobs = queue.pending_jobs().await;
    jobs.sort_by_key(|job| job.queued_at);
    jobs.iter()
        .rev()
        .filter(|job| job.name == job_names::SEND_OTP)
        .filter_map(|job| match decode_job(job) {
            Ok(JobPayload::SendOtp(otp)) if otp.to == email => Some(otp.otp),
            _ => None,
        })
        .next()
}

/// Most recent reset token emailed to `email`
pub async fn latest_reset_token(queue: &InMemoryJobQueue, email: &str) -> Option<String> {
    let mut jobs = queue.pending_jobs().await;
    jobs.sort_by_key(|job| job.queued_at);
    jobs.iter()
        .rev()
        .filter_map(|job| match decode_job(job) {
            Ok(JobPayload::PasswordReset(reset)) if reset.to == email => Some(reset.token),
            _ => None,
        })
        .next()
}

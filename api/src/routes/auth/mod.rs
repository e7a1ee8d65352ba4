//! Account lifecycle endpoints under `/auth`.

mod login;
mod otp;
mod password;
mod refresh;
mod signup;

pub use login::login;
pub use otp::resend_otp;
pub use password::{change_password, forgot_password, reset_password};
pub use refresh::refresh_token;
pub use signup::signup;

use actix_web::web;

use sf_core::repositories::AuthStore;
use sf_core::services::JobQueue;

pub fn configure<S: AuthStore, Q: JobQueue>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/signup", web::post().to(signup::<S, Q>))
            .route("/login", web::post().to(login::<S, Q>))
            .route("/resend-otp", web::post().to(resend_otp::<S, Q>))
            .route("/refresh", web::post().to(refresh_token::<S, Q>))
            .route("/change-password", web::put().to(change_password::<S, Q>))
            .route("/forgot-password", web::post().to(forgot_password::<S, Q>))
            .route("/reset-password", web::put().to(reset_password::<S, Q>)),
    );
}

//! Domain entities representing core business objects.

pub mod notification;
pub mod otp;
pub mod reset_token;
pub mod role;
pub mod token;
pub mod user;

// Re-export commonly used types
pub use notification::{
    job_names, JobHandle, JobOptions, JobPayload, JobState, NotificationJob, OrderConfirmationEmail,
    OrderLine, OrderSummary, OtpEmail, PasswordResetEmail,
};
pub use otp::{OtpPurpose, OtpRecord};
pub use reset_token::ResetToken;
pub use role::{Action, Permission, Resource, Role, SUPER_ADMIN_ROLE};
pub use token::{Claims, TokenKind, TokenPair};
pub use user::{AccountStatus, User};

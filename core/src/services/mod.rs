//! Business services containing domain logic and use cases.

pub mod account;
pub mod authorization;
pub mod bootstrap;
pub mod credential;
pub mod notification;
pub mod otp;
pub mod reset;
pub mod roles;
pub mod token;

// Re-export commonly used types
pub use account::{AccountService, AccountServiceConfig, LoginRequest, SignupRequest};
pub use authorization::{AccessDecision, DenyReason, PermissionEvaluator};
pub use bootstrap::{seed_defaults, AdminSeed, SeedReport};
pub use credential::CredentialService;
pub use notification::{
    InMemoryJobQueue, JobQueue, MailJobHandler, MailTransport, NotificationDispatcher,
    NotificationWorker,
};
pub use otp::{OtpService, OtpServiceConfig};
pub use reset::{ResetServiceConfig, ResetTokenService};
pub use roles::{RoleService, RoleUpdate};
pub use token::{TokenService, TokenServiceConfig};

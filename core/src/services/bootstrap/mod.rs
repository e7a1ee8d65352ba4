//! Idempotent seeding of the built-in roles and the initial administrator.

use tracing::info;

use sf_shared::validation::normalize_email;

use crate::domain::entities::{Action, Permission, Resource, Role, User, SUPER_ADMIN_ROLE};
use crate::errors::DomainResult;
use crate::repositories::{AuthStore, AuthTransaction};
use crate::services::credential::CredentialService;

/// Name of the role given to self-registered accounts
pub const CUSTOMER_ROLE: &str = "customer";

/// Display name of the seeded administrator
pub const ADMIN_NAME: &str = "Super Admin";

/// Credentials of the initial administrator
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

impl AdminSeed {
    /// Read `INITIAL_ADMIN_EMAIL` and `INITIAL_ADMIN_PASSWORD`; `None` unless
    /// both are set
    pub fn from_env() -> Option<Self> {
        let email = std::env::var("INITIAL_ADMIN_EMAIL").ok()?;
        let password = std::env::var("INITIAL_ADMIN_PASSWORD").ok()?;
        if email.trim().is_empty() || password.is_empty() {
            return None;
        }
        Some(Self { email, password })
    }
}

/// What a seeding run created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub super_admin_role_created: bool,
    pub customer_role_created: bool,
    pub admin_created: bool,
}

pub fn super_admin_permissions() -> Vec<Permission> {
    vec![
        Permission::all(Resource::Users),
        Permission::all(Resource::Products),
        Permission::all(Resource::Category),
        Permission::all(Resource::Settings),
    ]
}

pub fn customer_permissions() -> Vec<Permission> {
    vec![
        Permission::new(Resource::Products, [Action::Read]),
        Permission::new(Resource::Category, [Action::Read]),
        Permission::new(Resource::Reviews, [Action::Read, Action::Create]),
        Permission::new(Resource::Orders, [Action::Create]),
    ]
}

/// Ensure the built-in roles exist and, when `admin` is given, that an
/// account with that email exists. Existing rows are never modified.
pub async fn seed_defaults<S: AuthStore>(
    store: &S,
    credentials: &CredentialService,
    admin: Option<&AdminSeed>,
) -> DomainResult<SeedReport> {
    let mut report = SeedReport::default();
    let mut tx = store.begin().await?;

    let (super_admin, created) =
        ensure_role(tx.as_mut(), SUPER_ADMIN_ROLE, super_admin_permissions()).await?;
    report.super_admin_role_created = created;
    let (_, created) = ensure_role(tx.as_mut(), CUSTOMER_ROLE, customer_permissions()).await?;
    report.customer_role_created = created;

    if let Some(admin) = admin {
        let email = normalize_email(&admin.email);
        if tx.find_user_by_email(&email).await?.is_none() {
            let hash = credentials.hash_password(&admin.password).await?;
            let mut user = User::new(&email, ADMIN_NAME, hash, Some(super_admin.id));
            user.verify();
            tx.insert_user(&user).await?;
            report.admin_created = true;
            info!(event = "super_admin_seeded", user_id = %user.id, "Super admin created");
        }
    }

    tx.commit().await?;
    info!(
        event = "seed_completed",
        super_admin_role_created = report.super_admin_role_created,
        customer_role_created = report.customer_role_created,
        admin_created = report.admin_created,
        "Seed data ensured"
    );
    Ok(report)
}

async fn ensure_role(
    tx: &mut dyn AuthTransaction,
    name: &str,
    permissions: Vec<Permission>,
) -> DomainResult<(Role, bool)> {
    if let Some(role) = tx.find_role_by_name(name).await? {
        return Ok((role, false));
    }
    let role = Role::new(name, permissions)?;
    tx.insert_role(&role).await?;
    Ok((role, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::AccountStatus;
    use crate::repositories::InMemoryAuthStore;

    fn admin() -> AdminSeed {
        AdminSeed {
            email: "Admin@Example.com".to_string(),
            password: "Adm1n!pass".to_string(),
        }
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let store = InMemoryAuthStore::new();
        let credentials = CredentialService::new(4);

        let first = seed_defaults(&store, &credentials, Some(&admin())).await.unwrap();
        let second = seed_defaults(&store, &credentials, Some(&admin())).await.unwrap();

        assert_eq!(
            first,
            SeedReport {
                super_admin_role_created: true,
                customer_role_created: true,
                admin_created: true,
            }
        );
        assert_eq!(second, SeedReport::default());
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_admin_is_verified_super_admin() {
        let store = InMemoryAuthStore::new();
        seed_defaults(&store, &CredentialService::new(4), Some(&admin()))
            .await
            .unwrap();

        let user = store.user_by_email("admin@example.com").await.unwrap();
        assert_eq!(user.status, AccountStatus::Verified);
        assert_eq!(user.name, ADMIN_NAME);

        let mut tx = store.begin().await.unwrap();
        let role = tx.find_role_by_id(user.role_id.unwrap()).await.unwrap().unwrap();
        assert!(role.is_super_admin());
        assert_eq!(role.permissions, super_admin_permissions());
    }

    #[tokio::test]
    async fn test_roles_seeded_without_admin() {
        let store = InMemoryAuthStore::new();
        let report = seed_defaults(&store, &CredentialService::new(4), None)
            .await
            .unwrap();

        assert!(report.customer_role_created);
        assert!(!report.admin_created);
        assert_eq!(store.user_count().await, 0);
    }
}

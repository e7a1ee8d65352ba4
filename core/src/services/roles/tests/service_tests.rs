//! Unit tests for role service

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{Action, Permission, Resource, SUPER_ADMIN_ROLE};
use crate::errors::{DomainError, ErrorKind, ValidationError};
use crate::repositories::InMemoryAuthStore;
use crate::services::roles::{RoleService, RoleUpdate};

fn service() -> RoleService<InMemoryAuthStore> {
    RoleService::new(Arc::new(InMemoryAuthStore::new()))
}

fn read(resource: Resource) -> Permission {
    Permission::new(resource, [Action::Read])
}

#[tokio::test]
async fn test_create_and_get_role() {
    let roles = service();

    let created = roles
        .create_role("editor", vec![read(Resource::Products)])
        .await
        .unwrap();
    let fetched = roles.get_role(created.id).await.unwrap();

    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let roles = service();
    let first = roles.create_role("first", vec![]).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = roles.create_role("second", vec![]).await.unwrap();

    let listed = roles.list_roles().await.unwrap();
    let ids: Vec<Uuid> = listed.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[tokio::test]
async fn test_duplicate_name_conflicts() {
    let roles = service();
    roles.create_role("editor", vec![]).await.unwrap();

    let err = roles.create_role("editor", vec![]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err.to_string(), "Role with name editor already exists");
}

#[tokio::test]
async fn test_name_length_and_duplicate_resources_are_bad_requests() {
    let roles = service();

    let err = roles.create_role("ab", vec![]).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationError::InvalidLength { .. })));

    let err = roles
        .create_role(
            "twice",
            vec![read(Resource::Orders), Permission::all(Resource::Orders)],
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadRequest);
}

#[tokio::test]
async fn test_update_role() {
    let roles = service();
    let role = roles.create_role("editor", vec![]).await.unwrap();

    let updated = roles
        .update_role(
            role.id,
            RoleUpdate {
                name: Some("writer".to_string()),
                permissions: Some(vec![Permission::all(Resource::Reviews)]),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "writer");
    assert_eq!(
        roles.get_role(role.id).await.unwrap().permissions,
        vec![Permission::all(Resource::Reviews)]
    );
}

#[tokio::test]
async fn test_rename_collision_conflicts() {
    let roles = service();
    roles.create_role("editor", vec![]).await.unwrap();
    let viewer = roles.create_role("viewer", vec![]).await.unwrap();

    let err = roles
        .update_role(
            viewer.id,
            RoleUpdate {
                name: Some("editor".to_string()),
                ..RoleUpdate::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn test_super_admin_cannot_be_deleted_or_renamed() {
    let roles = service();
    let admin = roles
        .create_role(SUPER_ADMIN_ROLE, vec![Permission::all(Resource::Users)])
        .await
        .unwrap();

    let err = roles.delete_role(admin.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let err = roles
        .update_role(
            admin.id,
            RoleUpdate {
                name: Some("root".to_string()),
                ..RoleUpdate::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
    assert!(roles.get_role(admin.id).await.is_ok());
}

#[tokio::test]
async fn test_delete_role() {
    let roles = service();
    let role = roles.create_role("temporary", vec![]).await.unwrap();

    roles.delete_role(role.id).await.unwrap();

    let err = roles.get_role(role.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    let err = roles.delete_role(role.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

mod common;

use sqlx::PgPool;
use std::sync::Arc;
use qr_tracker::application::services::auth_service::hash_credential;
use qr_tracker::domain::repositories::OwnerRepository;
use qr_tracker::error::AppError;
use qr_tracker::infrastructure::persistence::PgOwnerRepository;

#[sqlx::test]
async fn test_create_owner(pool: PgPool) {
    let repo = PgOwnerRepository::new(Arc::new(pool));

    let owner = repo.create("alice", "digest-a").await.unwrap();

    assert_eq!(owner.handle, "alice");
    assert_eq!(owner.credential_hash, "digest-a");
}

#[sqlx::test]
async fn test_duplicate_handle_rejected(pool: PgPool) {
    let repo = PgOwnerRepository::new(Arc::new(pool));
    repo.create("alice", "digest-a").await.unwrap();

    let result = repo.create("alice", "digest-b").await;

    assert!(matches!(result, Err(AppError::Validation { .. })));
}

#[sqlx::test]
async fn test_find_by_credential(pool: PgPool) {
    let id = common::create_test_owner(&pool, "alice", "cred-alice").await;
    let repo = PgOwnerRepository::new(Arc::new(pool));

    let digest = hash_credential(common::SIGNING_SECRET, "cred-alice");
    let owner = repo.find_by_credential(&digest).await.unwrap();
    assert_eq!(owner.map(|o| o.id), Some(id));

    let wrong = hash_credential(common::SIGNING_SECRET, "cred-mallory");
    assert!(repo.find_by_credential(&wrong).await.unwrap().is_none());
}

#[sqlx::test]
async fn test_find_by_handle(pool: PgPool) {
    common::create_test_owner(&pool, "alice", "cred-alice").await;
    let repo = PgOwnerRepository::new(Arc::new(pool));

    assert!(repo.find_by_handle("alice").await.unwrap().is_some());
    assert!(repo.find_by_handle("bob").await.unwrap().is_none());
}

#[sqlx::test]
async fn test_list_owners_ordered(pool: PgPool) {
    common::create_test_owner(&pool, "zed", "cred-zed").await;
    common::create_test_owner(&pool, "amy", "cred-amy").await;
    let repo = PgOwnerRepository::new(Arc::new(pool));

    let owners = repo.list().await.unwrap();

    let handles: Vec<&str> = owners.iter().map(|o| o.handle.as_str()).collect();
    assert_eq!(handles, vec!["zed", "amy"]);
}

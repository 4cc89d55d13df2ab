#![allow(dead_code)]

use sqlx::PgPool;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc;
use qr_tracker::application::services::auth_service::hash_credential;
use qr_tracker::application::services::{AuthService, CodeService, ScanService};
use qr_tracker::domain::notification_hub::NotificationHub;
use qr_tracker::domain::scan_event::ScanEvent;
use qr_tracker::infrastructure::assets::FsAssetStore;
use qr_tracker::infrastructure::cache::NullCache;
use qr_tracker::infrastructure::persistence::{PgCodeRepository, PgOwnerRepository};
use qr_tracker::state::AppState;
use qr_tracker::utils::token_minter::RandomTokenMinter;

pub const SIGNING_SECRET: &str = "test-signing-secret";
pub const BASE_URL: &str = "http://qr.test";

pub async fn create_test_owner(pool: &PgPool, handle: &str, credential: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO owners (handle, credential_hash) VALUES ($1, $2) RETURNING id",
    )
    .bind(handle)
    .bind(hash_credential(SIGNING_SECRET, credential))
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_test_code(pool: &PgPool, owner_id: i64, token: &str, url: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO codes (owner_id, target_url, redirect_token, asset_reference) \
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(owner_id)
    .bind(url)
    .bind(token)
    .bind(format!("{token}.svg"))
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn scan_count(pool: &PgPool, code_id: i64) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT scan_count FROM codes WHERE id = $1")
        .bind(code_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Builds a state backed by `pool`, a throwaway asset directory and no cache.
///
/// The returned receiver is the consumer side of the scan queue; keep it alive
/// for as long as the queue should report healthy.
pub fn create_test_state(pool: PgPool) -> (AppState, mpsc::Receiver<ScanEvent>, TempDir) {
    let pool = Arc::new(pool);
    let (tx, rx) = mpsc::channel(100);
    let assets_dir = TempDir::new().unwrap();

    let code_repo = Arc::new(PgCodeRepository::new(pool.clone()));
    let owner_repo = Arc::new(PgOwnerRepository::new(pool));
    let assets = Arc::new(FsAssetStore::new(assets_dir.path(), BASE_URL));
    let cache = Arc::new(NullCache::new());

    let code_service = Arc::new(CodeService::new(
        code_repo.clone(),
        assets,
        Arc::new(RandomTokenMinter),
        cache.clone(),
        100,
    ));
    let scan_service = Arc::new(ScanService::new(code_repo, cache.clone(), tx.clone()));
    let auth_service = Arc::new(AuthService::new(owner_repo, SIGNING_SECRET.to_string()));

    let state = AppState {
        code_service,
        scan_service,
        auth_service,
        hub: Arc::new(NotificationHub::new(16)),
        cache,
        scan_sender: tx,
    };

    (state, rx, assets_dir)
}

mod common;

use axum::{Router, middleware};
use axum_test::TestServer;
use serde_json::{Value, json};
use sqlx::PgPool;
use tempfile::TempDir;
use qr_tracker::api::middleware::auth;
use qr_tracker::api::routes::protected_routes;

const ALICE: &str = "cred-alice";
const BOB: &str = "cred-bob";

fn bearer(credential: &str) -> String {
    format!("Bearer {credential}")
}

async fn setup(pool: PgPool) -> (TestServer, TempDir) {
    common::create_test_owner(&pool, "alice", ALICE).await;
    common::create_test_owner(&pool, "bob", BOB).await;

    let (state, _rx, assets) = common::create_test_state(pool);
    let app = Router::new()
        .merge(protected_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer))
        .with_state(state);

    (TestServer::new(app).unwrap(), assets)
}

async fn create_codes(server: &TestServer, credential: &str, count: i64) {
    let response = server
        .post("/codes")
        .add_header("Authorization", bearer(credential))
        .json(&json!({ "target_url": "https://example.com/menu", "count": count }))
        .await;

    assert_eq!(response.status_code(), 201);
}

async fn list_codes(server: &TestServer, credential: &str) -> Vec<Value> {
    let response = server
        .get("/codes")
        .add_header("Authorization", bearer(credential))
        .await;

    response.assert_status_ok();
    response.json::<Vec<Value>>()
}

#[sqlx::test]
async fn test_create_codes(pool: PgPool) {
    let (server, assets) = setup(pool).await;

    let response = server
        .post("/codes")
        .add_header("Authorization", bearer(ALICE))
        .json(&json!({ "target_url": "https://example.com/menu", "count": 3 }))
        .await;

    assert_eq!(response.status_code(), 201);
    assert_eq!(response.json::<Value>()["count"], 3);

    let codes = list_codes(&server, ALICE).await;
    assert_eq!(codes.len(), 3);

    for code in &codes {
        assert_eq!(code["target_url"], "https://example.com/menu");
        assert_eq!(code["scan_count"], 0);
        assert!(code["display_name"].is_null());

        let reference = code["asset_reference"].as_str().unwrap();
        assert!(assets.path().join(reference).exists());
    }

    let mut tokens: Vec<&str> = codes
        .iter()
        .map(|c| c["redirect_token"].as_str().unwrap())
        .collect();
    tokens.sort_unstable();
    tokens.dedup();
    assert_eq!(tokens.len(), 3);
}

#[sqlx::test]
async fn test_create_codes_accepts_numeric_string_count(pool: PgPool) {
    let (server, _assets) = setup(pool).await;

    let response = server
        .post("/codes")
        .add_header("Authorization", bearer(ALICE))
        .json(&json!({ "target_url": "https://example.com", "count": "2" }))
        .await;

    assert_eq!(response.status_code(), 201);
    assert_eq!(list_codes(&server, ALICE).await.len(), 2);
}

#[sqlx::test]
async fn test_create_codes_rejects_invalid_input(pool: PgPool) {
    let (server, _assets) = setup(pool).await;

    let bodies = [
        json!({ "target_url": "", "count": 1 }),
        json!({ "target_url": "https://example.com", "count": 0 }),
        json!({ "target_url": "https://example.com", "count": -2 }),
        json!({ "target_url": "https://example.com", "count": 101 }),
        json!({ "target_url": "ftp://example.com", "count": 1 }),
        json!({ "target_url": "https://example.com/\n", "count": 1 }),
        json!({ "target_url": "https://example.com/a\r\nX-Evil: 1", "count": 1 }),
        json!({ "target_url": " https://example.com", "count": 1 }),
        json!({ "count": 1 }),
        json!({ "target_url": "https://example.com", "count": "many" }),
    ];

    for body in bodies {
        let response = server
            .post("/codes")
            .add_header("Authorization", bearer(ALICE))
            .json(&body)
            .await;

        assert_eq!(response.status_code(), 400, "body: {body}");
        assert_eq!(response.json::<Value>()["error"]["code"], "validation_error");
    }

    assert!(list_codes(&server, ALICE).await.is_empty());
}

#[sqlx::test]
async fn test_requires_credential(pool: PgPool) {
    let (server, _assets) = setup(pool).await;

    let response = server.get("/codes").await;
    assert_eq!(response.status_code(), 401);

    let response = server
        .get("/codes")
        .add_header("Authorization", bearer("not-a-real-credential"))
        .await;
    assert_eq!(response.status_code(), 401);

    let response = server
        .post("/codes")
        .json(&json!({ "target_url": "https://example.com", "count": 1 }))
        .await;
    assert_eq!(response.status_code(), 401);
}

#[sqlx::test]
async fn test_list_is_scoped_to_owner(pool: PgPool) {
    let (server, _assets) = setup(pool).await;

    create_codes(&server, ALICE, 2).await;
    create_codes(&server, BOB, 1).await;

    let alice_codes = list_codes(&server, ALICE).await;
    let bob_codes = list_codes(&server, BOB).await;

    assert_eq!(alice_codes.len(), 2);
    assert_eq!(bob_codes.len(), 1);
    assert!(alice_codes[0]["id"].as_i64() < alice_codes[1]["id"].as_i64());
}

#[sqlx::test]
async fn test_rename_code(pool: PgPool) {
    let (server, _assets) = setup(pool).await;
    create_codes(&server, ALICE, 1).await;
    let id = list_codes(&server, ALICE).await[0]["id"].as_i64().unwrap();

    let response = server
        .patch(&format!("/codes/{id}"))
        .add_header("Authorization", bearer(ALICE))
        .json(&json!({ "display_name": "  Table 4  " }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["display_name"], "Table 4");

    let response = server
        .patch(&format!("/codes/{id}"))
        .add_header("Authorization", bearer(ALICE))
        .json(&json!({ "display_name": null }))
        .await;

    response.assert_status_ok();
    assert!(response.json::<Value>()["display_name"].is_null());
}

#[sqlx::test]
async fn test_rename_rejects_long_name(pool: PgPool) {
    let (server, _assets) = setup(pool).await;
    create_codes(&server, ALICE, 1).await;
    let id = list_codes(&server, ALICE).await[0]["id"].as_i64().unwrap();

    let response = server
        .patch(&format!("/codes/{id}"))
        .add_header("Authorization", bearer(ALICE))
        .json(&json!({ "display_name": "x".repeat(101) }))
        .await;

    assert_eq!(response.status_code(), 400);
}

#[sqlx::test]
async fn test_rename_limit_applies_to_trimmed_name(pool: PgPool) {
    let (server, _assets) = setup(pool).await;
    create_codes(&server, ALICE, 1).await;
    let id = list_codes(&server, ALICE).await[0]["id"].as_i64().unwrap();
    let label = "y".repeat(100);

    let response = server
        .patch(&format!("/codes/{id}"))
        .add_header("Authorization", bearer(ALICE))
        .json(&json!({ "display_name": format!("  {label}  ") }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["display_name"], label.as_str());
}

#[sqlx::test]
async fn test_foreign_code_is_indistinguishable_from_missing(pool: PgPool) {
    let (server, _assets) = setup(pool).await;
    create_codes(&server, ALICE, 1).await;
    let id = list_codes(&server, ALICE).await[0]["id"].as_i64().unwrap();

    let foreign = server
        .patch(&format!("/codes/{id}"))
        .add_header("Authorization", bearer(BOB))
        .json(&json!({ "display_name": "mine now" }))
        .await;
    let missing = server
        .patch(&format!("/codes/{}", id + 1000))
        .add_header("Authorization", bearer(BOB))
        .json(&json!({ "display_name": "mine now" }))
        .await;

    assert_eq!(foreign.status_code(), 404);
    assert_eq!(missing.status_code(), 404);
    assert_eq!(
        foreign.json::<Value>()["error"]["message"],
        missing.json::<Value>()["error"]["message"]
    );

    let response = server
        .delete(&format!("/codes/{id}"))
        .add_header("Authorization", bearer(BOB))
        .await;
    assert_eq!(response.status_code(), 404);

    let codes = list_codes(&server, ALICE).await;
    assert_eq!(codes.len(), 1);
    assert!(codes[0]["display_name"].is_null());
}

#[sqlx::test]
async fn test_non_numeric_id_is_not_found(pool: PgPool) {
    let (server, _assets) = setup(pool).await;

    let response = server
        .delete("/codes/abc")
        .add_header("Authorization", bearer(ALICE))
        .await;

    assert_eq!(response.status_code(), 404);
}

#[sqlx::test]
async fn test_delete_code_removes_record_and_image(pool: PgPool) {
    let (server, assets) = setup(pool).await;
    create_codes(&server, ALICE, 2).await;
    let codes = list_codes(&server, ALICE).await;
    let id = codes[0]["id"].as_i64().unwrap();
    let reference = codes[0]["asset_reference"].as_str().unwrap().to_string();

    let response = server
        .delete(&format!("/codes/{id}"))
        .add_header("Authorization", bearer(ALICE))
        .await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["id"], id);
    assert_eq!(json["deleted"], true);

    assert!(!assets.path().join(&reference).exists());

    let remaining = list_codes(&server, ALICE).await;
    assert_eq!(remaining.len(), 1);
    assert_ne!(remaining[0]["id"].as_i64(), Some(id));

    let again = server
        .delete(&format!("/codes/{id}"))
        .add_header("Authorization", bearer(ALICE))
        .await;
    assert_eq!(again.status_code(), 404);
}

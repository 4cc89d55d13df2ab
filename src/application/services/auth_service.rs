//! Authentication service for owner API credentials.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

use crate::domain::entities::Owner;
use crate::domain::repositories::OwnerRepository;
use crate::error::AppError;
use serde_json::json;

type HmacSha256 = Hmac<Sha256>;

/// Hashes a raw credential with HMAC-SHA256 keyed by `signing_secret`.
///
/// Returns a 64-character lowercase hex-encoded MAC. The admin CLI uses this
/// directly when registering owners.
pub fn hash_credential(signing_secret: &str, credential: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(signing_secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(credential.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Resolves Bearer credentials to owners.
///
/// Credentials are hashed with HMAC-SHA256 (keyed by `signing_secret`) before
/// lookup. An attacker with read-only access to the database cannot verify or
/// forge credentials without the server-side secret.
pub struct AuthService<R: OwnerRepository> {
    repository: Arc<R>,
    signing_secret: String,
}

impl<R: OwnerRepository> AuthService<R> {
    /// Creates a new authentication service.
    ///
    /// `signing_secret` must match the value used when owners were registered.
    pub fn new(repository: Arc<R>, signing_secret: String) -> Self {
        Self {
            repository,
            signing_secret,
        }
    }

    pub fn hash_credential(&self, credential: &str) -> String {
        hash_credential(&self.signing_secret, credential)
    }

    /// Authenticates a raw credential and returns the owner it belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthenticated`] if no owner holds this credential.
    /// Storage errors propagate unchanged.
    pub async fn authenticate(&self, credential: &str) -> Result<Owner, AppError> {
        let credential_hash = self.hash_credential(credential);

        self.repository
            .find_by_credential(&credential_hash)
            .await?
            .ok_or_else(|| {
                AppError::unauthenticated(
                    "Unauthorized",
                    json!({ "reason": "Unknown credential" }),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockOwnerRepository;
    use chrono::Utc;

    fn test_secret() -> String {
        "test-signing-secret".to_string()
    }

    fn owner(id: i64, credential_hash: &str) -> Owner {
        Owner {
            id,
            handle: format!("owner{id}"),
            credential_hash: credential_hash.to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let mut mock_repo = MockOwnerRepository::new();
        let expected_hash = hash_credential(&test_secret(), "valid-credential");
        let stored_hash = expected_hash.clone();

        mock_repo
            .expect_find_by_credential()
            .withf(move |hash| hash == &expected_hash)
            .times(1)
            .returning(move |_| Ok(Some(owner(42, &stored_hash))));

        let service = AuthService::new(Arc::new(mock_repo), test_secret());

        let owner = service.authenticate("valid-credential").await.unwrap();

        assert_eq!(owner.id, 42);
    }

    #[tokio::test]
    async fn test_authenticate_unknown_credential() {
        let mut mock_repo = MockOwnerRepository::new();

        mock_repo
            .expect_find_by_credential()
            .times(1)
            .returning(|_| Ok(None));

        let service = AuthService::new(Arc::new(mock_repo), test_secret());

        let result = service.authenticate("nope").await;

        assert!(matches!(
            result.unwrap_err(),
            AppError::Unauthenticated { .. }
        ));
    }

    #[tokio::test]
    async fn test_authenticate_propagates_storage_errors() {
        let mut mock_repo = MockOwnerRepository::new();

        mock_repo.expect_find_by_credential().returning(|_| {
            Err(AppError::storage_unavailable("down", json!({})))
        });

        let service = AuthService::new(Arc::new(mock_repo), test_secret());

        assert!(matches!(
            service.authenticate("x").await.unwrap_err(),
            AppError::StorageUnavailable { .. }
        ));
    }

    #[test]
    fn test_hash_credential_consistency() {
        let hash1 = hash_credential(&test_secret(), "credential");
        let hash2 = hash_credential(&test_secret(), "credential");

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_hash_credential_secret_matters() {
        assert_ne!(
            hash_credential("secret-a", "credential"),
            hash_credential("secret-b", "credential")
        );
    }

    #[test]
    fn test_service_hash_matches_free_function() {
        let service = AuthService::new(Arc::new(MockOwnerRepository::new()), test_secret());

        assert_eq!(
            service.hash_credential("abc"),
            hash_credential(&test_secret(), "abc")
        );
    }
}

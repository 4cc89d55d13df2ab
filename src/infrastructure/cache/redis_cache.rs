//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService, CachedCode};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, error, info, warn};

/// Redis cache for redirect token lookups.
///
/// Values are JSON-encoded [`CachedCode`] entries under the `code:` prefix.
/// All operations are fail-open: errors are logged but don't propagate to callers.
pub struct RedisCache {
    client: ConnectionManager,
    default_ttl: u64,
    key_prefix: String,
}

impl RedisCache {
    /// Connects to Redis, validates the connection with a PING, and configures the default TTL.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the connection cannot
    /// be established, or the PING health check fails.
    pub async fn connect(redis_url: &str, default_ttl_seconds: u64) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(Self {
            client: manager,
            default_ttl: default_ttl_seconds,
            key_prefix: "code:".to_string(),
        })
    }

    fn build_key(&self, token: &str) -> String {
        format!("{}{}", self.key_prefix, token)
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_code(&self, token: &str) -> CacheResult<Option<CachedCode>> {
        let key = self.build_key(token);
        let mut conn = self.client.clone();

        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<CachedCode>(&raw) {
                Ok(code) => {
                    debug!(token, code_id = code.id, "Cache HIT");
                    Ok(Some(code))
                }
                Err(e) => {
                    warn!(token, "Discarding undecodable cache entry: {}", e);
                    Ok(None)
                }
            },
            Ok(None) => {
                debug!(token, "Cache MISS");
                Ok(None)
            }
            Err(e) => {
                error!("Redis GET error for {}: {}", token, e);
                Ok(None)
            }
        }
    }

    async fn set_code(
        &self,
        token: &str,
        code: &CachedCode,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        let key = self.build_key(token);
        let ttl = ttl_seconds.unwrap_or(self.default_ttl);
        let value = serde_json::to_string(code)
            .map_err(|e| CacheError::OperationError(e.to_string()))?;
        let mut conn = self.client.clone();

        match conn.set_ex::<_, _, ()>(&key, value, ttl).await {
            Ok(()) => {
                debug!(token, code_id = code.id, ttl, "Cache SET");
                Ok(())
            }
            Err(e) => {
                warn!("Redis SET error for {}: {}", token, e);
                Ok(())
            }
        }
    }

    async fn invalidate(&self, token: &str) -> CacheResult<()> {
        let key = self.build_key(token);
        let mut conn = self.client.clone();

        match conn.del::<_, i32>(&key).await {
            Ok(deleted) => {
                if deleted > 0 {
                    debug!(token, "Cache INVALIDATE");
                }
                Ok(())
            }
            Err(e) => {
                warn!("Redis DEL error for {}: {}", token, e);
                Ok(())
            }
        }
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}

//! Cache service trait and error types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors that can occur during cache operations.
#[derive(Debug)]
pub enum CacheError {
    ConnectionError(String),
    OperationError(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Cache connection error: {}", e),
            Self::OperationError(e) => write!(f, "Cache operation error: {}", e),
        }
    }
}

impl std::error::Error for CacheError {}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// The immutable part of a code needed to answer a scan.
///
/// The scan counter is deliberately absent: it changes on every scan and is
/// always read back from the store's atomic increment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedCode {
    pub id: i64,
    pub target_url: String,
}

/// Trait for caching redirect token lookups.
///
/// Implementations must be thread-safe and fail open: a broken cache degrades
/// to database lookups, it never fails a scan.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the cached code for a redirect token.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(code))` on cache hit
    /// - `Ok(None)` on cache miss or error (fail-open behavior)
    async fn get_code(&self, token: &str) -> CacheResult<Option<CachedCode>>;

    /// Stores a token mapping with an optional TTL in seconds.
    ///
    /// Implementations log errors and return `Ok(())`.
    async fn set_code(
        &self,
        token: &str,
        code: &CachedCode,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()>;

    /// Removes a cached mapping. Used when a code is deleted.
    async fn invalidate(&self, token: &str) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;
}

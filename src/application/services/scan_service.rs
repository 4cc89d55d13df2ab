//! Scan resolution: token lookup, atomic counter increment, live notification.

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};

use crate::domain::repositories::CodeRepository;
use crate::domain::scan_event::ScanEvent;
use crate::error::AppError;
use crate::infrastructure::cache::{CacheService, CachedCode};
use crate::utils::token_minter::is_well_formed_token;

/// What a scan resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Counter incremented; send the scanner to `target_url`.
    Redirect {
        code_id: i64,
        target_url: String,
        scan_count: i64,
    },
    /// Unknown, malformed or just-deleted token.
    InvalidCode,
}

/// Resolves public scans.
///
/// The counter is incremented by the store in a single statement, so
/// concurrent scans of one token never lose updates. The resulting event is
/// handed to the notification worker with `try_send`; a full or closed queue
/// costs the live dashboards one update but never delays or fails the scan.
pub struct ScanService<C: CodeRepository> {
    repository: Arc<C>,
    cache: Arc<dyn CacheService>,
    events: mpsc::Sender<ScanEvent>,
}

impl<C: CodeRepository> ScanService<C> {
    pub fn new(
        repository: Arc<C>,
        cache: Arc<dyn CacheService>,
        events: mpsc::Sender<ScanEvent>,
    ) -> Self {
        Self {
            repository,
            cache,
            events,
        }
    }

    /// Resolves `token`, counting the scan if the code exists.
    ///
    /// # Errors
    ///
    /// Only storage failures are errors. Unknown tokens resolve to
    /// [`ScanOutcome::InvalidCode`] without touching any counter.
    pub async fn resolve(&self, token: &str) -> Result<ScanOutcome, AppError> {
        if !is_well_formed_token(token) {
            return Ok(ScanOutcome::InvalidCode);
        }

        let Some(code) = self.lookup(token).await? else {
            tracing::debug!(token, "Scan of unknown token");
            return Ok(ScanOutcome::InvalidCode);
        };

        let Some(scan_count) = self.repository.increment_scan(code.id).await? else {
            // Deleted between lookup and increment, or a stale cache entry.
            if let Err(e) = self.cache.invalidate(token).await {
                tracing::warn!(token, error = %e, "Cache invalidation failed");
            }
            return Ok(ScanOutcome::InvalidCode);
        };

        metrics::counter!("scans_total").increment(1);
        self.notify(ScanEvent::new(code.id, scan_count));

        tracing::debug!(code_id = code.id, scan_count, "Scan recorded");

        Ok(ScanOutcome::Redirect {
            code_id: code.id,
            target_url: code.target_url,
            scan_count,
        })
    }

    /// True while the notification worker is still draining the queue.
    pub fn queue_is_open(&self) -> bool {
        !self.events.is_closed()
    }

    async fn lookup(&self, token: &str) -> Result<Option<CachedCode>, AppError> {
        match self.cache.get_code(token).await {
            Ok(Some(cached)) => return Ok(Some(cached)),
            Ok(None) => {}
            Err(e) => tracing::warn!(token, error = %e, "Cache lookup failed"),
        }

        let Some(code) = self.repository.find_by_token(token).await? else {
            return Ok(None);
        };

        let cached = CachedCode {
            id: code.id,
            target_url: code.target_url,
        };

        if let Err(e) = self.cache.set_code(token, &cached, None).await {
            tracing::warn!(token, error = %e, "Cache store failed");
        }

        Ok(Some(cached))
    }

    fn notify(&self, event: ScanEvent) {
        match self.events.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                metrics::counter!("scan_notifications_dropped_total").increment(1);
                tracing::warn!(code_id = event.id, "Scan queue full, dropping notification");
            }
            Err(TrySendError::Closed(event)) => {
                metrics::counter!("scan_notifications_dropped_total").increment(1);
                tracing::debug!(code_id = event.id, "Scan queue closed, dropping notification");
            }
        }
    }
}

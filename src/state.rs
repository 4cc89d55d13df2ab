//! Shared application state injected into every handler.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::services::{AuthService, CodeService, ScanService};
use crate::domain::notification_hub::NotificationHub;
use crate::domain::scan_event::ScanEvent;
use crate::infrastructure::assets::FsAssetStore;
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::persistence::{PgCodeRepository, PgOwnerRepository};

/// Services and channels shared by all request handlers.
///
/// Cheap to clone: every field is an `Arc` or a channel handle.
#[derive(Clone)]
pub struct AppState {
    pub code_service: Arc<CodeService<PgCodeRepository, FsAssetStore>>,
    pub scan_service: Arc<ScanService<PgCodeRepository>>,
    pub auth_service: Arc<AuthService<PgOwnerRepository>>,
    pub hub: Arc<NotificationHub>,
    pub cache: Arc<dyn CacheService>,
    /// Producer side of the scan queue, kept for health reporting.
    pub scan_sender: mpsc::Sender<ScanEvent>,
}

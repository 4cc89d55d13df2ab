//! Background task that forwards scan events to live subscribers.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::domain::notification_hub::NotificationHub;
use crate::domain::scan_event::ScanEvent;

/// Drains the scan queue and broadcasts each event.
///
/// Delivery is best-effort: no retry, no acknowledgment. The task ends when
/// every sender has been dropped.
pub async fn run_notification_worker(mut rx: mpsc::Receiver<ScanEvent>, hub: Arc<NotificationHub>) {
    while let Some(event) = rx.recv().await {
        let report = hub.broadcast(&event);

        debug!(
            code_id = event.id,
            scan_count = event.scan_count,
            delivered = report.delivered,
            dropped = report.dropped,
            pruned = report.pruned,
            "Broadcast scan update"
        );
    }

    info!("Scan queue closed, notification worker stopped");
}

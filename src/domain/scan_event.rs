//! Scan notification message.

use serde::Serialize;

/// A scan counter update pushed to live subscribers.
///
/// Carries only the code id and its new counter value. Created by the scan
/// path after a successful increment and handed to the notification worker
/// through a bounded channel, which decouples redirect latency from fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScanEvent {
    pub id: i64,
    pub scan_count: i64,
}

impl ScanEvent {
    /// Creates a new scan event.
    pub fn new(id: i64, scan_count: i64) -> Self {
        Self { id, scan_count }
    }
}

//! Frames pushed over the live scan channel.

use serde::Serialize;

use crate::domain::scan_event::ScanEvent;

/// Event name carried by every scan frame.
pub const SCAN_UPDATE_EVENT: &str = "scan_update";

/// `{"event": "scan_update", "data": {"id": .., "scan_count": ..}}`
#[derive(Debug, Serialize)]
pub struct LiveMessage {
    pub event: &'static str,
    pub data: ScanEvent,
}

impl From<ScanEvent> for LiveMessage {
    fn from(data: ScanEvent) -> Self {
        Self {
            event: SCAN_UPDATE_EVENT,
            data,
        }
    }
}

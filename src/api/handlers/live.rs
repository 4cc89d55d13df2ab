//! WebSocket endpoint streaming scan updates to live dashboards.
//!
//! Every connection subscribes to the [`NotificationHub`] and receives one
//! text frame per scan, `{"event":"scan_update","data":{"id":..,"scan_count":..}}`.
//! The server pings every 15s and drops the connection after 45s without any
//! client traffic. Delivery is best-effort: a dashboard that falls behind
//! loses updates instead of slowing anyone else down.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use tokio::time::{self, Instant};
use tracing::{debug, warn};

use crate::api::dto::live::LiveMessage;
use crate::domain::notification_hub::{NotificationHub, Subscription};
use crate::domain::scan_event::ScanEvent;
use crate::state::AppState;

/// Time between pings to the client (shortened in tests).
#[cfg(not(test))]
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);
#[cfg(test)]
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

/// Idle time after which the session is dropped (shortened in tests).
#[cfg(not(test))]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(45);
#[cfg(test)]
const CLIENT_TIMEOUT: Duration = Duration::from_millis(100);

/// Upgrades to a WebSocket carrying `scan_update` events.
///
/// # Endpoint
///
/// `GET /ws`
///
/// Public and unfiltered: every subscriber sees every owner's scan updates.
pub async fn live_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    upgrade(ws, state.hub.clone())
}

fn upgrade(ws: WebSocketUpgrade, hub: Arc<NotificationHub>) -> Response {
    ws.on_upgrade(move |socket| run_session(socket, hub))
}

#[derive(Debug)]
enum SessionEnd {
    ClientClosed,
    StreamClosed,
    HeartbeatTimeout,
    HubClosed,
    Network(axum::Error),
}

async fn run_session(mut socket: WebSocket, hub: Arc<NotificationHub>) {
    let mut subscription = hub.subscribe();
    let id = subscription.id();
    debug!(subscriber_id = id, "Live session started");

    let end = session_loop(&mut socket, &mut subscription).await;

    hub.unsubscribe(id);
    match end {
        SessionEnd::Network(e) => warn!(subscriber_id = id, error = %e, "Live session failed"),
        other => debug!(subscriber_id = id, reason = ?other, "Live session ended"),
    }

    let _ = socket.send(Message::Close(None)).await;
}

async fn session_loop(socket: &mut WebSocket, subscription: &mut Subscription) -> SessionEnd {
    let mut last_seen = Instant::now();
    let mut heartbeat = time::interval_at(last_seen + HEARTBEAT_INTERVAL, HEARTBEAT_INTERVAL);

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                if last_seen.elapsed() > CLIENT_TIMEOUT {
                    return SessionEnd::HeartbeatTimeout;
                }
                if let Err(e) = socket.send(Message::Ping(Bytes::new())).await {
                    return SessionEnd::Network(e);
                }
            }
            event = subscription.recv() => {
                let Some(event) = event else {
                    return SessionEnd::HubClosed;
                };
                if let Err(e) = send_event(socket, event).await {
                    return SessionEnd::Network(e);
                }
            }
            message = socket.recv() => {
                match message {
                    None => return SessionEnd::StreamClosed,
                    Some(Err(e)) => return SessionEnd::Network(e),
                    Some(Ok(Message::Close(_))) => return SessionEnd::ClientClosed,
                    // Pings are answered by the protocol layer; any frame counts as liveness.
                    Some(Ok(_)) => last_seen = Instant::now(),
                }
            }
        }
    }
}

async fn send_event(socket: &mut WebSocket, event: ScanEvent) -> Result<(), axum::Error> {
    match serde_json::to_string(&LiveMessage::from(event)) {
        Ok(body) => socket.send(Message::Text(body.into())).await,
        Err(e) => {
            warn!(error = %e, "Failed to serialize scan update");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, routing::get};
    use axum_test::TestServer;

    async fn wait_for_subscribers(hub: &NotificationHub, expected: usize) {
        time::timeout(Duration::from_secs(5), async {
            while hub.subscriber_count() != expected {
                time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
    }

    fn server(hub: Arc<NotificationHub>) -> TestServer {
        let app = Router::new()
            .route(
                "/ws",
                get(
                    |ws: WebSocketUpgrade, State(hub): State<Arc<NotificationHub>>| async move {
                        upgrade(ws, hub)
                    },
                ),
            )
            .with_state(hub);

        TestServer::builder().http_transport().build(app).unwrap()
    }

    #[tokio::test]
    async fn test_session_delivers_broadcast_events() {
        let hub = Arc::new(NotificationHub::new(8));
        let server = server(hub.clone());

        let mut socket = server.get_websocket("/ws").await.into_websocket().await;
        wait_for_subscribers(&hub, 1).await;

        assert_eq!(hub.broadcast(&ScanEvent::new(7, 3)).delivered, 1);

        let frame: serde_json::Value = socket.receive_json().await;
        assert_eq!(
            frame,
            serde_json::json!({ "event": "scan_update", "data": { "id": 7, "scan_count": 3 } })
        );
    }

    #[tokio::test]
    async fn test_idle_session_is_dropped_and_unsubscribed() {
        let hub = Arc::new(NotificationHub::new(8));
        let server = server(hub.clone());

        // Never read, so pings go unanswered.
        let _socket = server.get_websocket("/ws").await.into_websocket().await;
        wait_for_subscribers(&hub, 1).await;

        time::sleep(CLIENT_TIMEOUT + HEARTBEAT_INTERVAL * 3).await;

        wait_for_subscribers(&hub, 0).await;
    }

    #[tokio::test]
    async fn test_disconnect_unsubscribes() {
        let hub = Arc::new(NotificationHub::new(8));
        let server = server(hub.clone());

        let socket = server.get_websocket("/ws").await.into_websocket().await;
        wait_for_subscribers(&hub, 1).await;

        drop(socket);

        wait_for_subscribers(&hub, 0).await;
    }
}

//! WebSocket endpoint bridging browser clients to the hub.
//!
//! Each accepted socket gets a fresh connection handle and an outbox
//! channel; the socket task pumps hub events out and client frames in.
//! The hub itself never touches the socket.

use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::debug;

use crate::hub::{ClientEvent, ConnectionId, HubHandle};

/// Issues connection handles; unique for the process lifetime.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// GET /ws — upgrade to a chat connection.
pub async fn ws_handler(ws: WebSocketUpgrade, State(hub): State<HubHandle>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

/// Pump one WebSocket connection until it closes.
async fn handle_socket(socket: WebSocket, hub: HubHandle) {
    let conn = ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
    debug!(conn = %conn, "websocket connection opened");

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (outbox, mut events) = mpsc::unbounded_channel();
    hub.connect(conn, outbox);

    loop {
        tokio::select! {
            frame = ws_receiver.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientEvent>(&text) {
                            Ok(event) => hub.inbound(conn, event),
                            Err(err) => {
                                // Unknown or malformed events are ignored
                                debug!(conn = %conn, %err, "ignoring malformed client event");
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = ws_sender.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(conn = %conn, "websocket closed by client");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        debug!(conn = %conn, %err, "websocket error");
                        break;
                    }
                }
            }

            event = events.recv() => {
                match event {
                    Some(event) => {
                        match serde_json::to_string(&event) {
                            Ok(json) => {
                                if ws_sender.send(Message::Text(json.into())).await.is_err() {
                                    break;
                                }
                            }
                            Err(err) => {
                                debug!(conn = %conn, %err, "failed to encode server event");
                            }
                        }
                    }
                    // The hub dropped our outbox
                    None => break,
                }
            }
        }
    }

    hub.disconnect(conn);
    debug!(conn = %conn, "websocket connection closed");
}

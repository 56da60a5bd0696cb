//! Hub service task: the single event-processing path.
//!
//! Every WebSocket connection funnels its inbound events through one
//! mpsc channel into a task that exclusively owns the hub state. No
//! two events are ever processed concurrently, so the registry needs
//! no locking; mutual exclusion is structural.

use tokio::sync::mpsc;
use tracing::error;

use super::events::{ClientEvent, ServerEvent};
use super::hub::Hub;
use super::session::ConnectionId;
use super::transport::ChannelTransport;

/// Requests processed by the hub task.
#[derive(Debug)]
pub enum HubRequest {
    /// A transport connection was accepted; attach its outbox.
    Connect {
        /// The new connection's handle.
        conn: ConnectionId,
        /// Channel the hub delivers events through.
        outbox: mpsc::UnboundedSender<ServerEvent>,
    },
    /// An event arrived from a connection.
    Inbound {
        /// Originating connection.
        conn: ConnectionId,
        /// The decoded event.
        event: ClientEvent,
    },
    /// A transport connection closed.
    Disconnect {
        /// The closed connection's handle.
        conn: ConnectionId,
    },
}

/// Cloneable handle for submitting requests to the hub task.
///
/// Submission is fire-and-forget; if the hub task is gone (process
/// shutdown), requests are silently dropped.
#[derive(Debug, Clone)]
pub struct HubHandle {
    tx: mpsc::UnboundedSender<HubRequest>,
}

impl HubHandle {
    /// Attach a freshly accepted connection.
    pub fn connect(&self, conn: ConnectionId, outbox: mpsc::UnboundedSender<ServerEvent>) {
        let _ = self.tx.send(HubRequest::Connect { conn, outbox });
    }

    /// Submit an inbound client event.
    pub fn inbound(&self, conn: ConnectionId, event: ClientEvent) {
        let _ = self.tx.send(HubRequest::Inbound { conn, event });
    }

    /// Signal that a connection closed.
    pub fn disconnect(&self, conn: ConnectionId) {
        let _ = self.tx.send(HubRequest::Disconnect { conn });
    }
}

/// Spawn the hub task and return a handle to it.
///
/// The task runs until every handle is dropped.
pub fn spawn_hub() -> HubHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(run(rx));
    HubHandle { tx }
}

/// Process hub requests, one at a time, until the channel closes.
async fn run(mut rx: mpsc::UnboundedReceiver<HubRequest>) {
    let mut hub = Hub::new(ChannelTransport::new());

    while let Some(request) = rx.recv().await {
        match request {
            HubRequest::Connect { conn, outbox } => {
                hub.transport_mut().attach(conn, outbox);
            }
            HubRequest::Inbound { conn, event } => {
                if let Err(err) = hub.dispatch(conn, event) {
                    // A duplicate handle means the transport broke its
                    // contract. Cut the connection's delivery channel;
                    // the rest of the hub keeps running.
                    error!(conn = %conn, %err, "registry contract violation");
                    hub.transport_mut().detach(conn);
                }
            }
            HubRequest::Disconnect { conn } => {
                hub.handle_disconnect(conn);
                hub.transport_mut().detach(conn);
            }
        }
    }
}

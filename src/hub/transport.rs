//! Delivery capability used by the router.
//!
//! The hub treats the transport as fire-and-forget: hand the payload
//! over and return. Events sent to the same connection preserve
//! submission order; there is no acknowledgment and no retry.

use std::collections::HashMap;

use tokio::sync::mpsc;

use super::events::ServerEvent;
use super::session::ConnectionId;

/// Ability to send a named payload to a specific connection.
pub trait Transport {
    /// Deliver an event to one connection.
    ///
    /// Delivery failures (connection already torn down, slow client)
    /// are the transport's problem; the hub does not observe them.
    fn send(&mut self, to: ConnectionId, event: ServerEvent);
}

/// Transport backed by per-connection unbounded channels.
///
/// The WebSocket layer attaches an outbox when a connection is
/// accepted and detaches it when the socket closes.
#[derive(Debug, Default)]
pub struct ChannelTransport {
    outboxes: HashMap<ConnectionId, mpsc::UnboundedSender<ServerEvent>>,
}

impl ChannelTransport {
    /// Create a transport with no attached connections.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the outbox for a connection.
    pub fn attach(&mut self, id: ConnectionId, outbox: mpsc::UnboundedSender<ServerEvent>) {
        self.outboxes.insert(id, outbox);
    }

    /// Drop the outbox for a connection.
    ///
    /// Returns false if none was attached.
    pub fn detach(&mut self, id: ConnectionId) -> bool {
        self.outboxes.remove(&id).is_some()
    }

    /// Whether a connection currently has an outbox.
    pub fn is_attached(&self, id: ConnectionId) -> bool {
        self.outboxes.contains_key(&id)
    }
}

impl Transport for ChannelTransport {
    fn send(&mut self, to: ConnectionId, event: ServerEvent) {
        if let Some(outbox) = self.outboxes.get(&to) {
            // The receiver half may already be gone mid-disconnect.
            let _ = outbox.send(event);
        }
    }
}

/// Transport that records every delivery, for unit tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingTransport {
    pub sent: Vec<(ConnectionId, ServerEvent)>,
}

#[cfg(test)]
impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events delivered to one connection, in submission order.
    pub fn sent_to(&self, id: ConnectionId) -> Vec<ServerEvent> {
        self.sent
            .iter()
            .filter(|(to, _)| *to == id)
            .map(|(_, event)| event.clone())
            .collect()
    }
}

#[cfg(test)]
impl Transport for RecordingTransport {
    fn send(&mut self, to: ConnectionId, event: ServerEvent) {
        self.sent.push((to, event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_and_send() {
        let mut transport = ChannelTransport::new();
        let id = ConnectionId::new(1);
        let (tx, mut rx) = mpsc::unbounded_channel();

        transport.attach(id, tx);
        assert!(transport.is_attached(id));

        transport.send(id, ServerEvent::Message("hello".to_string()));
        assert_eq!(
            rx.try_recv().unwrap(),
            ServerEvent::Message("hello".to_string())
        );
    }

    #[test]
    fn test_send_to_unattached_connection_is_a_no_op() {
        let mut transport = ChannelTransport::new();
        transport.send(ConnectionId::new(9), ServerEvent::Message("lost".to_string()));
    }

    #[test]
    fn test_detach() {
        let mut transport = ChannelTransport::new();
        let id = ConnectionId::new(1);
        let (tx, mut rx) = mpsc::unbounded_channel();

        transport.attach(id, tx);
        assert!(transport.detach(id));
        assert!(!transport.is_attached(id));
        assert!(!transport.detach(id));

        transport.send(id, ServerEvent::Message("late".to_string()));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_send_after_receiver_dropped() {
        let mut transport = ChannelTransport::new();
        let id = ConnectionId::new(1);
        let (tx, rx) = mpsc::unbounded_channel();
        transport.attach(id, tx);
        drop(rx);

        // Must not panic; delivery failure is invisible to the hub
        transport.send(id, ServerEvent::Message("gone".to_string()));
    }

    #[test]
    fn test_per_connection_ordering() {
        let mut transport = ChannelTransport::new();
        let id = ConnectionId::new(1);
        let (tx, mut rx) = mpsc::unbounded_channel();
        transport.attach(id, tx);

        transport.send(id, ServerEvent::Message("first".to_string()));
        transport.send(id, ServerEvent::Message("second".to_string()));

        assert_eq!(rx.try_recv().unwrap(), ServerEvent::Message("first".to_string()));
        assert_eq!(rx.try_recv().unwrap(), ServerEvent::Message("second".to_string()));
    }
}

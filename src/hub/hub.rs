//! The chat hub: session lifecycle and inbound event dispatch.
//!
//! `Hub` composes the connection registry, the per-session block
//! lists, and the router. Each connection moves through three states:
//! Connecting (transport open, no username yet), Active (registered),
//! Terminated (removed). There is no way back from Terminated; a
//! reconnecting client gets a fresh handle.
//!
//! All mutation of shared chat state happens through a single `Hub`
//! value, which the service task (see [`spawn_hub`](super::spawn_hub))
//! owns exclusively.

use chrono::Local;
use tracing::{debug, info};

use super::events::{ClientEvent, ServerEvent};
use super::registry::Registry;
use super::router;
use super::session::{ConnectionId, Session};
use super::transport::Transport;
use crate::Result;

/// Format the current local time the way chat lines display it.
fn timestamp() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

/// Session lifecycle manager and event router for the chat hub.
pub struct Hub<T: Transport> {
    registry: Registry,
    transport: T,
}

impl<T: Transport> Hub<T> {
    /// Create a hub with an empty registry.
    pub fn new(transport: T) -> Self {
        Self {
            registry: Registry::new(),
            transport,
        }
    }

    /// Access the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Read access to the registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Number of active sessions.
    pub fn session_count(&self) -> usize {
        self.registry.len()
    }

    /// Dispatch one inbound client event to its handler.
    pub fn dispatch(&mut self, conn: ConnectionId, event: ClientEvent) -> Result<()> {
        match event {
            ClientEvent::Intro(username) => self.handle_join(conn, username)?,
            ClientEvent::Message(text) => self.handle_message(conn, &text),
            ClientEvent::PrivateMessage { username, message } => {
                self.handle_private_message(conn, &username, &message)
            }
            ClientEvent::BlockUser { username } => self.handle_block_toggle(conn, &username),
        }
        Ok(())
    }

    /// Join: Connecting → Active.
    ///
    /// Registers the session, then in order: the current user list to
    /// the joiner, a new-user announcement to everyone else, a join
    /// notice to everyone else, and a welcome line to the joiner.
    /// Partial delivery failures are not rolled back; delivery is the
    /// transport's responsibility.
    pub fn handle_join(&mut self, conn: ConnectionId, username: String) -> Result<()> {
        self.registry.add(Session::new(conn, username.as_str()))?;
        info!(conn = %conn, username = %username, "user joined");

        // The listing shows everyone who was here before the joiner.
        let users: Vec<String> = self
            .registry
            .iter()
            .filter(|s| s.id() != conn)
            .map(|s| s.username().to_string())
            .collect();
        self.transport.send(conn, ServerEvent::UserList { users });

        router::announce_new_user(&self.registry, &mut self.transport, conn);
        router::broadcast_except(
            &self.registry,
            &mut self.transport,
            conn,
            ServerEvent::Message(format!(
                "{} - {} has entered the chat room.",
                timestamp(),
                username
            )),
        );
        self.transport.send(
            conn,
            ServerEvent::Message(format!("{} - Welcome, {}", timestamp(), username)),
        );
        Ok(())
    }

    /// Broadcast a chat line from an active session.
    ///
    /// Messages from handles with no registered session (sent before
    /// the intro, or racing a disconnect) are dropped.
    pub fn handle_message(&mut self, conn: ConnectionId, text: &str) {
        let Some(sender) = self.registry.get(conn) else {
            debug!(conn = %conn, "message from unregistered connection dropped");
            return;
        };
        let username = sender.username().to_string();
        let line = format!("{} - {}: {}", timestamp(), username, text);
        router::broadcast_message(&self.registry, &mut self.transport, &username, &line);
    }

    /// Route a private message from an active session.
    pub fn handle_private_message(&mut self, conn: ConnectionId, to: &str, text: &str) {
        router::send_private(&self.registry, &mut self.transport, conn, to, text);
    }

    /// Toggle a block-list entry for an active session.
    pub fn handle_block_toggle(&mut self, conn: ConnectionId, target: &str) {
        router::handle_block_toggle(&mut self.registry, &mut self.transport, conn, target);
    }

    /// Disconnect: Active → Terminated.
    ///
    /// Safe to call more than once per handle; a duplicate signal is
    /// logged and ignored. Disconnects of never-joined connections
    /// (socket closed before the intro) land here too and are silent.
    pub fn handle_disconnect(&mut self, conn: ConnectionId) {
        match self.registry.remove(conn) {
            Ok(session) => {
                info!(conn = %conn, username = %session.username(), "user disconnected");
                let line = format!("{} - {} has disconnected", timestamp(), session.username());
                router::announce_disconnect(
                    &self.registry,
                    &mut self.transport,
                    session.username(),
                    &line,
                );
            }
            Err(err) => {
                debug!(conn = %conn, %err, "disconnect for unregistered connection");
            }
        }
    }
}

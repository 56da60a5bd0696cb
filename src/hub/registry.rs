//! Connection registry: the canonical map of live sessions.
//!
//! Every entry corresponds to an active transport connection; sessions
//! are inserted on join and removed synchronously on disconnect.

use std::collections::HashMap;

use thiserror::Error;

use super::session::{ConnectionId, Session};

/// Registry contract violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A session was added under a handle that is already registered.
    /// The transport layer guarantees unique handles, so this indicates
    /// a contract violation and is treated as fatal.
    #[error("duplicate connection handle {0}")]
    DuplicateHandle(ConnectionId),

    /// A removal targeted a handle that is not registered. Duplicate
    /// disconnect signals are expected; callers log and move on.
    #[error("unknown connection handle {0}")]
    UnknownHandle(ConnectionId),
}

/// Registry of live sessions, keyed by connection handle.
///
/// Iteration follows connection (insertion) order, which is the order
/// the initial user listing displays.
#[derive(Debug, Default)]
pub struct Registry {
    /// Sessions indexed by handle.
    sessions: HashMap<ConnectionId, Session>,
    /// Handles in connection order.
    order: Vec<ConnectionId>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Insert a new session.
    pub fn add(&mut self, session: Session) -> Result<(), RegistryError> {
        let id = session.id();
        if self.sessions.contains_key(&id) {
            return Err(RegistryError::DuplicateHandle(id));
        }
        self.sessions.insert(id, session);
        self.order.push(id);
        Ok(())
    }

    /// Remove a session, returning it.
    pub fn remove(&mut self, id: ConnectionId) -> Result<Session, RegistryError> {
        let session = self
            .sessions
            .remove(&id)
            .ok_or(RegistryError::UnknownHandle(id))?;
        self.order.retain(|h| *h != id);
        Ok(session)
    }

    /// Look up a session by handle.
    pub fn get(&self, id: ConnectionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    /// Mutable lookup by handle, for block-list updates.
    pub fn get_mut(&mut self, id: ConnectionId) -> Option<&mut Session> {
        self.sessions.get_mut(&id)
    }

    /// Find the live session for a username.
    ///
    /// First match in connection order wins when duplicate usernames
    /// exist.
    pub fn find(&self, username: &str) -> Option<&Session> {
        self.iter().find(|s| s.username() == username)
    }

    /// Iterate sessions in connection order.
    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.order.iter().filter_map(|id| self.sessions.get(id))
    }

    /// Snapshot of usernames in connection order.
    pub fn usernames(&self) -> Vec<String> {
        self.iter().map(|s| s.username().to_string()).collect()
    }
}

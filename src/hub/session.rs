//! Session state for connected chat clients.
//!
//! A session pairs the transport-issued connection handle with the
//! username chosen at join time and the set of usernames the client
//! has chosen to mute.

use std::collections::HashSet;
use std::fmt;

/// Opaque identifier for one transport connection.
///
/// Issued by the transport layer when a connection is accepted and
/// stable for the connection's lifetime. Used as the registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Create a connection ID from a raw value.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Server-side state for one connected client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Connection handle.
    id: ConnectionId,
    /// Display name chosen at join time. Immutable after join;
    /// uniqueness is not enforced.
    username: String,
    /// Usernames this session has blocked.
    blocked: HashSet<String>,
}

impl Session {
    /// Create a new session for a freshly joined connection.
    pub fn new(id: ConnectionId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            blocked: HashSet::new(),
        }
    }

    /// Get the connection handle.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Get the display name.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Toggle the blocked state of a username.
    ///
    /// Returns true if the username is now blocked, false if it is now
    /// unblocked. Blocking your own name is permitted; it suppresses
    /// your own broadcast echo.
    pub fn toggle_block(&mut self, target: &str) -> bool {
        if self.blocked.remove(target) {
            false
        } else {
            self.blocked.insert(target.to_string());
            true
        }
    }

    /// Check whether this session has blocked a username. O(1).
    pub fn has_blocked(&self, username: &str) -> bool {
        self.blocked.contains(username)
    }
}

//! Wire event types exchanged with chat clients.
//!
//! Both directions use a JSON envelope of the form
//! `{"event": "...", "data": ...}`.

use serde::{Deserialize, Serialize};

/// Events received from clients.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Session init: the chosen display name.
    Intro(String),
    /// Broadcast a chat message to everyone.
    Message(String),
    /// Send a private message to a username.
    PrivateMessage {
        /// Target username.
        username: String,
        /// Message text.
        message: String,
    },
    /// Toggle the blocked state of a username.
    BlockUser {
        /// Target username.
        username: String,
    },
}

/// Events delivered to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Full user list, sent to a client right after it joins.
    UserList {
        /// Usernames in connection order.
        users: Vec<String>,
    },
    /// A new user connected.
    #[serde(rename_all = "camelCase")]
    NewUserConnected {
        /// The new user's name.
        username: String,
        /// Whether the receiving client already blocks that name.
        /// Always false right after a join; the flag exists so the
        /// client can render the entry consistently.
        is_blocked: bool,
    },
    /// Plain chat or system line, already timestamped.
    Message(String),
    /// Point-to-point message from another user.
    PrivateMessage {
        /// Sender's username.
        username: String,
        /// Message text.
        message: String,
    },
    /// A private send failed; the payload is the user-visible reason.
    PrivateMessageError(String),
    /// Result of a block toggle, sent to the toggling client only.
    #[serde(rename_all = "camelCase")]
    UserBlock {
        /// The toggled username.
        username: String,
        /// New blocked state.
        has_been_blocked: bool,
    },
    /// A user disconnected.
    ClientDisconnect {
        /// The departed user's name.
        username: String,
    },
}

//! Message routing: fan-out with block filtering, point-to-point
//! private delivery, and presence announcements.
//!
//! The router reads the registry and each target session's block list
//! to decide delivery; it never mutates registry membership itself.
//! A lookup miss is an expected runtime condition (the client
//! disconnected mid-flight), never fatal.

use thiserror::Error;
use tracing::debug;

use super::events::ServerEvent;
use super::registry::Registry;
use super::session::ConnectionId;
use super::transport::Transport;

/// A private message could not be delivered.
///
/// The display string is exactly what the sender sees.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// No live session has the target username.
    #[error("User {0} is not currently connected.")]
    RecipientNotFound(String),

    /// The recipient has blocked the sender.
    #[error("User {0} has blocked you.")]
    RecipientBlockedSender(String),
}

/// Deliver a broadcast line to every session that has not blocked the
/// sender.
///
/// The sender receives its own line too, unless it has blocked itself.
pub fn broadcast_message<T: Transport>(
    registry: &Registry,
    transport: &mut T,
    sender: &str,
    line: &str,
) {
    for session in registry.iter() {
        if !session.has_blocked(sender) {
            transport.send(session.id(), ServerEvent::Message(line.to_string()));
        }
    }
}

/// Deliver an event to every session except one, without block
/// filtering. Join notices use this.
pub fn broadcast_except<T: Transport>(
    registry: &Registry,
    transport: &mut T,
    except: ConnectionId,
    event: ServerEvent,
) {
    for session in registry.iter() {
        if session.id() != except {
            transport.send(session.id(), event.clone());
        }
    }
}

/// Tell every other session about a newly joined user, including
/// whether that session already blocks the name.
///
/// The flag is always false right after a normal join; a client cannot
/// hold block state against someone who was never connected.
pub fn announce_new_user<T: Transport>(
    registry: &Registry,
    transport: &mut T,
    new_session: ConnectionId,
) {
    let Some(new_user) = registry.get(new_session) else {
        debug!(conn = %new_session, "announce for unregistered connection dropped");
        return;
    };
    let username = new_user.username().to_string();

    for session in registry.iter() {
        if session.id() == new_session {
            continue;
        }
        transport.send(
            session.id(),
            ServerEvent::NewUserConnected {
                username: username.clone(),
                is_blocked: session.has_blocked(&username),
            },
        );
    }
}

/// Notify all remaining sessions that a user left: a readable system
/// line plus a structured event. Block lists never suppress these.
pub fn announce_disconnect<T: Transport>(
    registry: &Registry,
    transport: &mut T,
    username: &str,
    line: &str,
) {
    for session in registry.iter() {
        transport.send(session.id(), ServerEvent::Message(line.to_string()));
        transport.send(
            session.id(),
            ServerEvent::ClientDisconnect {
                username: username.to_string(),
            },
        );
    }
}

/// Route a private message.
///
/// On failure the sender alone is told why; the recipient never learns
/// that a blocked attempt happened.
pub fn send_private<T: Transport>(
    registry: &Registry,
    transport: &mut T,
    sender_id: ConnectionId,
    receiver_username: &str,
    text: &str,
) {
    let Some(sender) = registry.get(sender_id) else {
        debug!(conn = %sender_id, "private message from unregistered connection dropped");
        return;
    };

    let resolved = match registry.find(receiver_username) {
        None => Err(RouteError::RecipientNotFound(receiver_username.to_string())),
        Some(receiver) if receiver.has_blocked(sender.username()) => Err(
            RouteError::RecipientBlockedSender(receiver_username.to_string()),
        ),
        Some(receiver) => Ok(receiver.id()),
    };

    match resolved {
        Ok(receiver_id) => {
            transport.send(
                receiver_id,
                ServerEvent::PrivateMessage {
                    username: sender.username().to_string(),
                    message: text.to_string(),
                },
            );
        }
        Err(err) => {
            debug!(conn = %sender_id, %err, "private message not delivered");
            transport.send(sender_id, ServerEvent::PrivateMessageError(err.to_string()));
        }
    }
}

/// Toggle the caller's block on a username and report the new state to
/// the caller only. The target is never notified.
pub fn handle_block_toggle<T: Transport>(
    registry: &mut Registry,
    transport: &mut T,
    conn: ConnectionId,
    target: &str,
) {
    let Some(session) = registry.get_mut(conn) else {
        debug!(conn = %conn, "block toggle from unregistered connection dropped");
        return;
    };
    let blocked = session.toggle_block(target);
    transport.send(
        conn,
        ServerEvent::UserBlock {
            username: target.to_string(),
            has_been_blocked: blocked,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::session::Session;
    use crate::hub::transport::RecordingTransport;

    fn registry_with(names: &[&str]) -> Registry {
        let mut registry = Registry::new();
        for (i, name) in names.iter().enumerate() {
            registry
                .add(Session::new(ConnectionId::new(i as u64 + 1), *name))
                .unwrap();
        }
        registry
    }

    #[test]
    fn test_broadcast_reaches_everyone() {
        let registry = registry_with(&["alice", "bob", "carol"]);
        let mut transport = RecordingTransport::new();

        broadcast_message(&registry, &mut transport, "alice", "hi all");

        assert_eq!(transport.sent.len(), 3);
        for id in 1..=3 {
            assert_eq!(
                transport.sent_to(ConnectionId::new(id)),
                vec![ServerEvent::Message("hi all".to_string())]
            );
        }
    }

    #[test]
    fn test_broadcast_skips_blockers_only() {
        let mut registry = registry_with(&["alice", "bob", "carol"]);
        registry
            .get_mut(ConnectionId::new(2))
            .unwrap()
            .toggle_block("alice");
        let mut transport = RecordingTransport::new();

        broadcast_message(&registry, &mut transport, "alice", "hi");

        assert_eq!(transport.sent_to(ConnectionId::new(1)).len(), 1);
        assert!(transport.sent_to(ConnectionId::new(2)).is_empty());
        assert_eq!(transport.sent_to(ConnectionId::new(3)).len(), 1);
    }

    #[test]
    fn test_broadcast_self_block_suppresses_own_echo() {
        let mut registry = registry_with(&["alice", "bob"]);
        registry
            .get_mut(ConnectionId::new(1))
            .unwrap()
            .toggle_block("alice");
        let mut transport = RecordingTransport::new();

        broadcast_message(&registry, &mut transport, "alice", "hi");

        assert!(transport.sent_to(ConnectionId::new(1)).is_empty());
        assert_eq!(transport.sent_to(ConnectionId::new(2)).len(), 1);
    }

    #[test]
    fn test_broadcast_except_ignores_block_lists() {
        let mut registry = registry_with(&["alice", "bob"]);
        registry
            .get_mut(ConnectionId::new(2))
            .unwrap()
            .toggle_block("alice");
        let mut transport = RecordingTransport::new();

        broadcast_except(
            &registry,
            &mut transport,
            ConnectionId::new(1),
            ServerEvent::Message("alice has entered".to_string()),
        );

        assert!(transport.sent_to(ConnectionId::new(1)).is_empty());
        assert_eq!(transport.sent_to(ConnectionId::new(2)).len(), 1);
    }

    #[test]
    fn test_announce_new_user_skips_the_new_user() {
        let registry = registry_with(&["alice", "bob", "carol"]);
        let mut transport = RecordingTransport::new();

        announce_new_user(&registry, &mut transport, ConnectionId::new(3));

        assert!(transport.sent_to(ConnectionId::new(3)).is_empty());
        for id in 1..=2 {
            assert_eq!(
                transport.sent_to(ConnectionId::new(id)),
                vec![ServerEvent::NewUserConnected {
                    username: "carol".to_string(),
                    is_blocked: false,
                }]
            );
        }
    }

    #[test]
    fn test_announce_new_user_reports_observer_block_state() {
        // A rejoin under a name someone already blocks sets the flag.
        let mut registry = registry_with(&["alice", "bob"]);
        registry
            .get_mut(ConnectionId::new(1))
            .unwrap()
            .toggle_block("bob");
        let mut transport = RecordingTransport::new();

        announce_new_user(&registry, &mut transport, ConnectionId::new(2));

        assert_eq!(
            transport.sent_to(ConnectionId::new(1)),
            vec![ServerEvent::NewUserConnected {
                username: "bob".to_string(),
                is_blocked: true,
            }]
        );
    }

    #[test]
    fn test_announce_disconnect_reaches_everyone_despite_blocks() {
        let mut registry = registry_with(&["alice", "carol"]);
        registry
            .get_mut(ConnectionId::new(1))
            .unwrap()
            .toggle_block("bob");
        let mut transport = RecordingTransport::new();

        announce_disconnect(&registry, &mut transport, "bob", "bob has disconnected");

        for id in 1..=2 {
            let events = transport.sent_to(ConnectionId::new(id));
            assert_eq!(
                events,
                vec![
                    ServerEvent::Message("bob has disconnected".to_string()),
                    ServerEvent::ClientDisconnect {
                        username: "bob".to_string(),
                    },
                ]
            );
        }
    }

    #[test]
    fn test_send_private_delivers_to_receiver_only() {
        let registry = registry_with(&["alice", "bob"]);
        let mut transport = RecordingTransport::new();

        send_private(&registry, &mut transport, ConnectionId::new(1), "bob", "psst");

        assert!(transport.sent_to(ConnectionId::new(1)).is_empty());
        assert_eq!(
            transport.sent_to(ConnectionId::new(2)),
            vec![ServerEvent::PrivateMessage {
                username: "alice".to_string(),
                message: "psst".to_string(),
            }]
        );
    }

    #[test]
    fn test_send_private_recipient_not_found() {
        let registry = registry_with(&["alice"]);
        let mut transport = RecordingTransport::new();

        send_private(&registry, &mut transport, ConnectionId::new(1), "carol", "psst");

        assert_eq!(
            transport.sent_to(ConnectionId::new(1)),
            vec![ServerEvent::PrivateMessageError(
                "User carol is not currently connected.".to_string()
            )]
        );
    }

    #[test]
    fn test_send_private_blocked_by_recipient() {
        let mut registry = registry_with(&["alice", "bob"]);
        registry
            .get_mut(ConnectionId::new(2))
            .unwrap()
            .toggle_block("alice");
        let mut transport = RecordingTransport::new();

        send_private(&registry, &mut transport, ConnectionId::new(1), "bob", "psst");

        // Error goes to the sender; the recipient hears nothing
        assert_eq!(
            transport.sent_to(ConnectionId::new(1)),
            vec![ServerEvent::PrivateMessageError(
                "User bob has blocked you.".to_string()
            )]
        );
        assert!(transport.sent_to(ConnectionId::new(2)).is_empty());
    }

    #[test]
    fn test_send_private_block_is_directed() {
        // alice blocks bob; bob -> alice is suppressed, alice -> bob works
        let mut registry = registry_with(&["alice", "bob"]);
        registry
            .get_mut(ConnectionId::new(1))
            .unwrap()
            .toggle_block("bob");
        let mut transport = RecordingTransport::new();

        send_private(&registry, &mut transport, ConnectionId::new(2), "alice", "hey");
        assert_eq!(
            transport.sent_to(ConnectionId::new(2)),
            vec![ServerEvent::PrivateMessageError(
                "User alice has blocked you.".to_string()
            )]
        );

        send_private(&registry, &mut transport, ConnectionId::new(1), "bob", "hey");
        assert_eq!(
            transport.sent_to(ConnectionId::new(2)).len(),
            2 // the error above plus the delivered private message
        );
    }

    #[test]
    fn test_send_private_duplicate_username_first_match() {
        let registry = registry_with(&["alice", "bob", "bob"]);
        let mut transport = RecordingTransport::new();

        send_private(&registry, &mut transport, ConnectionId::new(1), "bob", "psst");

        assert_eq!(transport.sent_to(ConnectionId::new(2)).len(), 1);
        assert!(transport.sent_to(ConnectionId::new(3)).is_empty());
    }

    #[test]
    fn test_send_private_from_unregistered_sender_dropped() {
        let registry = registry_with(&["bob"]);
        let mut transport = RecordingTransport::new();

        send_private(&registry, &mut transport, ConnectionId::new(9), "bob", "psst");

        assert!(transport.sent.is_empty());
    }

    #[test]
    fn test_block_toggle_replies_to_caller_only() {
        let mut registry = registry_with(&["alice", "bob"]);
        let mut transport = RecordingTransport::new();

        handle_block_toggle(&mut registry, &mut transport, ConnectionId::new(1), "bob");

        assert_eq!(
            transport.sent_to(ConnectionId::new(1)),
            vec![ServerEvent::UserBlock {
                username: "bob".to_string(),
                has_been_blocked: true,
            }]
        );
        assert!(transport.sent_to(ConnectionId::new(2)).is_empty());
        assert!(registry
            .get(ConnectionId::new(1))
            .unwrap()
            .has_blocked("bob"));
    }

    #[test]
    fn test_block_toggle_alternates() {
        let mut registry = registry_with(&["alice"]);
        let mut transport = RecordingTransport::new();
        let conn = ConnectionId::new(1);

        handle_block_toggle(&mut registry, &mut transport, conn, "bob");
        handle_block_toggle(&mut registry, &mut transport, conn, "bob");

        assert_eq!(
            transport.sent_to(conn),
            vec![
                ServerEvent::UserBlock {
                    username: "bob".to_string(),
                    has_been_blocked: true,
                },
                ServerEvent::UserBlock {
                    username: "bob".to_string(),
                    has_been_blocked: false,
                },
            ]
        );
        assert!(!registry.get(conn).unwrap().has_blocked("bob"));
    }

    #[test]
    fn test_route_error_messages() {
        assert_eq!(
            RouteError::RecipientNotFound("carol".to_string()).to_string(),
            "User carol is not currently connected."
        );
        assert_eq!(
            RouteError::RecipientBlockedSender("bob".to_string()).to_string(),
            "User bob has blocked you."
        );
    }
}

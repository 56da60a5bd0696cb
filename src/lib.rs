//! Parlor - real-time multi-user chat hub.
//!
//! Clients connect over WebSockets, pick a display name, broadcast
//! messages to every connected peer, exchange private messages, and
//! mute individual peers with per-session block lists.

pub mod config;
pub mod error;
pub mod hub;
pub mod logging;
pub mod web;

pub use config::Config;
pub use error::{ParlorError, Result};
pub use hub::{
    spawn_hub, ChannelTransport, ClientEvent, ConnectionId, Hub, HubHandle, HubRequest, Registry,
    RegistryError, RouteError, ServerEvent, Session, Transport,
};
pub use web::WebServer;

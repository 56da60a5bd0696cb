//! Session and message-routing engine for the chat hub.
//!
//! The pieces, smallest first:
//!
//! - [`Session`]: one connected client (handle, username, block set).
//! - [`Registry`]: insertion-ordered map of live sessions.
//! - [`router`]: fan-out with block filtering, private delivery,
//!   presence announcements.
//! - [`Hub`]: the lifecycle manager composing the above, driven by
//!   [`ClientEvent`]s and producing [`ServerEvent`]s through a
//!   [`Transport`].
//! - the service task ([`spawn_hub`] / [`HubHandle`]) that owns the
//!   hub and serializes all event processing.

mod events;
#[allow(clippy::module_inception)]
mod hub;
mod registry;
pub mod router;
mod service;
mod session;
mod transport;

pub use events::{ClientEvent, ServerEvent};
pub use hub::Hub;
pub use registry::{Registry, RegistryError};
pub use router::RouteError;
pub use service::{spawn_hub, HubHandle, HubRequest};
pub use session::{ConnectionId, Session};
pub use transport::{ChannelTransport, Transport};

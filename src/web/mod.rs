//! Web-facing layer: WebSocket endpoint and static page serving.

pub mod server;
pub mod ws;

pub use server::WebServer;

//! HTTP server wiring: WebSocket endpoint, health check, static pages.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, MethodRouter};
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::{ServerConfig, StaticConfig};
use crate::hub::{spawn_hub, HubHandle};
use crate::{ParlorError, Result};

use super::ws::ws_handler;

/// Web server hosting the chat hub.
pub struct WebServer {
    /// Listen address.
    addr: SocketAddr,
    /// Handle to the hub task.
    hub: HubHandle,
    /// Static page serving settings.
    static_config: StaticConfig,
}

impl WebServer {
    /// Create a new web server. Spawns the hub task.
    pub fn new(config: &ServerConfig, static_config: &StaticConfig) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|e| ParlorError::Config(format!("invalid listen address: {e}")))?;

        Ok(Self {
            addr,
            hub: spawn_hub(),
            static_config: static_config.clone(),
        })
    }

    /// Get the configured address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get a handle to the hub task.
    pub fn hub(&self) -> HubHandle {
        self.hub.clone()
    }

    /// Build the router.
    fn router(&self) -> Router {
        let mut router = Router::new()
            .route("/ws", get(ws_handler))
            .with_state(self.hub.clone())
            .route("/health", get(health_check));

        if self.static_config.enabled {
            router = router.fallback_service(static_service(&self.static_config.root));
        }

        router.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
    }

    /// Run the web server until it fails.
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Chat server listening on http://{}", local_addr);

        let router = self.router();
        axum::serve(listener, router).await?;
        Ok(())
    }

    /// Bind, serve in a background task, and return the bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> Result<SocketAddr> {
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Chat server listening on http://{}", local_addr);

        let router = self.router();
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

/// Static page service: files under the configured root, `index.html`
/// for directory requests, the `404.html` page for misses.
fn static_service(root: &str) -> ServeDir<MethodRouter> {
    let page = Path::new(root).join("404.html");
    ServeDir::new(root).fallback(get(move || serve_not_found(page.clone())))
}

/// Serve the 404 page with the proper status, or a plain 500 when the
/// page itself cannot be read.
async fn serve_not_found(page: PathBuf) -> Response {
    match tokio::fs::read_to_string(&page).await {
        Ok(body) => (StatusCode::NOT_FOUND, Html(body)).into_response(),
        Err(err) => {
            tracing::warn!(%err, "404 page could not be read");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "500 Internal Server Error",
            )
                .into_response()
        }
    }
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

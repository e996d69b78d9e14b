//! `HavenServer` builder and server loop.
//!
//! Ties the layers together: transport → protocol → room → session.

use std::sync::Arc;
use std::time::Duration;

use haven_protocol::{Codec, JsonCodec};
use haven_room::{RoomManager, sweep_idle};
use haven_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::{HavenError, ServerConfig};

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) rooms: Mutex<RoomManager>,
    pub(crate) codec: C,
    pub(crate) idle_timeout: Duration,
}

/// Builder for configuring and starting a Haven server.
///
/// # Example
///
/// ```rust,no_run
/// use haven::prelude::*;
///
/// # async fn start() -> Result<(), HavenError> {
/// let server = HavenServer::<JsonCodec>::builder()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct HavenServerBuilder {
    config: ServerConfig,
}

impl HavenServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind = addr.to_string();
        self
    }

    /// Replaces the whole configuration, including `bind`.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds the listener. Uses `JsonCodec` over `WebSocketTransport`.
    pub async fn build(self) -> Result<HavenServer<JsonCodec>, HavenError> {
        let config = self.config.validated();
        let transport = WebSocketTransport::bind(&config.bind).await?;

        let state = Arc::new(ServerState {
            rooms: Mutex::new(RoomManager::new(config.room, config.game)),
            codec: JsonCodec,
            idle_timeout: config.connection_idle_timeout,
        });

        Ok(HavenServer { transport, state })
    }
}

impl Default for HavenServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Haven server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct HavenServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> HavenServer<C> {
    /// Creates a new builder.
    pub fn builder() -> HavenServerBuilder {
        HavenServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the idle-room sweeper and the accept loop. Runs until the
    /// process is terminated.
    pub async fn run(mut self) -> Result<(), HavenError> {
        tracing::info!(addr = ?self.local_addr().ok(), "Haven server running");

        tokio::spawn(sweep_rooms(Arc::clone(&self.state)));

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

/// Closes idle rooms every `sweep_interval`.
async fn sweep_rooms<C: Codec>(state: Arc<ServerState<C>>) {
    let period = state.rooms.lock().await.config().sweep_interval;
    let mut interval = tokio::time::interval(period);
    // The first tick completes immediately.
    interval.tick().await;

    loop {
        interval.tick().await;
        let closed = sweep_idle(&state.rooms).await;
        if !closed.is_empty() {
            tracing::info!(closed = closed.len(), "idle rooms swept");
        }
    }
}

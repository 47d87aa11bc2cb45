//! `RoomcastServer` builder and accept loop.
//!
//! This is the top-level wiring: it builds the one [`Relay`] (and with it
//! the one registry) for the process, binds the transport, and spawns a
//! handler task per connection. Nothing here is a global; two servers in
//! one process share no state.

use std::sync::Arc;
use std::time::Duration;

use roomcast_protocol::{Codec, JsonCodec};
use roomcast_room::{Clock, LocalClock, Router, RouterConfig};
use roomcast_transport::{OriginPolicy, Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::{Relay, RoomcastError, ServerConfig};

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The relay
/// sits behind a single mutex: every event is routed and fanned out while
/// holding it.
pub(crate) struct ServerState<C: Codec, K: Clock> {
    pub(crate) relay: Mutex<Relay<K>>,
    pub(crate) codec: C,
    pub(crate) config: ServerConfig,
}

/// Builder for configuring and starting a Roomcast server.
///
/// # Example
///
/// ```rust,ignore
/// use roomcast::prelude::*;
///
/// let server = RoomcastServer::builder()
///     .bind("0.0.0.0:3500")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct RoomcastServerBuilder {
    config: ServerConfig,
}

impl RoomcastServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Starts from a complete configuration (e.g. [`ServerConfig::from_env`]).
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Sets which browser origins may connect.
    pub fn origin_policy(mut self, policy: OriginPolicy) -> Self {
        self.config.origin_policy = policy;
        self
    }

    /// Closes connections that stay silent for `timeout`.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = Some(timeout);
        self
    }

    /// Drops peers that take longer than `timeout` to finish the upgrade.
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.config.handshake_timeout = timeout;
        self
    }

    /// Sets the router texts and switches.
    pub fn router_config(mut self, config: RouterConfig) -> Self {
        self.config.router = config;
        self
    }

    /// Binds the server with `JsonCodec` and local wall-clock timestamps.
    pub async fn build(self) -> Result<RoomcastServer<JsonCodec, LocalClock>, RoomcastError> {
        self.build_with(JsonCodec, LocalClock).await
    }

    /// Binds the server with a custom codec and clock.
    pub async fn build_with<C: Codec, K: Clock>(
        self,
        codec: C,
        clock: K,
    ) -> Result<RoomcastServer<C, K>, RoomcastError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr)
            .await?
            .with_origin_policy(self.config.origin_policy.clone())
            .with_handshake_timeout(self.config.handshake_timeout);

        let router = Router::with_clock(self.config.router.clone(), clock);
        let state = Arc::new(ServerState {
            relay: Mutex::new(Relay::new(router)),
            codec,
            config: self.config,
        });

        Ok(RoomcastServer { transport, state })
    }
}

impl Default for RoomcastServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Roomcast server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct RoomcastServer<C: Codec = JsonCodec, K: Clock = LocalClock> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C, K>>,
}

impl RoomcastServer<JsonCodec, LocalClock> {
    /// Creates a new builder.
    pub fn builder() -> RoomcastServerBuilder {
        RoomcastServerBuilder::new()
    }
}

impl<C: Codec, K: Clock> RoomcastServer<C, K> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each.
    /// The WebSocket upgrade runs on that task, never on the accept loop.
    /// A failed accept or refused handshake is logged and the loop keeps
    /// going. Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), RoomcastError> {
        tracing::info!(addr = ?self.local_addr().ok(), "Roomcast server running");

        loop {
            match self.transport.accept().await {
                Ok(incoming) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(incoming, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "accept failed");
                }
            }
        }
    }
}

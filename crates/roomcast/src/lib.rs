//! # Roomcast
//!
//! Real-time room-based chat relay over WebSockets.
//!
//! Clients connect, enter named rooms, and exchange messages. The server
//! tracks which connection is in which room and fans each event out to
//! the right set of connections: the sender, the sender's room, the room
//! minus the sender, or everyone.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use roomcast::prelude::*;
//!
//! # async fn start() -> Result<(), RoomcastError> {
//! let server = RoomcastServer::builder()
//!     .config(ServerConfig::from_env()?)
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod relay;
mod server;

pub use config::{ServerConfig, DEFAULT_PORT};
pub use error::RoomcastError;
pub use relay::Relay;
pub use server::{RoomcastServer, RoomcastServerBuilder};

/// Installs a `tracing` subscriber that honours `RUST_LOG`, defaulting
/// to `info`.
///
/// Call once at process start; later calls are ignored.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Everything needed to run or embed a server.
pub mod prelude {
    pub use crate::{Relay, RoomcastError, RoomcastServer, RoomcastServerBuilder, ServerConfig};
    pub use roomcast_protocol::{ChatMessage, ClientEvent, Codec, JsonCodec, ServerEvent, User};
    pub use roomcast_room::{
        Clock, Inbound, LocalClock, Registry, RoomError, RoomQuery, Router, RouterConfig,
    };
    pub use roomcast_transport::{ConnectionId, OriginPolicy};
}

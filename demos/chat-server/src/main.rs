//! Roomcast chat relay.
//!
//! ```text
//! PORT=3500 ROOMCAST_ENV=production RUST_LOG=roomcast=debug chat-server
//! ```
//!
//! See [`ServerConfig::from_env`] for every variable read at startup.

use roomcast::prelude::*;

#[tokio::main]
async fn main() -> Result<(), RoomcastError> {
    roomcast::init_logging();

    let config = ServerConfig::from_env()?;
    tracing::info!(
        bind = %config.bind_addr,
        origins = ?config.origin_policy,
        idle_timeout = ?config.idle_timeout,
        "starting chat server"
    );

    let server = RoomcastServer::builder().config(config).build().await?;
    server.run().await
}

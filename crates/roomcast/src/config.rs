//! Server configuration and environment loading.

use std::time::Duration;

use roomcast_room::RouterConfig;
use roomcast_transport::{DEFAULT_HANDSHAKE_TIMEOUT, OriginPolicy};

use crate::RoomcastError;

/// Port used when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 3500;

/// Origins a local development page is usually served from.
const DEV_ORIGINS: [&str; 2] = ["http://localhost:5500", "http://127.0.0.1:5500"];

/// Everything needed to start a server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `host:port` to listen on.
    pub bind_addr: String,

    /// Which browser origins may open a socket.
    pub origin_policy: OriginPolicy,

    /// Close a connection that sends nothing for this long. `None`
    /// keeps idle connections open indefinitely.
    pub idle_timeout: Option<Duration>,

    /// Give up on a peer that has not finished the WebSocket upgrade
    /// after this long.
    pub handshake_timeout: Duration,

    /// Texts and switches for the router.
    pub router: RouterConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: format!("127.0.0.1:{DEFAULT_PORT}"),
            origin_policy: OriginPolicy::AllowAll,
            idle_timeout: None,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            router: RouterConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// | Variable | Meaning |
    /// |---|---|
    /// | `PORT` | listen port (default 3500) |
    /// | `ROOMCAST_HOST` | listen host (default `0.0.0.0`) |
    /// | `ROOMCAST_ENV` | `production` refuses cross-origin browsers |
    /// | `ROOMCAST_ALLOWED_ORIGINS` | comma-separated origin allow-list |
    /// | `ROOMCAST_WELCOME` | welcome notice text |
    /// | `ROOMCAST_IDLE_TIMEOUT_SECS` | idle timeout in seconds |
    pub fn from_env() -> Result<Self, RoomcastError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RoomcastError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| RoomcastError::Config(format!("PORT={raw:?}: {e}")))?,
            None => DEFAULT_PORT,
        };
        let host = lookup("ROOMCAST_HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let production = lookup("ROOMCAST_ENV").is_some_and(|env| env == "production");
        let allowed = match lookup("ROOMCAST_ALLOWED_ORIGINS") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect(),
            None if production => Vec::new(),
            None => DEV_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        let idle_timeout = lookup("ROOMCAST_IDLE_TIMEOUT_SECS")
            .map(|raw| {
                raw.trim().parse::<u64>().map(Duration::from_secs).map_err(|e| {
                    RoomcastError::Config(format!("ROOMCAST_IDLE_TIMEOUT_SECS={raw:?}: {e}"))
                })
            })
            .transpose()?;

        let mut router = RouterConfig::default();
        if let Some(welcome) = lookup("ROOMCAST_WELCOME") {
            router.welcome_text = welcome;
        }

        Ok(Self {
            bind_addr: format!("{host}:{port}"),
            origin_policy: OriginPolicy::AllowList(allowed),
            idle_timeout,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            router,
        })
    }
}

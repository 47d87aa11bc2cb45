//! Router settings.

/// Fixed texts and switches used when the router speaks for the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    /// Display name on server-generated notices.
    pub system_sender: String,

    /// Notice sent to a connection as soon as it opens.
    pub welcome_text: String,

    /// Whether a new connection is announced to everyone else.
    pub announce_connections: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            system_sender: "Admin".to_string(),
            welcome_text: "Welcome to Roomcast!".to_string(),
            announce_connections: false,
        }
    }
}

//! Browser origin checks for the WebSocket upgrade.

/// Decides which `Origin` headers may open a connection.
///
/// Requests without an `Origin` header come from non-browser clients
/// and are always permitted; the policy only constrains browsers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OriginPolicy {
    /// Any origin may connect.
    #[default]
    AllowAll,

    /// Only the listed origins (exact match, e.g. `http://localhost:5500`).
    /// An empty list refuses every cross-origin browser request.
    AllowList(Vec<String>),
}

impl OriginPolicy {
    /// Returns `true` if a request carrying `origin` may be upgraded.
    pub fn permits(&self, origin: Option<&str>) -> bool {
        match (self, origin) {
            (Self::AllowAll, _) | (_, None) => true,
            (Self::AllowList(allowed), Some(origin)) => {
                allowed.iter().any(|a| a == origin)
            }
        }
    }
}

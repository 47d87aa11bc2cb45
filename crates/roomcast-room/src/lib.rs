//! Room membership and event routing for Roomcast.
//!
//! This is the part of the server with real invariants. It owns no
//! sockets and does no I/O:
//!
//! - [`Registry`]: who is where. The only mutable state, replaced
//!   wholesale on every change.
//! - [`RoomQuery`]: read-only views over a registry: members of a room,
//!   active rooms, lookup by connection.
//! - [`Router`]: turns an [`Inbound`] event into registry updates and an
//!   ordered list of [`Action`]s for the transport to carry out.
//!
//! Rooms are not stored anywhere. A room exists exactly while some user
//! names it, and disappears with its last member.

mod clock;
mod config;
mod error;
mod query;
mod registry;
mod router;

pub use clock::{Clock, LocalClock};
pub use config::RouterConfig;
pub use error::RoomError;
pub use query::RoomQuery;
pub use registry::Registry;
pub use router::{Action, Fanout, Inbound, Router};

//! Error types for the room layer.

use roomcast_transport::ConnectionId;

/// Errors that can occur while routing room events.
///
/// Lookups that find nothing are not errors; they are `Option`s and the
/// dependent broadcast is skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// `enterRoom` carried a blank display name.
    #[error("display name must not be empty")]
    EmptyName,

    /// `enterRoom` carried a blank room name.
    #[error("room name must not be empty")]
    EmptyRoom,

    /// A registry update would have listed the same connection twice.
    #[error("connection {0} appears more than once")]
    DuplicateUser(ConnectionId),

    /// A registry update would have stored a user with no room.
    #[error("connection {0} has no room")]
    UnroomedUser(ConnectionId),
}

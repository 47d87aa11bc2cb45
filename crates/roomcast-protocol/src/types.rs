//! Wire events exchanged between chat clients and the server.
//!
//! Every frame is a JSON object with an `event` tag and a `data` payload
//! ("adjacently tagged" in serde terms):
//!
//! ```text
//! { "event": "enterRoom", "data": { "name": "Alice", "room": "lobby" } }
//! { "event": "activity",  "data": "Alice" }
//! ```
//!
//! Event names are camelCase because the browser client registers its
//! handlers under those names.

use roomcast_transport::ConnectionId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// One active participant: a connection that has entered a room.
///
/// Exists from the connection's first `enterRoom` until it disconnects.
/// Switching rooms replaces the whole value rather than editing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// The connection this participant is speaking through.
    pub id: ConnectionId,
    /// Display name chosen by the client.
    pub name: String,
    /// Name of the room the participant is in. Never empty.
    pub room: String,
}

impl User {
    /// Creates a user record.
    pub fn new(id: ConnectionId, name: impl Into<String>, room: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            room: room.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// ChatMessage
// ---------------------------------------------------------------------------

/// The envelope for chat lines and system notices alike.
///
/// `time` is already formatted for display (e.g. `"3:45 PM"`); clients
/// render it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who said it: a user's display name, or the system sender.
    pub name: String,
    /// The message body.
    pub text: String,
    /// Local short time at which the server relayed it.
    pub time: String,
}

impl ChatMessage {
    /// Creates a message envelope.
    pub fn new(
        name: impl Into<String>,
        text: impl Into<String>,
        time: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            time: time.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// ClientEvent: client → server
// ---------------------------------------------------------------------------

/// Events a client may send.
///
/// Connect and disconnect are not on this list: they come from the
/// socket lifecycle, not from frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// "Put me in this room under this name." Switches rooms if the
    /// connection is already in one.
    EnterRoom { name: String, room: String },

    /// A chat line for the sender's current room.
    Message { name: String, text: String },

    /// Typing indicator; the payload is the typist's display name.
    Activity(String),
}

// ---------------------------------------------------------------------------
// ServerEvent: server → client
// ---------------------------------------------------------------------------

/// Events the server delivers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// A chat line or a system notice.
    Message(ChatMessage),

    /// Current members of one room.
    UserList { users: Vec<User> },

    /// Every room that currently has at least one member.
    RoomList { rooms: Vec<String> },

    /// Someone else in the room is typing.
    Activity(String),
}

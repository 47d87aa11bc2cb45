//! Event router: the per-connection room state machine.
//!
//! ```text
//! Disconnected ──connect──→ Connected ──enterRoom──→ InRoom(r)
//!                               │                     │  ↺ enterRoom (switch)
//!                               └──disconnect──┐      │
//!                                              ▼      ▼
//!                                           Disconnected
//! ```
//!
//! The router does no I/O. [`Router::handle`] updates the registry and
//! returns the [`Action`]s the transport must perform, in the order it
//! must perform them. Group membership changes are actions too, so a
//! notice sent to a room before a join does not reach the joiner.

use roomcast_protocol::{ChatMessage, ClientEvent, ServerEvent, User};
use roomcast_transport::ConnectionId;

use crate::{Clock, LocalClock, Registry, RoomError, RoomQuery, RouterConfig};

/// An inbound event, tagged with nothing but its kind. The connection it
/// came from is passed alongside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// The transport opened a new connection.
    Connect,
    /// Enter (or switch to) a room under a display name.
    EnterRoom { name: String, room: String },
    /// A chat line for the sender's room.
    ///
    /// `name` is what the client claims and is not trusted: the line is
    /// attributed to the name registered by the last `EnterRoom`, since
    /// it lands in the room's chat history.
    Message { name: String, text: String },
    /// Typing indicator carrying the typist's name.
    ///
    /// Relayed as sent. It is transient and never stored, so it is not
    /// checked against the registry.
    Activity { name: String },
    /// The transport closed the connection.
    Disconnect,
}

impl From<ClientEvent> for Inbound {
    fn from(event: ClientEvent) -> Self {
        match event {
            ClientEvent::EnterRoom { name, room } => Self::EnterRoom { name, room },
            ClientEvent::Message { name, text } => Self::Message { name, text },
            ClientEvent::Activity(name) => Self::Activity { name },
        }
    }
}

/// Who receives an emitted event, relative to the originating connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fanout {
    /// Only the originating connection.
    Origin,
    /// Every member of the room's delivery group.
    Room(String),
    /// Every member of the room's delivery group except the origin.
    RoomExceptOrigin(String),
    /// Every open connection, in a room or not.
    Everyone,
    /// Every open connection except the origin.
    EveryoneExceptOrigin,
}

/// One step for the transport to perform on behalf of the origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Add the origin to a room's delivery group.
    Join(String),
    /// Remove the origin from a room's delivery group.
    Leave(String),
    /// Deliver an event.
    Emit { to: Fanout, event: ServerEvent },
}

/// Applies inbound events to a [`Registry`] and computes fan-out.
///
/// The router holds only configuration and a clock; the registry is
/// passed in by the owner, which also serializes calls.
#[derive(Debug, Clone, Default)]
pub struct Router<C: Clock = LocalClock> {
    config: RouterConfig,
    clock: C,
}

impl Router<LocalClock> {
    /// Creates a router that stamps messages with local wall-clock time.
    pub fn new(config: RouterConfig) -> Self {
        Self::with_clock(config, LocalClock)
    }
}

impl<C: Clock> Router<C> {
    /// Creates a router with a custom clock.
    pub fn with_clock(config: RouterConfig, clock: C) -> Self {
        Self { config, clock }
    }

    /// Handles one event from `origin`.
    ///
    /// Only a malformed `EnterRoom` fails; in that case the registry is
    /// untouched and nothing is emitted. Unknown connections and
    /// connections without a room are not errors: the room-scoped part
    /// of the response is skipped.
    pub fn handle(
        &self,
        registry: &mut Registry,
        origin: ConnectionId,
        event: Inbound,
    ) -> Result<Vec<Action>, RoomError> {
        match event {
            Inbound::Connect => Ok(self.connect(origin)),
            Inbound::EnterRoom { name, room } => self.enter_room(registry, origin, &name, &room),
            Inbound::Message { text, .. } => Ok(self.message(registry, origin, text)),
            Inbound::Activity { name } => Ok(self.activity(registry, origin, name)),
            Inbound::Disconnect => self.disconnect(registry, origin),
        }
    }

    fn connect(&self, origin: ConnectionId) -> Vec<Action> {
        let mut actions = vec![emit(
            Fanout::Origin,
            self.notice(self.config.welcome_text.clone()),
        )];
        if self.config.announce_connections {
            actions.push(emit(
                Fanout::EveryoneExceptOrigin,
                self.notice(format!("User {origin} connected")),
            ));
        }
        actions
    }

    fn enter_room(
        &self,
        registry: &mut Registry,
        origin: ConnectionId,
        name: &str,
        room: &str,
    ) -> Result<Vec<Action>, RoomError> {
        let name = name.trim();
        let room = room.trim();
        if name.is_empty() {
            return Err(RoomError::EmptyName);
        }
        if room.is_empty() {
            return Err(RoomError::EmptyRoom);
        }

        let previous = RoomQuery::new(registry).find_user(origin).cloned();
        let user = User::new(origin, name, room);

        let mut next: Vec<User> = registry
            .all()
            .iter()
            .filter(|u| u.id != origin)
            .cloned()
            .collect();
        next.push(user.clone());

        let mut actions = Vec::new();
        if let Some(prev) = &previous {
            actions.push(Action::Leave(prev.room.clone()));
            actions.push(emit(
                Fanout::Room(prev.room.clone()),
                self.notice(format!("{} has left the room", user.name)),
            ));
        }

        registry.set_all(next)?;

        if let Some(prev) = &previous {
            actions.push(emit(
                Fanout::Room(prev.room.clone()),
                ServerEvent::UserList {
                    users: RoomQuery::new(registry).users_in_room(&prev.room),
                },
            ));
        }

        let query = RoomQuery::new(registry);
        actions.push(Action::Join(user.room.clone()));
        actions.push(emit(
            Fanout::Origin,
            self.notice(format!("You have joined the {} chat room", user.room)),
        ));
        actions.push(emit(
            Fanout::RoomExceptOrigin(user.room.clone()),
            self.notice(format!("{} has joined the room", user.name)),
        ));
        actions.push(emit(
            Fanout::Room(user.room.clone()),
            ServerEvent::UserList {
                users: query.users_in_room(&user.room),
            },
        ));
        actions.push(emit(
            Fanout::Everyone,
            ServerEvent::RoomList {
                rooms: query.active_rooms(),
            },
        ));

        tracing::info!(
            %origin,
            name = %user.name,
            room = %user.room,
            from = previous.as_ref().map(|p| p.room.as_str()),
            users = registry.len(),
            "entered room"
        );
        Ok(actions)
    }

    fn disconnect(
        &self,
        registry: &mut Registry,
        origin: ConnectionId,
    ) -> Result<Vec<Action>, RoomError> {
        let departed = RoomQuery::new(registry).find_user(origin).cloned();

        let remaining: Vec<User> = registry
            .all()
            .iter()
            .filter(|u| u.id != origin)
            .cloned()
            .collect();
        registry.set_all(remaining)?;

        let Some(user) = departed else {
            tracing::debug!(%origin, "disconnected before entering a room");
            return Ok(Vec::new());
        };

        let query = RoomQuery::new(registry);
        let actions = vec![
            emit(
                Fanout::Room(user.room.clone()),
                self.notice(format!("{} has left the room", user.name)),
            ),
            emit(
                Fanout::Room(user.room.clone()),
                ServerEvent::UserList {
                    users: query.users_in_room(&user.room),
                },
            ),
            emit(
                Fanout::Everyone,
                ServerEvent::RoomList {
                    rooms: query.active_rooms(),
                },
            ),
        ];

        tracing::info!(%origin, name = %user.name, room = %user.room, "left room");
        Ok(actions)
    }

    fn message(&self, registry: &Registry, origin: ConnectionId, text: String) -> Vec<Action> {
        let Some(user) = RoomQuery::new(registry).find_user(origin) else {
            tracing::debug!(%origin, "message from connection without a room dropped");
            return Vec::new();
        };
        vec![emit(
            Fanout::Room(user.room.clone()),
            ServerEvent::Message(ChatMessage::new(
                user.name.clone(),
                text,
                self.clock.timestamp(),
            )),
        )]
    }

    fn activity(&self, registry: &Registry, origin: ConnectionId, name: String) -> Vec<Action> {
        match RoomQuery::new(registry).find_user(origin) {
            Some(user) => vec![emit(
                Fanout::RoomExceptOrigin(user.room.clone()),
                ServerEvent::Activity(name),
            )],
            None => Vec::new(),
        }
    }

    fn notice(&self, text: String) -> ServerEvent {
        ServerEvent::Message(ChatMessage::new(
            self.config.system_sender.clone(),
            text,
            self.clock.timestamp(),
        ))
    }
}

fn emit(to: Fanout, event: ServerEvent) -> Action {
    Action::Emit { to, event }
}

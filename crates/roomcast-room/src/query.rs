//! Read-only views derived from a [`Registry`].

use std::collections::HashSet;

use roomcast_protocol::User;
use roomcast_transport::ConnectionId;

use crate::Registry;

/// Derived views over a registry snapshot.
///
/// Holds a shared borrow, so nothing reached through a `RoomQuery` can
/// change the registry.
#[derive(Debug, Clone, Copy)]
pub struct RoomQuery<'a> {
    registry: &'a Registry,
}

impl<'a> RoomQuery<'a> {
    /// Wraps a registry for querying.
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Users whose room is exactly `room`, in registry order.
    pub fn users_in_room(&self, room: &str) -> Vec<User> {
        self.registry
            .all()
            .iter()
            .filter(|user| user.room == room)
            .cloned()
            .collect()
    }

    /// Distinct room names with at least one member, in order of first
    /// appearance. Empty when nobody is connected.
    pub fn active_rooms(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut rooms = Vec::new();
        for user in self.registry.all() {
            if seen.insert(user.room.as_str()) {
                rooms.push(user.room.clone());
            }
        }
        rooms
    }

    /// The user behind a connection, if it has entered a room.
    pub fn find_user(&self, id: ConnectionId) -> Option<&'a User> {
        self.registry.all().iter().find(|user| user.id == id)
    }
}

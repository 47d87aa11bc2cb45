//! The registry: the authoritative "who is in which room" record.
//!
//! # Mutation model
//!
//! There is exactly one way to change a registry: compute the complete
//! new user list and hand it to [`Registry::set_all`]. No add/remove/edit
//! of a single entry is exposed. Every change is O(n) in the number of
//! connected users, which is fine at chat-room scale, and the invariants
//! are checked in one place.
//!
//! # Concurrency note
//!
//! `Registry` is NOT thread-safe by itself. `all` hands out a borrow and
//! `set_all` needs `&mut self`, so the borrow checker already keeps a
//! reader from observing a half-applied update. Across tasks, the owner
//! wraps the registry (together with the router) in a single mutex so
//! that a whole read-compute-replace cycle is one critical section.

use std::collections::HashSet;

use roomcast_protocol::User;

use crate::RoomError;

/// Ordered collection of [`User`]s, unique by connection id.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    users: Vec<User>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current users, in insertion order.
    pub fn all(&self) -> &[User] {
        &self.users
    }

    /// Replaces the whole collection.
    ///
    /// The candidate list is validated first; if any user repeats a
    /// connection id or has an empty room, nothing changes.
    pub fn set_all(&mut self, users: Vec<User>) -> Result<(), RoomError> {
        let mut seen = HashSet::with_capacity(users.len());
        for user in &users {
            if !seen.insert(user.id) {
                return Err(RoomError::DuplicateUser(user.id));
            }
            if user.room.is_empty() {
                return Err(RoomError::UnroomedUser(user.id));
            }
        }
        self.users = users;
        Ok(())
    }

    /// Number of users currently registered.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Returns `true` if nobody is in any room.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

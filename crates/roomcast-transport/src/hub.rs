//! Outbound fan-out: per-connection queues and named delivery groups.
//!
//! The hub never touches sockets. Each registered connection hands in the
//! sending half of a bounded channel; a writer task on the other end
//! drains it onto the wire. Every delivery primitive is a non-blocking
//! `try_send`, so fan-out can run while a lock is held. A peer whose queue
//! is full loses the message instead of slowing everyone else down.

use std::collections::{HashMap, HashSet};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::ConnectionId;

/// Channel sender for delivering outbound messages to one connection.
pub type PeerSender<M> = mpsc::Sender<M>;

/// Outbound queue depth per connection.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Tracks live connections and the delivery groups they belong to.
///
/// Groups are created on first join and dropped when their last member
/// leaves.
pub struct Hub<M> {
    peers: HashMap<ConnectionId, PeerSender<M>>,
    groups: HashMap<String, HashSet<ConnectionId>>,
}

impl<M: Clone> Hub<M> {
    /// Creates an empty hub.
    pub fn new() -> Self {
        Self {
            peers: HashMap::new(),
            groups: HashMap::new(),
        }
    }

    /// Registers a connection's outbound queue.
    ///
    /// Replaces any queue previously registered under the same id.
    pub fn register(&mut self, id: ConnectionId, sender: PeerSender<M>) {
        self.peers.insert(id, sender);
    }

    /// Removes a connection and its membership in every group.
    ///
    /// Dropping the stored sender closes the connection's queue, which
    /// ends its writer task. Returns `false` if the id was unknown.
    pub fn unregister(&mut self, id: ConnectionId) -> bool {
        self.groups.retain(|_, members| {
            members.remove(&id);
            !members.is_empty()
        });
        self.peers.remove(&id).is_some()
    }

    /// Adds a registered connection to a delivery group.
    pub fn join(&mut self, id: ConnectionId, group: &str) {
        if !self.peers.contains_key(&id) {
            tracing::debug!(%id, group, "join for unregistered connection ignored");
            return;
        }
        self.groups.entry(group.to_string()).or_default().insert(id);
    }

    /// Removes a connection from a delivery group.
    pub fn leave(&mut self, id: ConnectionId, group: &str) {
        if let Some(members) = self.groups.get_mut(group) {
            members.remove(&id);
            if members.is_empty() {
                self.groups.remove(group);
            }
        }
    }

    /// Delivers to a single connection.
    pub fn unicast(&self, id: ConnectionId, msg: M) {
        self.send_to(id, msg);
    }

    /// Delivers to every member of `group`.
    pub fn room_cast(&self, group: &str, msg: M) {
        self.group_cast(group, None, msg);
    }

    /// Delivers to every member of `group` except `origin`.
    pub fn room_cast_except(&self, group: &str, origin: ConnectionId, msg: M) {
        self.group_cast(group, Some(origin), msg);
    }

    /// Delivers to every registered connection.
    pub fn broadcast(&self, msg: M) {
        for id in self.peers.keys() {
            self.send_to(*id, msg.clone());
        }
    }

    /// Delivers to every registered connection except `origin`.
    pub fn broadcast_except(&self, origin: ConnectionId, msg: M) {
        for id in self.peers.keys().filter(|id| **id != origin) {
            self.send_to(*id, msg.clone());
        }
    }

    /// Returns the members of a group (unordered).
    #[cfg(test)]
    fn members(&self, group: &str) -> Vec<ConnectionId> {
        self.groups
            .get(group)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns the names of all non-empty groups (unordered).
    #[cfg(test)]
    fn group_names(&self) -> Vec<String> {
        self.groups.keys().cloned().collect()
    }

    /// Returns the number of registered connections.
    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    fn group_cast(&self, group: &str, except: Option<ConnectionId>, msg: M) {
        let Some(members) = self.groups.get(group) else {
            return;
        };
        for id in members {
            if Some(*id) != except {
                self.send_to(*id, msg.clone());
            }
        }
    }

    /// Queues a message for one connection. Drops it if the queue is
    /// full or the receiver is gone (connection already closing).
    fn send_to(&self, id: ConnectionId, msg: M) {
        let Some(sender) = self.peers.get(&id) else {
            return;
        };
        match sender.try_send(msg) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::warn!(%id, "outbound queue full, message dropped");
            }
            Err(TrySendError::Closed(_)) => {
                tracing::trace!(%id, "outbound queue closed, message dropped");
            }
        }
    }
}

impl<M: Clone> Default for Hub<M> {
    fn default() -> Self {
        Self::new()
    }
}

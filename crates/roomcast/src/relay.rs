//! The relay: registry, router, and delivery hub behind one owner.
//!
//! Every inbound event is handled by a single `&mut Relay` call that
//! runs the router and applies the resulting actions to the hub before
//! returning. The server keeps the relay in one mutex, which makes each
//! event's read-compute-replace of the registry and its fan-out one
//! indivisible step relative to every other connection's events.

use roomcast_protocol::ServerEvent;
use roomcast_room::{Action, Clock, Fanout, Inbound, LocalClock, Registry, RoomError, Router};
use roomcast_transport::{ConnectionId, Hub, PeerSender};

/// Owns the room state and the outbound queues of every live connection.
pub struct Relay<K: Clock = LocalClock> {
    registry: Registry,
    router: Router<K>,
    hub: Hub<ServerEvent>,
}

impl<K: Clock> Relay<K> {
    /// Creates a relay with an empty registry.
    pub fn new(router: Router<K>) -> Self {
        Self {
            registry: Registry::new(),
            router,
            hub: Hub::new(),
        }
    }

    /// Registers a freshly opened connection and greets it.
    pub fn connect(&mut self, id: ConnectionId, sender: PeerSender<ServerEvent>) {
        self.hub.register(id, sender);
        // Connect never touches the registry and cannot fail.
        if let Ok(actions) = self.router.handle(&mut self.registry, id, Inbound::Connect) {
            self.apply(id, actions);
        }
    }

    /// Handles an event received on an open connection.
    pub fn handle(&mut self, id: ConnectionId, event: Inbound) -> Result<(), RoomError> {
        let actions = self.router.handle(&mut self.registry, id, event)?;
        self.apply(id, actions);
        Ok(())
    }

    /// Removes a closed connection and tells its room.
    ///
    /// The connection's queue is dropped first, so nothing emitted on its
    /// behalf is delivered to it.
    pub fn disconnect(&mut self, id: ConnectionId) {
        self.hub.unregister(id);
        match self.router.handle(&mut self.registry, id, Inbound::Disconnect) {
            Ok(actions) => self.apply(id, actions),
            Err(e) => tracing::warn!(%id, error = %e, "disconnect left registry unchanged"),
        }
    }

    /// Read access to the registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Number of open connections, including those not yet in a room.
    pub fn connection_count(&self) -> usize {
        self.hub.peer_count()
    }

    fn apply(&mut self, origin: ConnectionId, actions: Vec<Action>) {
        for action in actions {
            match action {
                Action::Join(room) => self.hub.join(origin, &room),
                Action::Leave(room) => self.hub.leave(origin, &room),
                Action::Emit { to, event } => match to {
                    Fanout::Origin => self.hub.unicast(origin, event),
                    Fanout::Room(room) => self.hub.room_cast(&room, event),
                    Fanout::RoomExceptOrigin(room) => {
                        self.hub.room_cast_except(&room, origin, event)
                    }
                    Fanout::Everyone => self.hub.broadcast(event),
                    Fanout::EveryoneExceptOrigin => self.hub.broadcast_except(origin, event),
                },
            }
        }
    }
}

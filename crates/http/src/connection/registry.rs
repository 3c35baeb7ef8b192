//! Slot map of live connections.
//!
//! Every accepted connection owns exactly one [`ConnectionSlot`]. The slot is
//! not clonable and releases its registry entry when dropped, so a
//! connection's resources are accounted as released exactly once, whichever
//! state it was in when it closed.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::rc::Rc;

use tracing::{error, trace};

use crate::connection::ConnectionState;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Counters for connection accounting.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct RegistryStats {
    pub live: usize,
    pub opened: u64,
    pub closed: u64,
}

#[derive(Debug)]
struct SlotEntry {
    peer: Option<SocketAddr>,
    state: ConnectionState,
}

#[derive(Debug, Default)]
struct Slots {
    entries: HashMap<ConnectionId, SlotEntry>,
    next_id: u64,
    opened: u64,
    closed: u64,
}

/// Registry of the connections served by one scheduler.
///
/// Clones share the same slots. The registry is single-threaded, like the
/// reactor it belongs to.
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    slots: Rc<RefCell<Slots>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a slot for a new connection.
    pub fn register(&self, peer: Option<SocketAddr>) -> ConnectionSlot {
        let mut slots = self.slots.borrow_mut();
        let id = ConnectionId(slots.next_id);
        slots.next_id += 1;
        slots.opened += 1;
        slots.entries.insert(id, SlotEntry { peer, state: ConnectionState::AwaitingRequest });
        trace!(%id, ?peer, "connection slot registered");

        ConnectionSlot { id, registry: self.clone() }
    }

    pub fn stats(&self) -> RegistryStats {
        let slots = self.slots.borrow();
        RegistryStats { live: slots.entries.len(), opened: slots.opened, closed: slots.closed }
    }

    /// The last recorded state of a live connection.
    pub fn state_of(&self, id: ConnectionId) -> Option<ConnectionState> {
        self.slots.borrow().entries.get(&id).map(|entry| entry.state)
    }

    pub fn peer_of(&self, id: ConnectionId) -> Option<SocketAddr> {
        self.slots.borrow().entries.get(&id).and_then(|entry| entry.peer)
    }

    fn set_state(&self, id: ConnectionId, state: ConnectionState) {
        if let Some(entry) = self.slots.borrow_mut().entries.get_mut(&id) {
            entry.state = state;
        }
    }

    fn release(&self, id: ConnectionId) {
        let mut slots = self.slots.borrow_mut();
        match slots.entries.remove(&id) {
            Some(entry) => {
                slots.closed += 1;
                trace!(%id, last_state = %entry.state, "connection slot released");
            }
            None => error!(%id, "connection slot released twice"),
        }
    }
}

/// A live connection's handle into the [`ConnectionRegistry`].
#[derive(Debug)]
pub struct ConnectionSlot {
    id: ConnectionId,
    registry: ConnectionRegistry,
}

impl ConnectionSlot {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn set_state(&self, state: ConnectionState) {
        self.registry.set_state(self.id, state);
    }
}

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        self.registry.release(self.id);
    }
}

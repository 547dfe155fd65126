//! Room state and the room registry
//!
//! A `Room` is a named set of member sessions. Only the lobby exists in this
//! design and rooms are never destroyed, but the registry is keyed by name so
//! the model generalizes to more rooms without touching the event loop.

use std::collections::{HashMap, HashSet};

use crate::types::SessionId;

/// Name of the room every session is placed in
pub const LOBBY: &str = "Lobby";

/// A named collection of member sessions
#[derive(Debug)]
pub struct Room {
    /// Room name, unique within the registry
    pub name: String,
    /// Current members, keyed by session identity
    members: HashSet<SessionId>,
}

impl Room {
    /// Create an empty room with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: HashSet::new(),
        }
    }

    /// Add a member; returns false if it was already present
    pub fn add(&mut self, id: SessionId) -> bool {
        self.members.insert(id)
    }

    /// Remove a member; returns false if it was not present
    pub fn remove(&mut self, id: SessionId) -> bool {
        self.members.remove(&id)
    }

    /// Check whether a session is a member of this room
    pub fn contains(&self, id: SessionId) -> bool {
        self.members.contains(&id)
    }

    /// Iterate over the current member identities
    pub fn members(&self) -> impl Iterator<Item = SessionId> + '_ {
        self.members.iter().copied()
    }

    /// Number of members in the room
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check whether the room has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Registry of all rooms, constructed with the lobby in place
#[derive(Debug)]
pub struct RoomRegistry {
    rooms: HashMap<String, Room>,
}

impl RoomRegistry {
    /// Create a registry holding the lobby
    pub fn new() -> Self {
        let mut rooms = HashMap::new();
        rooms.insert(LOBBY.to_string(), Room::new(LOBBY));
        Self { rooms }
    }

    /// Look up a room by name
    pub fn get(&self, name: &str) -> Option<&Room> {
        self.rooms.get(name)
    }

    /// Add a session to a room; returns false if the room does not exist
    /// or the session was already a member
    pub fn add_member(&mut self, room: &str, id: SessionId) -> bool {
        match self.rooms.get_mut(room) {
            Some(room) => room.add(id),
            None => false,
        }
    }

    /// Remove a session from a room; returns false if the room does not
    /// exist or the session was not a member
    pub fn remove_member(&mut self, room: &str, id: SessionId) -> bool {
        match self.rooms.get_mut(room) {
            Some(room) => room.remove(id),
            None => false,
        }
    }

    /// Iterate over the members of a room (empty for an unknown room)
    pub fn members<'a>(&'a self, room: &str) -> impl Iterator<Item = SessionId> + 'a {
        self.rooms.get(room).into_iter().flat_map(|room| room.members())
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

//! The combined mutable state owned by the event loop
//!
//! `World` composes the session and room registries and provides the few
//! operations that must touch both, so cross-registry invariants (a session
//! is a member of exactly one room; the username index mirrors the session
//! registry) each live in one place.

use crate::room::RoomRegistry;
use crate::session::{Session, SessionRegistry};
use crate::types::SessionId;

/// All session, room, and username state
///
/// Accessed exclusively from the event loop's turn; no locking anywhere.
#[derive(Debug, Default)]
pub struct World {
    pub sessions: SessionRegistry,
    pub rooms: RoomRegistry,
}

impl World {
    /// Create a world with empty registries and the lobby in place
    pub fn new() -> Self {
        Self::default()
    }

    /// Display names of the named sessions in a room, sorted
    ///
    /// Unnamed sessions are room members but have no name to show yet.
    /// Sorting keeps repeated listings over identical state identical.
    pub fn member_names(&self, room: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .rooms
            .members(room)
            .filter_map(|id| self.sessions.get(id))
            .filter_map(|session| session.name.clone())
            .collect();
        names.sort();
        names
    }

    /// Remove a session from every registry it appears in
    ///
    /// Takes the session out of the session registry, the username index,
    /// and its room's member set in one turn, returning the removed session
    /// so its farewell can still be delivered.
    pub fn remove_session(&mut self, id: SessionId) -> Option<Session> {
        let session = self.sessions.unregister(id)?;
        let removed = self.rooms.remove_member(&session.room, id);
        debug_assert!(removed, "session missing from its room's member set");
        Some(session)
    }
}

//! Session state and the session registry
//!
//! A `Session` is one attached client: its identity, its display name (unset
//! until claimed), the room it currently sits in, and the sending half of its
//! outbound mailbox. The `SessionRegistry` owns every live session plus the
//! username index that enforces display-name uniqueness.
//!
//! The registry has no concurrency control of its own. It is only ever
//! touched from inside the event loop's turn, which serializes all access.

use std::collections::HashMap;

use tokio::sync::mpsc;

use crate::error::RegistryError;
use crate::event::OutputEvent;
use crate::types::SessionId;

/// One attached client session
#[derive(Debug)]
pub struct Session {
    /// Transport-assigned identity, stable for the connection's lifetime
    pub id: SessionId,
    /// Display name (None until claimed; claimed at most once)
    pub name: Option<String>,
    /// Name of the room this session belongs to
    pub room: String,
    /// Sending half of this session's bounded outbound mailbox
    pub sender: mpsc::Sender<OutputEvent>,
}

impl Session {
    /// Create a new unnamed session in the given room
    pub fn new(id: SessionId, room: impl Into<String>, sender: mpsc::Sender<OutputEvent>) -> Self {
        Self {
            id,
            name: None,
            room: room.into(),
            sender,
        }
    }

    /// Get the display name for this session
    ///
    /// Returns the claimed name if set, otherwise "Unknown".
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }

    /// Check if this session has claimed a display name
    pub fn is_named(&self) -> bool {
        self.name.is_some()
    }
}

/// Registry of all live sessions and their claimed display names
///
/// Keeps two maps in sync: identity → session and claimed name → identity.
/// Every entry in the name index refers to a registered, named session;
/// `unregister` removes both in one call so the index never goes stale.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<SessionId, Session>,
    names: HashMap<String, SessionId>,
}

impl SessionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session to the registry
    pub fn register(&mut self, session: Session) {
        self.sessions.insert(session.id, session);
    }

    /// Remove a session and its username index entry, returning the session
    pub fn unregister(&mut self, id: SessionId) -> Option<Session> {
        let session = self.sessions.remove(&id)?;
        if let Some(name) = &session.name {
            let indexed = self.names.remove(name);
            debug_assert_eq!(indexed, Some(id), "username index out of sync");
        }
        Some(session)
    }

    /// Look up a session by identity
    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    /// Look up a session by identity, mutably
    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut Session> {
        self.sessions.get_mut(&id)
    }

    /// Look up a session by claimed display name
    pub fn by_name(&self, name: &str) -> Option<&Session> {
        let id = self.names.get(name)?;
        self.sessions.get(id)
    }

    /// Claim a display name for a session
    ///
    /// Fails if another live session already holds the name; the claim and
    /// the index insertion happen together, so a successful return means the
    /// name resolves to this session until it unregisters.
    pub fn claim_name(&mut self, id: SessionId, name: &str) -> Result<&Session, RegistryError> {
        if self.names.contains_key(name) {
            return Err(RegistryError::NameTaken(name.to_string()));
        }
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or(RegistryError::UnknownSession(id))?;
        debug_assert!(session.name.is_none(), "display name claimed twice");
        session.name = Some(name.to_string());
        self.names.insert(name.to_string(), id);
        Ok(session)
    }

    /// Check whether a session is registered
    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.contains_key(&id)
    }

    /// Number of registered sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Check whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_session() -> (SessionId, Session) {
        let id = SessionId::new();
        let (tx, _rx) = mpsc::channel(8);
        (id, Session::new(id, "Lobby", tx))
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = SessionRegistry::new();
        let (id, session) = make_session();
        registry.register(session);

        assert!(registry.contains(id));
        assert_eq!(registry.len(), 1);
        assert!(!registry.get(id).unwrap().is_named());
        assert_eq!(registry.get(id).unwrap().display_name(), "Unknown");
    }

    #[test]
    fn test_claim_name_indexes_session() {
        let mut registry = SessionRegistry::new();
        let (id, session) = make_session();
        registry.register(session);

        registry.claim_name(id, "Alice").unwrap();

        assert_eq!(registry.get(id).unwrap().display_name(), "Alice");
        assert_eq!(registry.by_name("Alice").unwrap().id, id);
    }

    #[test]
    fn test_duplicate_claim_rejected_and_original_intact() {
        let mut registry = SessionRegistry::new();
        let (first, session_a) = make_session();
        let (second, session_b) = make_session();
        registry.register(session_a);
        registry.register(session_b);

        registry.claim_name(first, "Alice").unwrap();
        let err = registry.claim_name(second, "Alice").unwrap_err();

        assert_eq!(err, RegistryError::NameTaken("Alice".to_string()));
        assert_eq!(registry.by_name("Alice").unwrap().id, first);
        assert!(!registry.get(second).unwrap().is_named());
    }

    #[test]
    fn test_claim_for_unknown_session() {
        let mut registry = SessionRegistry::new();
        let id = SessionId::new();

        let err = registry.claim_name(id, "Alice").unwrap_err();
        assert_eq!(err, RegistryError::UnknownSession(id));
        assert!(registry.by_name("Alice").is_none());
    }

    #[test]
    fn test_unregister_frees_name() {
        let mut registry = SessionRegistry::new();
        let (id, session) = make_session();
        registry.register(session);
        registry.claim_name(id, "Alice").unwrap();

        let removed = registry.unregister(id).unwrap();
        assert_eq!(removed.id, id);
        assert!(registry.by_name("Alice").is_none());
        assert!(registry.is_empty());

        // The freed name can be claimed by a later session
        let (next, session) = make_session();
        registry.register(session);
        registry.claim_name(next, "Alice").unwrap();
        assert_eq!(registry.by_name("Alice").unwrap().id, next);
    }

    #[test]
    fn test_unregister_unknown_is_none() {
        let mut registry = SessionRegistry::new();
        assert!(registry.unregister(SessionId::new()).is_none());
    }
}

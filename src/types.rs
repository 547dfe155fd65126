//! Basic type definitions for the chat server
//!
//! Provides the `SessionId` newtype: a UUID-based identifier assigned by the
//! transport when a connection is accepted, stable for the connection's
//! lifetime and never reused while the session is registered.

use uuid::Uuid;

/// Unique session identifier (newtype pattern)
///
/// Wraps a UUID v4 for type-safe session identification.
/// Implements Hash and Eq for use as HashMap keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

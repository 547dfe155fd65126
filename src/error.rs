//! Error types for the chat server
//!
//! Defines transport-level errors and registry-level errors.
//! Uses thiserror for ergonomic error definitions.
//!
//! User mistakes (unknown command, bad whisper target, malformed parameters)
//! are not represented here: they are reported back to the offending session
//! as plain text output events and never surface as `Err`.

use thiserror::Error;

use crate::types::SessionId;

/// Transport and process-level errors
///
/// Covers failures that end a connection handler or the process,
/// not business conditions.
#[derive(Debug, Error)]
pub enum AppError {
    /// IO error on the connection (fatal for that connection)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The event loop's input mailbox is gone (server shut down)
    #[error("Channel send error")]
    ChannelSend,
}

/// Registry-level rejections
///
/// Produced by `SessionRegistry` operations; the event loop translates the
/// expected ones into user-facing messages.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The display name is held by another live session
    #[error("the name '{0}' is already taken")]
    NameTaken(String),

    /// No session is registered under this identity
    #[error("no session registered for {0}")]
    UnknownSession(SessionId),
}

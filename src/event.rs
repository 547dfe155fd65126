//! Input and output event definitions
//!
//! `InputEvent` is everything the transport can tell the event loop;
//! `OutputEvent` is everything the event loop can tell a session. These two
//! types are the whole surface between the core and its collaborators: the
//! core knows nothing about sockets, line framing, or text encoding.

use tokio::sync::{mpsc, oneshot};

use crate::types::SessionId;

/// An event pushed by the transport into the event loop's input mailbox
///
/// The transport guarantees at most one concurrent producer per session
/// identity, so per-session ordering is preserved end to end.
#[derive(Debug)]
pub enum InputEvent {
    /// A new connection was accepted.
    ///
    /// The acknowledgement is used only for session-creation confirmation:
    /// the event loop creates the session's outbound mailbox and hands its
    /// receiving half back through `ack`.
    Connect {
        session_id: SessionId,
        ack: oneshot::Sender<mpsc::Receiver<OutputEvent>>,
    },
    /// One line of text received on the session's connection.
    Line { session_id: SessionId, text: String },
    /// The transport lost the connection.
    Hangup { session_id: SessionId },
}

/// Where an output event is addressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// One specific session
    Session(SessionId),
    /// Every current member of a room, optionally excluding one session
    Broadcast {
        room: String,
        exclude: Option<SessionId>,
    },
}

/// A message produced by the event loop for delivery to session mailboxes
///
/// Events land in per-session outbound mailboxes as-is; the transport renders
/// `text` as one line (or several, when the text contains newlines) and
/// treats `quit` as the signal to close the connection after writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputEvent {
    pub recipient: Recipient,
    pub text: String,
    pub quit: bool,
}

impl OutputEvent {
    /// A plain message to one session
    pub fn to(session_id: SessionId, text: impl Into<String>) -> Self {
        Self {
            recipient: Recipient::Session(session_id),
            text: text.into(),
            quit: false,
        }
    }

    /// A final message to one session; the transport closes the connection
    /// after writing it
    pub fn quit(session_id: SessionId, text: impl Into<String>) -> Self {
        Self {
            recipient: Recipient::Session(session_id),
            text: text.into(),
            quit: true,
        }
    }

    /// A message to every member of `room`, minus `exclude`
    pub fn broadcast(
        room: impl Into<String>,
        text: impl Into<String>,
        exclude: Option<SessionId>,
    ) -> Self {
        Self {
            recipient: Recipient::Broadcast {
                room: room.into(),
                exclude,
            },
            text: text.into(),
            quit: false,
        }
    }
}

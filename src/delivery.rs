//! Best-effort routing of output events into session mailboxes
//!
//! Every enqueue is non-blocking: a full mailbox drops the message (counted
//! and logged, never retried, never surfaced to the sender), and a closed
//! mailbox is a no-op because the transport on the other end is already
//! gone. A slow consumer can lose its own messages but can never stall the
//! event loop or delivery to anyone else.

use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use crate::event::{OutputEvent, Recipient};
use crate::session::Session;
use crate::world::World;

/// Routes output events to per-session outbound mailboxes
#[derive(Debug, Default)]
pub struct Delivery {
    dropped: u64,
}

impl Delivery {
    /// Create a delivery layer with an empty drop count
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages abandoned against full mailboxes since startup
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Deliver a batch of events in order
    ///
    /// `departed` is the session removed during the current turn, if any; its
    /// farewell is still deliverable even though it is no longer registered.
    pub fn deliver_all(
        &mut self,
        world: &World,
        events: Vec<OutputEvent>,
        departed: Option<&Session>,
    ) {
        for event in events {
            self.deliver(world, event, departed);
        }
    }

    /// Deliver one event to its recipient mailbox(es)
    pub fn deliver(&mut self, world: &World, event: OutputEvent, departed: Option<&Session>) {
        match event.recipient.clone() {
            Recipient::Session(id) => {
                let target = world
                    .sessions
                    .get(id)
                    .or_else(|| departed.filter(|session| session.id == id));
                match target {
                    Some(session) => self.enqueue(session, event),
                    None => debug!("Dropping event for unknown session {}", id),
                }
            }
            Recipient::Broadcast { room, exclude } => {
                for member in world.rooms.members(&room) {
                    if exclude == Some(member) {
                        continue;
                    }
                    if let Some(session) = world.sessions.get(member) {
                        self.enqueue(session, event.clone());
                    }
                }
            }
        }
    }

    fn enqueue(&mut self, session: &Session, event: OutputEvent) {
        match session.sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                self.dropped += 1;
                warn!(
                    "Outbound mailbox full for {}, discarding message: {}",
                    session.id, event.text
                );
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Outbound mailbox closed for {}", session.id);
            }
        }
    }
}

//! The ChatServer actor: the event loop that owns all mutable state
//!
//! One spawned task drains the bounded input mailbox and processes each
//! event to completion before taking the next. Every registry mutation
//! happens inside that turn, which is the sole serialization point of the
//! system: the registries carry no locks because nothing else can reach
//! them. Producers (one transport task per connection) interact with the
//! core only by awaiting `send` on the shared input channel — a full mailbox
//! is the one place the outside world blocks.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::commands::CommandTable;
use crate::delivery::Delivery;
use crate::error::RegistryError;
use crate::event::{InputEvent, OutputEvent};
use crate::room::LOBBY;
use crate::session::Session;
use crate::types::SessionId;
use crate::world::World;

/// Capacity of the shared input mailbox; producers await when it is full
pub const INPUT_BUFFER_SIZE: usize = 100;

/// Capacity of each session's outbound mailbox; overflow is dropped
pub const OUTBOUND_BUFFER_SIZE: usize = 100;

/// The central actor managing sessions, rooms, and usernames
pub struct ChatServer {
    world: World,
    commands: CommandTable,
    delivery: Delivery,
    receiver: mpsc::Receiver<InputEvent>,
}

impl ChatServer {
    /// Create a server with the built-in command set
    pub fn new(receiver: mpsc::Receiver<InputEvent>) -> Self {
        Self::with_commands(receiver, CommandTable::with_defaults())
    }

    /// Create a server with a caller-assembled command table
    pub fn with_commands(receiver: mpsc::Receiver<InputEvent>, commands: CommandTable) -> Self {
        Self {
            world: World::new(),
            commands,
            delivery: Delivery::new(),
            receiver,
        }
    }

    /// Run the event loop
    ///
    /// Processes input events one at a time until all producers are gone.
    pub async fn run(mut self) {
        info!("ChatServer started");

        while let Some(event) = self.receiver.recv().await {
            self.process(event);
        }

        info!("ChatServer shutting down");
    }

    /// Process a single input event to completion
    fn process(&mut self, event: InputEvent) {
        match event {
            InputEvent::Connect { session_id, ack } => self.handle_connect(session_id, ack),
            InputEvent::Line { session_id, text } => self.handle_line(session_id, text),
            InputEvent::Hangup { session_id } => self.handle_hangup(session_id),
        }
    }

    /// Create an unnamed session in the lobby and prompt it for a name
    fn handle_connect(
        &mut self,
        session_id: SessionId,
        ack: oneshot::Sender<mpsc::Receiver<OutputEvent>>,
    ) {
        if self.world.sessions.contains(session_id) {
            warn!("Connect for already-registered session {}", session_id);
            return;
        }

        let (sender, outbox) = mpsc::channel(OUTBOUND_BUFFER_SIZE);
        self.world
            .sessions
            .register(Session::new(session_id, LOBBY, sender));
        self.world.rooms.add_member(LOBBY, session_id);
        info!("Session {} connected", session_id);
        debug!("Total sessions: {}", self.world.sessions.len());

        if ack.send(outbox).is_err() {
            // The transport died before creation was confirmed; nobody will
            // ever drain this mailbox, so take the session back out.
            debug!("Session {} vanished before confirmation", session_id);
            self.world.remove_session(session_id);
            return;
        }

        self.delivery
            .deliver_all(&self.world, vec![OutputEvent::to(session_id, "Who are you?")], None);
    }

    /// Route one line of input: name claim, command, or chat
    fn handle_line(&mut self, session_id: SessionId, text: String) {
        let Some(session) = self.world.sessions.get(session_id) else {
            warn!("Line from unknown session {}", session_id);
            return;
        };

        if !session.is_named() {
            self.handle_name_claim(session_id, text);
        } else if let Some(command) = text.strip_prefix('/') {
            self.handle_command(session_id, command.to_string());
        } else {
            self.handle_chat(session_id, text);
        }
    }

    /// Treat the input as a proposed display name
    fn handle_name_claim(&mut self, session_id: SessionId, proposed: String) {
        let events = match self.world.sessions.claim_name(session_id, &proposed) {
            Ok(session) => {
                let room = session.room.clone();
                info!("Session {} is now known as '{}'", session_id, proposed);
                vec![
                    OutputEvent::to(session_id, format!("Welcome, {proposed}!")),
                    OutputEvent::broadcast(
                        room,
                        format!("{proposed} has joined the room."),
                        Some(session_id),
                    ),
                ]
            }
            Err(RegistryError::NameTaken(name)) => {
                debug!("Session {} proposed taken name '{}'", session_id, name);
                vec![OutputEvent::to(
                    session_id,
                    format!("The name '{name}' is already taken."),
                )]
            }
            Err(RegistryError::UnknownSession(id)) => {
                warn!("Name claim for unknown session {}", id);
                return;
            }
        };
        self.delivery.deliver_all(&self.world, events, None);
    }

    /// Dispatch a slash-command and apply any termination it produced
    fn handle_command(&mut self, session_id: SessionId, input: String) {
        let Some(invoker) = self.world.sessions.get(session_id) else {
            return;
        };
        let events = self.commands.dispatch(&self.world, invoker, &input);

        if events.iter().any(|event| event.quit) {
            // Tear the session down in the same turn that produced the quit,
            // then announce the departure to whoever is left. The farewell is
            // delivered through the departed session's still-open mailbox.
            let departed = self.world.remove_session(session_id);
            self.delivery
                .deliver_all(&self.world, events, departed.as_ref());
            if let Some(departed) = departed {
                info!(
                    "Session {} ({}) quit",
                    departed.id,
                    departed.display_name()
                );
                if let Some(name) = &departed.name {
                    let announcement = OutputEvent::broadcast(
                        departed.room.clone(),
                        format!("{name} has left the room."),
                        None,
                    );
                    self.delivery.deliver_all(&self.world, vec![announcement], None);
                }
            }
        } else {
            self.delivery.deliver_all(&self.world, events, None);
        }
    }

    /// Broadcast a chat line to the rest of the sender's room
    fn handle_chat(&mut self, session_id: SessionId, text: String) {
        let Some(session) = self.world.sessions.get(session_id) else {
            return;
        };
        let event = OutputEvent::broadcast(
            session.room.clone(),
            format!("{} says: {}", session.display_name(), text),
            Some(session_id),
        );
        self.delivery.deliver_all(&self.world, vec![event], None);
    }

    /// The transport lost the connection: remove the session and tell the room
    fn handle_hangup(&mut self, session_id: SessionId) {
        let Some(departed) = self.world.remove_session(session_id) else {
            debug!("Hangup for unknown session {}", session_id);
            return;
        };
        info!("Session {} disconnected", session_id);

        if let Some(name) = &departed.name {
            let announcement = OutputEvent::broadcast(
                departed.room.clone(),
                format!("{name} has left the room."),
                None,
            );
            self.delivery.deliver_all(&self.world, vec![announcement], None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> ChatServer {
        // The input channel is unused in these tests; events are pushed
        // straight through `process`.
        let (_tx, rx) = mpsc::channel(1);
        ChatServer::new(rx)
    }

    fn connect(server: &mut ChatServer) -> (SessionId, mpsc::Receiver<OutputEvent>) {
        let session_id = SessionId::new();
        let (ack, mut confirmed) = oneshot::channel();
        server.process(InputEvent::Connect { session_id, ack });
        let outbox = confirmed.try_recv().expect("session creation confirmed");
        (session_id, outbox)
    }

    fn join(server: &mut ChatServer, name: &str) -> (SessionId, mpsc::Receiver<OutputEvent>) {
        let (session_id, mut outbox) = connect(server);
        assert_eq!(outbox.try_recv().unwrap().text, "Who are you?");
        line(server, session_id, name);
        assert_eq!(outbox.try_recv().unwrap().text, format!("Welcome, {name}!"));
        (session_id, outbox)
    }

    fn line(server: &mut ChatServer, session_id: SessionId, text: &str) {
        server.process(InputEvent::Line {
            session_id,
            text: text.to_string(),
        });
    }

    fn drain(outbox: &mut mpsc::Receiver<OutputEvent>) -> Vec<OutputEvent> {
        let mut events = Vec::new();
        while let Ok(event) = outbox.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_connect_prompts_for_name() {
        let mut server = server();
        let (_id, mut outbox) = connect(&mut server);

        let events = drain(&mut outbox);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].text, "Who are you?");
    }

    #[test]
    fn test_name_claim_welcomes_and_announces() {
        let mut server = server();
        let (_bob, mut bob_outbox) = join(&mut server, "Bob");
        let (_alice, mut alice_outbox) = join(&mut server, "Alice");

        // Bob saw Alice's arrival; Alice saw nothing past her own welcome
        let bob_events = drain(&mut bob_outbox);
        assert_eq!(bob_events.len(), 1);
        assert_eq!(bob_events[0].text, "Alice has joined the room.");
        assert!(drain(&mut alice_outbox).is_empty());
    }

    #[test]
    fn test_duplicate_name_rejected_then_retry() {
        let mut server = server();
        let (_alice, _alice_outbox) = join(&mut server, "Alice");
        let (intruder, mut outbox) = connect(&mut server);
        assert_eq!(outbox.try_recv().unwrap().text, "Who are you?");

        line(&mut server, intruder, "Alice");
        let events = drain(&mut outbox);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].text, "The name 'Alice' is already taken.");

        // Still unnamed: the next line is a fresh claim
        line(&mut server, intruder, "Bob");
        let events = drain(&mut outbox);
        assert_eq!(events[0].text, "Welcome, Bob!");
    }

    #[test]
    fn test_chat_broadcasts_to_everyone_else() {
        let mut server = server();
        let (alice, mut alice_outbox) = join(&mut server, "Alice");
        let (_bob, mut bob_outbox) = join(&mut server, "Bob");
        drain(&mut alice_outbox);

        line(&mut server, alice, "hello everyone");

        let bob_events = drain(&mut bob_outbox);
        assert_eq!(bob_events.len(), 1);
        assert_eq!(bob_events[0].text, "Alice says: hello everyone");
        assert!(drain(&mut alice_outbox).is_empty());
    }

    #[test]
    fn test_unknown_command_goes_to_sender_only() {
        let mut server = server();
        let (alice, mut alice_outbox) = join(&mut server, "Alice");
        let (_bob, mut bob_outbox) = join(&mut server, "Bob");
        drain(&mut alice_outbox);
        drain(&mut bob_outbox);

        line(&mut server, alice, "/dance");

        let alice_events = drain(&mut alice_outbox);
        assert_eq!(alice_events.len(), 1);
        assert_eq!(alice_events[0].text, "Unknown command: dance");
        assert!(drain(&mut bob_outbox).is_empty());
    }

    #[test]
    fn test_who_sees_the_whole_room() {
        let mut server = server();
        let (alice, mut alice_outbox) = join(&mut server, "Alice");
        let (_bob, _bob_outbox) = join(&mut server, "Bob");
        drain(&mut alice_outbox);

        line(&mut server, alice, "/who");

        let events = drain(&mut alice_outbox);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].text, "Users in this room: Alice, Bob");
    }

    #[test]
    fn test_whisper_between_sessions() {
        let mut server = server();
        let (alice, mut alice_outbox) = join(&mut server, "Alice");
        let (_bob, mut bob_outbox) = join(&mut server, "Bob");
        drain(&mut alice_outbox);
        drain(&mut bob_outbox);

        line(&mut server, alice, "/whisper Bob hi");

        let alice_events = drain(&mut alice_outbox);
        assert_eq!(alice_events.len(), 1);
        assert_eq!(alice_events[0].text, "You whispered to Bob: hi");
        let bob_events = drain(&mut bob_outbox);
        assert_eq!(bob_events.len(), 1);
        assert_eq!(bob_events[0].text, "Alice whispers: hi");
    }

    #[test]
    fn test_whisper_to_missing_user_changes_nothing() {
        let mut server = server();
        let (alice, mut alice_outbox) = join(&mut server, "Alice");
        drain(&mut alice_outbox);

        line(&mut server, alice, "/whisper Ghost boo");

        let events = drain(&mut alice_outbox);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].text, "User 'Ghost' not found.");
        assert_eq!(server.world.sessions.len(), 1);
    }

    #[test]
    fn test_quit_tears_down_and_announces() {
        let mut server = server();
        let (alice, mut alice_outbox) = join(&mut server, "Alice");
        let (_bob, mut bob_outbox) = join(&mut server, "Bob");
        drain(&mut alice_outbox);
        drain(&mut bob_outbox);

        line(&mut server, alice, "/quit");

        // Alice got exactly the farewell, flagged terminal
        let alice_events = drain(&mut alice_outbox);
        assert_eq!(alice_events.len(), 1);
        assert_eq!(alice_events[0].text, "Goodbye!");
        assert!(alice_events[0].quit);

        // Bob got exactly the departure announcement
        let bob_events = drain(&mut bob_outbox);
        assert_eq!(bob_events.len(), 1);
        assert_eq!(bob_events[0].text, "Alice has left the room.");

        // All registries are clean in the same turn
        assert!(!server.world.sessions.contains(alice));
        assert!(server.world.sessions.by_name("Alice").is_none());
        assert!(!server.world.rooms.get(LOBBY).unwrap().contains(alice));
    }

    #[test]
    fn test_quit_then_who_never_sees_the_departed() {
        let mut server = server();
        let (alice, _alice_outbox) = join(&mut server, "Alice");
        let (bob, mut bob_outbox) = join(&mut server, "Bob");
        drain(&mut bob_outbox);

        line(&mut server, alice, "/quit");
        drain(&mut bob_outbox);
        line(&mut server, bob, "/who");

        let events = drain(&mut bob_outbox);
        assert_eq!(events[0].text, "Users in this room: Bob");
    }

    #[test]
    fn test_hangup_of_named_session_announces() {
        let mut server = server();
        let (alice, _alice_outbox) = join(&mut server, "Alice");
        let (_bob, mut bob_outbox) = join(&mut server, "Bob");
        drain(&mut bob_outbox);

        server.process(InputEvent::Hangup { session_id: alice });

        let events = drain(&mut bob_outbox);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].text, "Alice has left the room.");
        assert!(!server.world.sessions.contains(alice));
    }

    #[test]
    fn test_hangup_of_unnamed_session_is_silent() {
        let mut server = server();
        let (_alice, mut alice_outbox) = join(&mut server, "Alice");
        drain(&mut alice_outbox);
        let (unnamed, _outbox) = connect(&mut server);

        server.process(InputEvent::Hangup { session_id: unnamed });

        assert!(drain(&mut alice_outbox).is_empty());
        assert!(!server.world.sessions.contains(unnamed));
    }

    #[test]
    fn test_unnamed_session_receives_room_traffic() {
        let mut server = server();
        let (alice, mut alice_outbox) = join(&mut server, "Alice");
        drain(&mut alice_outbox);
        let (_watcher, mut watcher_outbox) = connect(&mut server);
        drain(&mut watcher_outbox);

        line(&mut server, alice, "anyone here?");

        let events = drain(&mut watcher_outbox);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].text, "Alice says: anyone here?");
    }

    #[test]
    fn test_connect_ack_gone_rolls_back() {
        let mut server = server();
        let session_id = SessionId::new();
        let (ack, confirmed) = oneshot::channel();
        drop(confirmed);

        server.process(InputEvent::Connect { session_id, ack });

        assert!(!server.world.sessions.contains(session_id));
        assert!(!server.world.rooms.get(LOBBY).unwrap().contains(session_id));
    }
}

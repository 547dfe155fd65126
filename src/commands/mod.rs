//! Slash-command dispatch
//!
//! A command is a trait object registered in the `CommandTable` under its
//! name. The event loop strips the leading `/`, splits the line into a
//! command token and a parameter rest, and dispatches here; handlers only
//! read state and describe their effects as output events, so each one is
//! testable in isolation against a hand-built `World`.
//!
//! The table is open: `register` accepts new handlers without any change to
//! the event loop's control flow.

mod help;
mod quit;
mod who;
mod whisper;

use std::collections::HashMap;

pub use help::HelpCommand;
pub use quit::QuitCommand;
pub use who::WhoCommand;
pub use whisper::WhisperCommand;

use crate::event::OutputEvent;
use crate::session::Session;
use crate::world::World;

/// Read-only view handed to command handlers
///
/// Exposes the world state for lookups and the table itself so the help
/// command can enumerate and delegate to its peers.
pub struct CommandContext<'a> {
    pub world: &'a World,
    pub commands: &'a CommandTable,
}

/// A slash-command implementation
///
/// When `help` is true the handler must return exactly one usage message
/// addressed to the invoker and touch nothing else; help output is identical
/// on every call. Malformed parameters never mutate state either: they
/// produce the same usage message.
pub trait CommandHandler: Send + Sync {
    fn handle(
        &self,
        ctx: &CommandContext<'_>,
        invoker: &Session,
        params: &str,
        help: bool,
    ) -> Vec<OutputEvent>;
}

/// The command name → handler mapping
pub struct CommandTable {
    handlers: HashMap<&'static str, Box<dyn CommandHandler>>,
}

impl CommandTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Create a table holding the built-in commands
    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        table.register("who", WhoCommand);
        table.register("whisper", WhisperCommand);
        table.register("help", HelpCommand);
        table.register("quit", QuitCommand);
        table
    }

    /// Register a handler under a command name
    pub fn register(&mut self, name: &'static str, handler: impl CommandHandler + 'static) {
        self.handlers.insert(name, Box::new(handler));
    }

    /// Look up a handler by command name
    pub fn get(&self, name: &str) -> Option<&dyn CommandHandler> {
        self.handlers.get(name).map(Box::as_ref)
    }

    /// Registered command names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Dispatch one stripped command line (`who`, `whisper Bob hi`, ...)
    ///
    /// An unregistered token yields a single message to the invoker and no
    /// other effect.
    pub fn dispatch(&self, world: &World, invoker: &Session, input: &str) -> Vec<OutputEvent> {
        let (name, params) = match input.split_once(' ') {
            Some((name, params)) => (name, params.trim()),
            None => (input, ""),
        };
        match self.get(name) {
            Some(handler) => {
                let ctx = CommandContext {
                    world,
                    commands: self,
                };
                handler.handle(&ctx, invoker, params, false)
            }
            None => vec![OutputEvent::to(
                invoker.id,
                format!("Unknown command: {name}"),
            )],
        }
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}

//! The `quit` command: leave the server

use crate::commands::{CommandContext, CommandHandler};
use crate::event::OutputEvent;
use crate::session::Session;

const USAGE: &str = "Quit the game.\nUsage: /quit";

/// Produces the farewell event with the termination flag set; the event loop
/// tears the session down when it sees the flag
pub struct QuitCommand;

impl CommandHandler for QuitCommand {
    fn handle(
        &self,
        _ctx: &CommandContext<'_>,
        invoker: &Session,
        _params: &str,
        help: bool,
    ) -> Vec<OutputEvent> {
        if help {
            return vec![OutputEvent::to(invoker.id, USAGE)];
        }

        vec![OutputEvent::quit(invoker.id, "Goodbye!")]
    }
}

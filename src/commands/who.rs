//! The `who` command: list the users in the invoker's room

use tracing::debug;

use crate::commands::{CommandContext, CommandHandler};
use crate::event::OutputEvent;
use crate::session::Session;

const USAGE: &str = "List users in the room.\nUsage: /who";

/// Lists the display names of every named session in the invoker's room
pub struct WhoCommand;

impl CommandHandler for WhoCommand {
    fn handle(
        &self,
        ctx: &CommandContext<'_>,
        invoker: &Session,
        _params: &str,
        help: bool,
    ) -> Vec<OutputEvent> {
        if help {
            return vec![OutputEvent::to(invoker.id, USAGE)];
        }

        debug!(
            "{} requested the user list for room {}",
            invoker.display_name(),
            invoker.room
        );
        let names = ctx.world.member_names(&invoker.room);
        vec![OutputEvent::to(
            invoker.id,
            format!("Users in this room: {}", names.join(", ")),
        )]
    }
}

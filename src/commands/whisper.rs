//! The `whisper` command: send a private message to one named user

use tracing::debug;

use crate::commands::{CommandContext, CommandHandler};
use crate::event::OutputEvent;
use crate::session::Session;

const USAGE: &str = "Say something privately\nUsage: /whisper <username> <message>";

/// Delivers a message to one target session and a confirmation to the
/// sender; never broadcasts
pub struct WhisperCommand;

impl CommandHandler for WhisperCommand {
    fn handle(
        &self,
        ctx: &CommandContext<'_>,
        invoker: &Session,
        params: &str,
        help: bool,
    ) -> Vec<OutputEvent> {
        if help {
            return vec![OutputEvent::to(invoker.id, USAGE)];
        }

        // Needs a target name and a non-empty message
        let Some((target, message)) = params.split_once(' ') else {
            return vec![OutputEvent::to(invoker.id, USAGE)];
        };
        let message = message.trim();
        if target.is_empty() || message.is_empty() {
            return vec![OutputEvent::to(invoker.id, USAGE)];
        }

        debug!(
            "{} whispers to {}: {}",
            invoker.display_name(),
            target,
            message
        );
        match ctx.world.sessions.by_name(target) {
            None => vec![OutputEvent::to(
                invoker.id,
                format!("User '{target}' not found."),
            )],
            Some(recipient) => vec![
                OutputEvent::to(
                    recipient.id,
                    format!("{} whispers: {message}", invoker.display_name()),
                ),
                OutputEvent::to(
                    invoker.id,
                    format!("You whispered to {target}: {message}"),
                ),
            ],
        }
    }
}

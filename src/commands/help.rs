//! The `help` command: list commands, or show one command's usage

use crate::commands::{CommandContext, CommandHandler};
use crate::event::OutputEvent;
use crate::session::Session;

const USAGE: &str = "List available commands.\nUsage: /help [<command>]";

/// With no parameter, lists every registered command; with a command name,
/// delegates to that handler with the help flag set (one level deep)
pub struct HelpCommand;

impl CommandHandler for HelpCommand {
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

        match params.split_whitespace().next() {
            None => {
                let listing: Vec<String> = ctx
                    .commands
                    .names()
                    .iter()
                    .map(|name| format!("/{name}"))
                    .collect();
                vec![OutputEvent::to(
                    invoker.id,
                    format!("Available commands: {}", listing.join(", ")),
                )]
            }
            Some(name) => match ctx.commands.get(name) {
                Some(handler) => handler.handle(ctx, invoker, "", true),
                None => vec![OutputEvent::to(
                    invoker.id,
                    format!("Unknown command: {name}"),
                )],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testutil::join_named;
    use crate::commands::CommandTable;
    use crate::world::World;

    #[test]
    fn test_help_lists_all_commands() {
        let mut world = World::new();
        let (alice, _rx) = join_named(&mut world, "Alice");
        let table = CommandTable::with_defaults();
        let ctx = CommandContext {
            world: &world,
            commands: &table,
        };

        let invoker = world.sessions.get(alice).unwrap();
        let events = HelpCommand.handle(&ctx, invoker, "", false);

        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].text,
            "Available commands: /help, /quit, /whisper, /who"
        );
    }

    #[test]
    fn test_help_delegates_to_named_command() {
        let mut world = World::new();
        let (alice, _rx) = join_named(&mut world, "Alice");
        let table = CommandTable::with_defaults();
        let ctx = CommandContext {
            world: &world,
            commands: &table,
        };

        let invoker = world.sessions.get(alice).unwrap();
        let events = HelpCommand.handle(&ctx, invoker, "who", false);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].text, "List users in the room.\nUsage: /who");
    }

    #[test]
    fn test_help_unknown_command() {
        let mut world = World::new();
        let (alice, _rx) = join_named(&mut world, "Alice");
        let table = CommandTable::with_defaults();
        let ctx = CommandContext {
            world: &world,
            commands: &table,
        };

        let invoker = world.sessions.get(alice).unwrap();
        let events = HelpCommand.handle(&ctx, invoker, "dance", false);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].text, "Unknown command: dance");
    }

    #[test]
    fn test_help_is_idempotent() {
        let mut world = World::new();
        let (alice, _rx) = join_named(&mut world, "Alice");
        let table = CommandTable::with_defaults();
        let ctx = CommandContext {
            world: &world,
            commands: &table,
        };
        let invoker = world.sessions.get(alice).unwrap();

        for params in ["", "who", "whisper", "quit", "help"] {
            let first = HelpCommand.handle(&ctx, invoker, params, false);
            let second = HelpCommand.handle(&ctx, invoker, params, false);
            assert_eq!(first, second, "params {params:?}");
        }
    }
}

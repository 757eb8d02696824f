//! Shell command table and parsing.

use once_cell::sync::Lazy;

/// A command entered at the shell prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Print,
    Collect,
    Insert,
    Attach,
    Detach,
    Reset,
    Json,
    Help,
    Quit,
}

struct CommandSpec {
    key: &'static str,
    command: Command,
    help: &'static str,
}

const COMMANDS: &[CommandSpec] = &[
    CommandSpec { key: "P", command: Command::Print, help: "print current tree" },
    CommandSpec { key: "S", command: Command::Collect, help: "update dirty caches and print ordered ids" },
    CommandSpec { key: "I", command: Command::Insert, help: "insert new node" },
    CommandSpec { key: "C", command: Command::Attach, help: "attach cache on a tree node" },
    CommandSpec { key: "D", command: Command::Detach, help: "detach cache from a tree node" },
    CommandSpec { key: "R", command: Command::Reset, help: "reset tree" },
    CommandSpec { key: "J", command: Command::Json, help: "dump tree as JSON" },
    CommandSpec { key: "H", command: Command::Help, help: "show this manual" },
    CommandSpec { key: "Q", command: Command::Quit, help: "quit" },
];

/// Help text listing every command.
pub static MANUAL: Lazy<String> = Lazy::new(|| {
    COMMANDS
        .iter()
        .map(|spec| format!("{}/{}: {}\n", spec.key, spec.key.to_lowercase(), spec.help))
        .collect()
});

impl Command {
    /// Parses a command token, ignoring case. `exit` is an alias for quit.
    pub fn parse(token: &str) -> Option<Command> {
        if token == "exit" {
            return Some(Command::Quit);
        }
        COMMANDS
            .iter()
            .find(|spec| spec.key.eq_ignore_ascii_case(token))
            .map(|spec| spec.command)
    }

    /// Question asked before reading the command's numeric argument.
    pub fn prompt(&self) -> Option<&'static str> {
        match self {
            Command::Insert => Some("Which node you want to insert the new node under?"),
            Command::Attach => Some("Which node you want to attach the cache under?"),
            Command::Detach => Some("Which node you want to detach the cache from?"),
            Command::Reset => Some("How many preset tree nodes you want to create with?"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Command::parse("p"), Some(Command::Print));
        assert_eq!(Command::parse("P"), Some(Command::Print));
        assert_eq!(Command::parse("s"), Some(Command::Collect));
        assert_eq!(Command::parse("exit"), Some(Command::Quit));
        assert_eq!(Command::parse("x"), None);
        assert_eq!(Command::parse("print"), None);
    }

    #[test]
    fn only_structural_commands_take_arguments() {
        assert!(Command::Insert.prompt().is_some());
        assert!(Command::Reset.prompt().is_some());
        assert!(Command::Print.prompt().is_none());
        assert!(Command::Json.prompt().is_none());
    }

    #[test]
    fn manual_lists_every_command() {
        assert_eq!(MANUAL.lines().count(), COMMANDS.len());
        assert!(MANUAL.starts_with("P/p: print current tree\n"));
    }
}

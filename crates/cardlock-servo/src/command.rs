//! Commands accepted by the interactive servo console.

use std::fmt;
use std::str::FromStr;

/// One console command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServoCommand {
    Lock,
    Unlock,
    Toggle,
    Quit,
}

/// Input that names no known command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid command '{0}'. Use: lock, unlock, toggle, or quit")]
pub struct UnknownCommand(pub String);

impl FromStr for ServoCommand {
    type Err = UnknownCommand;

    /// Parse a command, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lock" => Ok(Self::Lock),
            "unlock" => Ok(Self::Unlock),
            "toggle" => Ok(Self::Toggle),
            "quit" | "q" | "exit" => Ok(Self::Quit),
            other => Err(UnknownCommand(other.to_string())),
        }
    }
}

impl fmt::Display for ServoCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Lock => "lock",
            Self::Unlock => "unlock",
            Self::Toggle => "toggle",
            Self::Quit => "quit",
        };
        f.write_str(name)
    }
}

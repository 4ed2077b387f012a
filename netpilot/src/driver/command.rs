//! Command input shapes.

/// A single command or an ordered list of commands.
///
/// What a list means depends on the operation:
///
/// - [`send`](crate::driver::Driver::send) treats it as ordered candidates
///   for the same intent (e.g. `["show version", "show system information"]`)
///   and returns the first output without an invalid-command marker. When
///   every candidate is rejected, the output of the *last* one is returned
///   as a best attempt; callers that care must inspect the text.
/// - [`cli`](crate::driver::Driver::cli) runs every command and maps each
///   to its output.
/// - [`config_commands`](crate::driver::Driver::config_commands) sends the
///   lines in configuration mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Single(String),
    List(Vec<String>),
}

impl From<&str> for Command {
    fn from(command: &str) -> Self {
        Command::Single(command.to_string())
    }
}

impl From<String> for Command {
    fn from(command: String) -> Self {
        Command::Single(command)
    }
}

impl From<Vec<String>> for Command {
    fn from(commands: Vec<String>) -> Self {
        Command::List(commands)
    }
}

impl From<Vec<&str>> for Command {
    fn from(commands: Vec<&str>) -> Self {
        Command::List(commands.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Command {
    fn from(commands: &[&str]) -> Self {
        Command::List(commands.iter().map(|c| c.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Command {
    fn from(commands: [&str; N]) -> Self {
        Command::List(commands.iter().map(|c| c.to_string()).collect())
    }
}

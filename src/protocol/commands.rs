//! Module `commands`
//!
//! Parses one received line into a chat `Command`.

/// A line received from a client after its name has been set.
#[derive(Debug, PartialEq)]
pub enum Command {
    /// `/nick <name>`; `None` when no usable name followed the command
    Nick(Option<String>),
    /// `/quit`, with any trailing text ignored
    Quit,
    /// Anything else is chat text
    Message(String),
}

const NICK_PREFIX: &str = "/nick";
const QUIT_PREFIX: &str = "/quit";

/// Parses a raw line (line ending already stripped) into a `Command`.
///
/// Only the first space separates `/nick` from its argument, so new names
/// may contain spaces. The argument is kept verbatim unless it is blank.
pub fn parse_command(line: &str) -> Command {
    if line.starts_with(NICK_PREFIX) {
        let name = line
            .split_once(' ')
            .map(|(_, rest)| rest)
            .filter(|rest| !rest.trim().is_empty())
            .map(str::to_string);
        return Command::Nick(name);
    }

    if line.starts_with(QUIT_PREFIX) {
        return Command::Quit;
    }

    Command::Message(line.to_string())
}

/// Removes a trailing `\n` or `\r\n`.
pub fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

//! Wire protocol shared by the broker and the companion terminal client.
//!
//! The protocol is line-oriented and UTF-8-agnostic: a command is one line of
//! arbitrary bytes terminated by `\n`, with fields separated by single space
//! characters. This crate owns the command grammar, its validation rules, and
//! the handful of byte layouts exchanged over the wire, so both ends parse
//! and format the same way.

mod command;
mod line;
mod token;

pub use command::{parse, Command};
pub use line::read_line;
pub use token::is_valid_token;

/// Literal reply sent to a named client after a malformed command line.
pub const INVALID_REPLY: &[u8] = b":invalid\n";

/// Builds the `<PUBLISHER>:<TOPIC>:<VALUE>\n` fan-out line.
///
/// Built byte-by-byte rather than through a format string, since `publisher`,
/// `topic` and `value` all come from a client and must never be treated as
/// anything but data.
pub fn format_fanout(publisher: &[u8], topic: &[u8], value: &[u8]) -> Vec<u8> {
    let mut line = Vec::with_capacity(publisher.len() + topic.len() + value.len() + 3);
    line.extend_from_slice(publisher);
    line.push(b':');
    line.extend_from_slice(topic);
    line.push(b':');
    line.extend_from_slice(value);
    line.push(b'\n');
    line
}

/// Builds a `name <NAME>\n` line, as sent by the companion client on connect.
pub fn format_name(name: &[u8]) -> Vec<u8> {
    format_command(b"name", name)
}

/// Builds a `sub <TOPIC>\n` line, as sent by the companion client on connect.
pub fn format_sub(topic: &[u8]) -> Vec<u8> {
    format_command(b"sub", topic)
}

fn format_command(verb: &[u8], arg: &[u8]) -> Vec<u8> {
    let mut line = Vec::with_capacity(verb.len() + arg.len() + 2);
    line.extend_from_slice(verb);
    line.push(b' ');
    line.extend_from_slice(arg);
    line.push(b'\n');
    line
}

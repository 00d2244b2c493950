//! Chat protocol implementation
//!
//! Newline-delimited UTF-8 text. Handles command parsing and the lines the
//! server sends back.

pub mod commands;
pub mod responses;

pub use commands::{Command, parse_command, strip_line_ending};

//! Error types
//!
//! Defines domain-specific error types for the server and per-client sessions.

use std::fmt;
use std::io;

/// Per-session errors. Always local to one connection.
#[derive(Debug)]
pub enum SessionError {
    /// Peer closed the stream before the expected line arrived
    Disconnected,
    /// Session was closed locally (quit or server shutdown)
    Closed,
    IoError(io::Error),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Disconnected => write!(f, "Peer disconnected"),
            SessionError::Closed => write!(f, "Session closed"),
            SessionError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<io::Error> for SessionError {
    fn from(error: io::Error) -> Self {
        SessionError::IoError(error)
    }
}

/// General chat server error
#[derive(Debug)]
pub enum ChatServerError {
    /// Listening socket could not be bound; fatal to startup
    Bind { addr: String, source: io::Error },
    Config(config::ConfigError),
    IoError(io::Error),
}

impl fmt::Display for ChatServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatServerError::Bind { addr, source } => {
                write!(f, "Failed to bind to {}: {}", addr, source)
            }
            ChatServerError::Config(e) => write!(f, "Configuration error: {}", e),
            ChatServerError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ChatServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChatServerError::Bind { source, .. } => Some(source),
            ChatServerError::Config(e) => Some(e),
            ChatServerError::IoError(e) => Some(e),
        }
    }
}

impl From<config::ConfigError> for ChatServerError {
    fn from(error: config::ConfigError) -> Self {
        ChatServerError::Config(error)
    }
}

impl From<io::Error> for ChatServerError {
    fn from(error: io::Error) -> Self {
        ChatServerError::IoError(error)
    }
}

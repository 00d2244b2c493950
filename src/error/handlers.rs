//! Error handlers
//!
//! Decides how loudly each failure is reported.

use crate::error::types::{ChatServerError, SessionError};
use log::{debug, error, warn};

/// Report a server-level error
pub fn handle_error(err: &ChatServerError) {
    error!("Chat Server Error: {}", err);
}

/// Report a session-ending error for `peer`. Ordinary disconnects stay at debug.
pub fn handle_session_error(peer: &str, err: &SessionError) {
    match err {
        SessionError::Disconnected | SessionError::Closed => {
            debug!("Session {} ended: {}", peer, err)
        }
        SessionError::IoError(e) => warn!("Session {} failed: {}", peer, e),
    }
}

/// Process exit code for a fatal server error
pub fn exit_code(err: &ChatServerError) -> i32 {
    match err {
        ChatServerError::Bind { .. } => 2,
        ChatServerError::Config(_) => 78,
        ChatServerError::IoError(_) => 1,
    }
}

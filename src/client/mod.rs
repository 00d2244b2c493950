//! Client management system
//!
//! Handles client connections, session state and the broadcast registry.

pub mod handler;
pub mod registry;
pub mod session;

pub use handler::ConnectionHandler;
pub use registry::ClientRegistry;
pub use session::{ClientSession, SessionId};

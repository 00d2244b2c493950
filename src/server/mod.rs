//! Server core functionality
//!
//! Listening socket, accept loop and the broadcast hub.

pub mod core;
pub mod hub;

pub use core::Server;
pub use hub::Hub;

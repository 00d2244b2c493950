//! RAX Chat - minimal multi-client line-based chat service.

pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod server;

pub use config::ServerConfig;
pub use server::{Hub, Server};

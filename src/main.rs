//! RAX Chat Server - Entry Point
//!
//! Accepts TCP clients and relays their lines to everyone connected.

use log::{info, warn};
use std::process;

use rax_chat::error::ChatServerError;
use rax_chat::error::handlers::{exit_code, handle_error};
use rax_chat::{Server, ServerConfig};

fn fail(err: ChatServerError) -> ! {
    handle_error(&err);
    process::exit(exit_code(&err));
}

#[tokio::main]
async fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    info!("Launching chat server...");

    let config = ServerConfig::load().unwrap_or_else(|e| fail(e.into()));
    let server = Server::bind(&config).await.unwrap_or_else(|e| fail(e));
    let hub = server.hub();

    let mut accept_loop = tokio::spawn(server.run());

    let finished = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                warn!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown requested");
            None
        }
        result = &mut accept_loop => Some(result),
    };

    hub.shutdown().await;

    let result = match finished {
        Some(result) => result,
        None => accept_loop.await,
    };
    if let Err(e) = result {
        warn!("Accept loop ended abnormally: {}", e);
    }
}

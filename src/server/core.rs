use log::{error, info, warn};
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};

use crate::client::ConnectionHandler;
use crate::config::ServerConfig;
use crate::error::ChatServerError;
use crate::server::Hub;

/// Listening side of the chat service.
pub struct Server {
    listener: TcpListener,
    hub: Hub,
}

impl Server {
    /// Binds the listening socket. Bind failure is fatal to startup.
    pub async fn bind(config: &ServerConfig) -> Result<Self, ChatServerError> {
        let addr = config.socket_addr();

        let listener = match TcpListener::bind(&addr).await {
            Ok(listener) => listener,
            Err(source) => {
                error!("Failed to bind to {}: {}", addr, source);
                return Err(ChatServerError::Bind { addr, source });
            }
        };

        info!("Server bound to {}", addr);

        Ok(Self {
            listener,
            hub: Hub::new(),
        })
    }

    /// Actual bound address; useful when configured with port 0.
    pub fn local_addr(&self) -> Result<SocketAddr, ChatServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle used to broadcast to, inspect or shut down this server.
    pub fn hub(&self) -> Hub {
        self.hub.clone()
    }

    /// Accepts connections until the hub is shut down or the listener fails.
    ///
    /// The listening socket is closed when this returns.
    pub async fn run(self) {
        let Server { listener, hub } = self;

        if let Ok(addr) = listener.local_addr() {
            info!("Starting RAX chat server on {}", addr);
        }

        loop {
            tokio::select! {
                _ = hub.stopped() => {
                    info!("Accept loop stopping");
                    break;
                }

                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => handle_new_client(&hub, stream, addr).await,
                        Err(e) => {
                            error!("Error accepting connection: {}", e);
                            hub.shutdown().await;
                            break;
                        }
                    }
                }
            }
        }

        drop(listener);
        info!("Listener closed");
    }
}

/// Registers the connection and spawns its handler so the accept loop
/// never waits on a client's lifetime.
async fn handle_new_client(hub: &Hub, stream: TcpStream, addr: SocketAddr) {
    let (read_half, write_half) = stream.into_split();

    let Some(session) = hub.register(addr.to_string(), write_half).await else {
        warn!("Rejected connection from {}: server is stopping", addr);
        return;
    };

    info!("Accepted connection from {} (session {})", addr, session.id());

    let handler = ConnectionHandler::new(session, read_half, hub.clone());
    tokio::spawn(handler.run());
}

use log::info;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use crate::client::ClientSession;
use crate::error::SessionError;
use crate::error::handlers::handle_session_error;
use crate::protocol::responses;
use crate::protocol::{Command, parse_command, strip_line_ending};
use crate::server::Hub;

/// Drives one client's session on its own task.
///
/// - Prompts for a name and announces the join.
/// - Reads command lines and dispatches them.
/// - Calls back into the `Hub` for broadcasts.
pub struct ConnectionHandler<R> {
    session: Arc<ClientSession>,
    reader: BufReader<R>,
    hub: Hub,
}

impl<R> ConnectionHandler<R>
where
    R: AsyncRead + Unpin,
{
    pub fn new(session: Arc<ClientSession>, reader: R, hub: Hub) -> Self {
        Self {
            session,
            reader: BufReader::new(reader),
            hub,
        }
    }

    /// Runs until the peer quits, disconnects, errors, or the session is closed.
    ///
    /// The session is always shut down and unregistered on return.
    pub async fn run(mut self) {
        if let Err(e) = self.serve().await {
            handle_session_error(self.session.peer(), &e);
        }

        self.session.shutdown();
        self.hub.unregister(self.session.id()).await;
        info!(
            "Client {} (session {}) disconnected",
            self.session.peer(),
            self.session.id()
        );
    }

    async fn serve(&mut self) -> Result<(), SessionError> {
        self.session.send_message(responses::NAME_PROMPT);

        let name = self.read_line().await?;
        info!("{} has connected.", name);
        self.session.set_name(name.as_str()).await;
        self.hub.broadcast(&responses::joined(&name)).await;

        loop {
            let line = self.read_line().await?;

            match parse_command(&line) {
                Command::Nick(Some(new_name)) => self.change_nick(new_name).await,
                Command::Nick(None) => {
                    self.session.send_message(responses::NO_NICKNAME);
                }
                Command::Quit => {
                    let name = self.session.display_name().await;
                    self.hub
                        .broadcast_except(&responses::left(&name), self.session.id())
                        .await;
                    info!("{} left the chat", name);
                    return Ok(());
                }
                Command::Message(text) => {
                    let name = self.session.display_name().await;
                    self.hub
                        .broadcast_except(&responses::chat(&name, &text), self.session.id())
                        .await;
                }
            }
        }
    }

    async fn change_nick(&self, new_name: String) {
        let old_name = self.session.display_name().await;
        self.hub
            .broadcast(&responses::nick_changed(&old_name, &new_name))
            .await;
        self.session.set_name(new_name.as_str()).await;
        self.session
            .send_message(&responses::nick_confirmed(&new_name));
        info!("{} is now known as {}", old_name, new_name);
    }

    /// Reads one line without its line ending. Invalid UTF-8 is replaced
    /// rather than treated as a transport failure.
    ///
    /// Fails with `Disconnected` at end of stream and `Closed` once the
    /// session has been shut down from elsewhere.
    async fn read_line(&mut self) -> Result<String, SessionError> {
        let mut buf = Vec::new();

        let read = tokio::select! {
            result = self.reader.read_until(b'\n', &mut buf) => result?,
            _ = self.session.closed() => return Err(SessionError::Closed),
        };

        if read == 0 {
            return Err(SessionError::Disconnected);
        }

        let line = String::from_utf8_lossy(&buf);
        Ok(strip_line_ending(&line).to_string())
    }
}

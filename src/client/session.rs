//! Client session management
//!
//! One connected peer: its name, a queued outbound write path and the
//! close signal observed by the session's read loop.

use log::debug;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{RwLock, mpsc, watch};

/// Identifier assigned to each accepted connection, in accept order.
pub type SessionId = u64;

/// Work item for a session's writer task.
enum Outgoing {
    Line(String),
    Close,
}

/// Live connection state of one chat client.
///
/// Every line is queued to a writer task owned by the session, so callers
/// never wait on the peer's socket and lines reach the peer whole and in
/// the order they were queued.
pub struct ClientSession {
    id: SessionId,
    peer: String,
    name: RwLock<Option<String>>,
    outbound: mpsc::UnboundedSender<Outgoing>,
    closed: watch::Sender<bool>,
}

impl ClientSession {
    /// Creates the session and spawns its writer task. Must be called
    /// inside a tokio runtime.
    pub fn new<W>(id: SessionId, peer: impl Into<String>, writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let peer = peer.into();
        let (outbound, queue) = mpsc::unbounded_channel();
        let (closed, _) = watch::channel(false);

        tokio::spawn(write_loop(id, peer.clone(), writer, queue));

        Self {
            id,
            peer,
            name: RwLock::new(None),
            outbound,
            closed,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Remote address (or other label) used in log lines
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Returns the chosen name, or `None` before the first line was read.
    pub async fn name(&self) -> Option<String> {
        self.name.read().await.clone()
    }

    /// Name used when formatting chat lines; empty while unset.
    pub async fn display_name(&self) -> String {
        self.name().await.unwrap_or_default()
    }

    pub async fn set_name(&self, name: impl Into<String>) {
        *self.name.write().await = Some(name.into());
    }

    /// Queues `text` as one line for this peer.
    ///
    /// Returns whether the line was queued. A closed session or a writer that
    /// already failed makes this a no-op, so a vanished peer cannot abort a
    /// broadcast.
    pub fn send_message(&self, text: &str) -> bool {
        if self.is_closed() {
            return false;
        }
        self.outbound.send(Outgoing::Line(text.to_string())).is_ok()
    }

    /// Closes the session: signals the read loop, then lets the writer flush
    /// what is already queued and shut the write side.
    ///
    /// Idempotent and callable from any task.
    pub fn shutdown(&self) {
        if self.closed.send_replace(true) {
            return;
        }
        let _ = self.outbound.send(Outgoing::Close);
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Resolves once `shutdown` has been called.
    pub async fn closed(&self) {
        let mut rx = self.closed.subscribe();
        let _ = rx.wait_for(|closed| *closed).await;
    }
}

/// Drains the session queue into the socket until closed or a write fails.
async fn write_loop<W>(
    id: SessionId,
    peer: String,
    mut writer: W,
    mut queue: mpsc::UnboundedReceiver<Outgoing>,
) where
    W: AsyncWrite + Unpin,
{
    while let Some(item) = queue.recv().await {
        let text = match item {
            Outgoing::Line(text) => text,
            Outgoing::Close => break,
        };

        let line = format!("{}\n", text);
        let result = async {
            writer.write_all(line.as_bytes()).await?;
            writer.flush().await
        }
        .await;

        if let Err(e) = result {
            debug!("Failed to send to {} (session {}): {}", peer, id, e);
            return;
        }
    }

    if let Err(e) = writer.shutdown().await {
        debug!("Error closing session {}: {}", id, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::io::{AsyncBufReadExt, BufReader, duplex};
    use tokio::time::{sleep, timeout};

    #[tokio::test]
    async fn send_writes_one_line() {
        let (ours, theirs) = duplex(1024);
        let session = ClientSession::new(1, "test", ours);

        assert!(session.send_message("hello"));

        let mut lines = BufReader::new(theirs).lines();
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn shutdown_flushes_queue_then_closes() {
        let (ours, theirs) = duplex(1024);
        let session = ClientSession::new(2, "test", ours);

        assert!(session.send_message("last words"));
        session.shutdown();
        session.shutdown();

        assert!(session.is_closed());
        assert!(!session.send_message("late"));

        let mut lines = BufReader::new(theirs).lines();
        assert_eq!(
            lines.next_line().await.unwrap().as_deref(),
            Some("last words")
        );
        assert_eq!(lines.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn send_to_dropped_peer_is_tolerated() {
        let (ours, theirs) = duplex(64);
        let session = ClientSession::new(3, "test", ours);
        drop(theirs);

        session.send_message("anyone there?");

        // Once the writer has failed, sends report that nothing was queued
        timeout(Duration::from_secs(1), async {
            while session.send_message("still no") {
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("writer never gave up on the dropped peer");
    }

    #[tokio::test]
    async fn send_does_not_wait_for_a_stalled_reader() {
        let (ours, _unread) = duplex(8);
        let session = ClientSession::new(4, "test", ours);

        for i in 0..100 {
            assert!(session.send_message(&format!("line {i} that never gets read")));
        }
        session.shutdown();
        assert!(session.is_closed());
    }

    #[tokio::test]
    async fn closed_resolves_after_shutdown() {
        let (ours, _theirs) = duplex(64);
        let session = Arc::new(ClientSession::new(5, "test", ours));

        let waiter = {
            let session = session.clone();
            tokio::spawn(async move { session.closed().await })
        };
        session.shutdown();

        timeout(Duration::from_secs(1), waiter)
            .await
            .expect("closed() did not resolve")
            .unwrap();
    }

    #[tokio::test]
    async fn name_starts_unset() {
        let (ours, _theirs) = duplex(64);
        let session = ClientSession::new(6, "test", ours);
        assert_eq!(session.name().await, None);
        assert_eq!(session.display_name().await, "");

        session.set_name("Alice").await;
        assert_eq!(session.name().await.as_deref(), Some("Alice"));
    }
}

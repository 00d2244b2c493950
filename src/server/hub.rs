//! Broadcast hub
//!
//! Owns the session registry and the running flag. Cloned into every
//! connection handler so handlers can broadcast.

use log::{debug, info};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::io::AsyncWrite;
use tokio::sync::{Mutex, watch};

use crate::client::{ClientRegistry, ClientSession, SessionId};
use crate::protocol::responses;

struct HubState {
    registry: Mutex<ClientRegistry>,
    running: AtomicBool,
    stop: watch::Sender<bool>,
    next_id: AtomicU64,
}

/// Shared handle to the registry and broadcast operations.
#[derive(Clone)]
pub struct Hub {
    inner: Arc<HubState>,
}

impl Hub {
    pub fn new() -> Self {
        let (stop, _) = watch::channel(false);
        Self {
            inner: Arc::new(HubState {
                registry: Mutex::new(ClientRegistry::new()),
                running: AtomicBool::new(true),
                stop,
                next_id: AtomicU64::new(1),
            }),
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    /// Creates a session around `writer` and appends it to the registry.
    ///
    /// Returns `None` once the hub has stopped; the caller drops the connection.
    pub async fn register<W>(
        &self,
        peer: impl Into<String>,
        writer: W,
    ) -> Option<Arc<ClientSession>>
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let mut registry = self.inner.registry.lock().await;
        if !self.is_running() {
            return None;
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let session = Arc::new(ClientSession::new(id, peer, writer));
        registry.insert(Arc::clone(&session));
        debug!(
            "Registered session {} from {} ({} active)",
            id,
            session.peer(),
            registry.len()
        );
        Some(session)
    }

    pub async fn unregister(&self, id: SessionId) {
        let mut registry = self.inner.registry.lock().await;
        if registry.remove(id).is_some() {
            debug!("Unregistered session {} ({} active)", id, registry.len());
        }
    }

    pub async fn session_count(&self) -> usize {
        self.inner.registry.lock().await.len()
    }

    /// Sends `text` to every registered session.
    pub async fn broadcast(&self, text: &str) {
        self.fan_out(text, None).await;
    }

    /// Sends `text` to every registered session except `sender`.
    pub async fn broadcast_except(&self, text: &str, sender: SessionId) {
        self.fan_out(text, Some(sender)).await;
    }

    // Sends only queue onto each session's writer task, so a peer that
    // stops reading never holds up the caller or the other recipients.
    async fn fan_out(&self, text: &str, skip: Option<SessionId>) {
        let recipients = self.inner.registry.lock().await.snapshot();

        for session in recipients {
            if Some(session.id()) == skip || session.is_closed() {
                continue;
            }
            session.send_message(text);
        }
    }

    /// Stops accepting, tells every session the server is going away and
    /// closes it. Repeated calls return immediately.
    pub async fn shutdown(&self) {
        if !self.inner.running.swap(false, Ordering::SeqCst) {
            debug!("Shutdown already in progress");
            return;
        }

        info!("Shutting down chat server");
        self.inner.stop.send_replace(true);

        let sessions = self.inner.registry.lock().await.drain();
        let count = sessions.len();
        for session in sessions {
            session.send_message(responses::SERVER_SHUTTING_DOWN);
            session.shutdown();
        }

        info!("Chat server stopped ({} sessions closed)", count);
    }

    /// Resolves once `shutdown` has been requested.
    pub async fn stopped(&self) {
        let mut rx = self.inner.stop.subscribe();
        let _ = rx.wait_for(|stopped| *stopped).await;
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncBufReadExt, BufReader, DuplexStream, Lines, duplex};
    use tokio::time::timeout;

    async fn join(hub: &Hub) -> (Arc<ClientSession>, Lines<BufReader<DuplexStream>>) {
        let (ours, theirs) = duplex(4096);
        let session = hub.register("test", ours).await.unwrap();
        (session, BufReader::new(theirs).lines())
    }

    #[tokio::test]
    async fn broadcast_reaches_everyone() {
        let hub = Hub::new();
        let (_a, mut a_rx) = join(&hub).await;
        let (_b, mut b_rx) = join(&hub).await;

        hub.broadcast("hello").await;

        assert_eq!(a_rx.next_line().await.unwrap().as_deref(), Some("hello"));
        assert_eq!(b_rx.next_line().await.unwrap().as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn broadcast_except_skips_sender() {
        let hub = Hub::new();
        let (a, mut a_rx) = join(&hub).await;
        let (_b, mut b_rx) = join(&hub).await;

        hub.broadcast_except("from a", a.id()).await;
        hub.broadcast("marker").await;

        assert_eq!(b_rx.next_line().await.unwrap().as_deref(), Some("from a"));
        assert_eq!(a_rx.next_line().await.unwrap().as_deref(), Some("marker"));
    }

    #[tokio::test]
    async fn broadcast_survives_vanished_peer() {
        let hub = Hub::new();
        let (_gone, gone_rx) = join(&hub).await;
        let (_b, mut b_rx) = join(&hub).await;
        drop(gone_rx);

        hub.broadcast("still here").await;

        assert_eq!(b_rx.next_line().await.unwrap().as_deref(), Some("still here"));
    }

    #[tokio::test]
    async fn shutdown_notifies_once_and_is_idempotent() {
        let hub = Hub::new();
        let (a, mut a_rx) = join(&hub).await;

        hub.shutdown().await;
        hub.shutdown().await;

        assert!(!hub.is_running());
        assert!(a.is_closed());
        assert_eq!(hub.session_count().await, 0);
        assert_eq!(
            a_rx.next_line().await.unwrap().as_deref(),
            Some(responses::SERVER_SHUTTING_DOWN)
        );
        assert_eq!(a_rx.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn stalled_peer_does_not_block_broadcast_or_shutdown() {
        let hub = Hub::new();
        let (stalled, _unread) = duplex(8);
        hub.register("stalled", stalled).await.unwrap();
        let (_healthy, mut healthy_rx) = join(&hub).await;

        let long = "x".repeat(256);
        timeout(Duration::from_secs(2), async {
            for _ in 0..20 {
                hub.broadcast(&long).await;
            }
        })
        .await
        .expect("broadcast blocked on a stalled peer");

        timeout(Duration::from_secs(2), hub.shutdown())
            .await
            .expect("shutdown blocked on a stalled peer");

        for _ in 0..20 {
            let line = healthy_rx.next_line().await.unwrap();
            assert_eq!(line.as_deref(), Some(long.as_str()));
        }
        assert_eq!(
            healthy_rx.next_line().await.unwrap().as_deref(),
            Some(responses::SERVER_SHUTTING_DOWN)
        );
        assert_eq!(healthy_rx.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn register_refused_after_shutdown() {
        let hub = Hub::new();
        hub.shutdown().await;

        let (ours, _theirs) = duplex(64);
        assert!(hub.register("late", ours).await.is_none());
    }

    #[tokio::test]
    async fn unregister_removes_session() {
        let hub = Hub::new();
        let (a, _a_rx) = join(&hub).await;
        assert_eq!(hub.session_count().await, 1);

        hub.unregister(a.id()).await;
        assert_eq!(hub.session_count().await, 0);
    }
}

//! Client registry
//!
//! Insertion-ordered collection of the sessions that receive broadcasts.

use std::sync::Arc;

use crate::client::{ClientSession, SessionId};

/// Registry of active sessions, in accept order
pub struct ClientRegistry {
    sessions: Vec<Arc<ClientSession>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self {
            sessions: Vec::new(),
        }
    }

    pub fn insert(&mut self, session: Arc<ClientSession>) {
        self.sessions.push(session);
    }

    pub fn remove(&mut self, id: SessionId) -> Option<Arc<ClientSession>> {
        let index = self.sessions.iter().position(|s| s.id() == id)?;
        Some(self.sessions.remove(index))
    }

    /// Clones the current entries so they can be used without holding the lock.
    pub fn snapshot(&self) -> Vec<Arc<ClientSession>> {
        self.sessions.clone()
    }

    /// Removes and returns every entry.
    pub fn drain(&mut self) -> Vec<Arc<ClientSession>> {
        std::mem::take(&mut self.sessions)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}

//! Session storage.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::Result;
use crate::session::Session;

/// Keyed by chat id. At most one session per chat.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, chat_id: &str) -> Result<Option<Session>>;
    /// Inserts or replaces the session for `session.chat_id`.
    async fn insert(&self, session: Session) -> Result<()>;
    async fn remove(&self, chat_id: &str) -> Result<Option<Session>>;
    async fn list(&self) -> Result<Vec<Session>>;
}

/// Process-local store; sessions are lost on restart.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn clear(&self) {
        self.sessions.write().await.clear();
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, chat_id: &str) -> Result<Option<Session>> {
        Ok(self.sessions.read().await.get(chat_id).cloned())
    }

    async fn insert(&self, session: Session) -> Result<()> {
        debug!(chat_id = %session.chat_id, state = %session.state, "store: insert");
        self.sessions
            .write()
            .await
            .insert(session.chat_id.clone(), session);
        Ok(())
    }

    async fn remove(&self, chat_id: &str) -> Result<Option<Session>> {
        debug!(chat_id = %chat_id, "store: remove");
        Ok(self.sessions.write().await.remove(chat_id))
    }

    async fn list(&self) -> Result<Vec<Session>> {
        Ok(self.sessions.read().await.values().cloned().collect())
    }
}

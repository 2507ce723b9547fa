//! In-memory session store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use hookbot_models::{ChatKey, Session};

use crate::error::Result;
use crate::store::SessionStore;

/// Session store backed by a map in process memory.
///
/// Sessions are lost when the process exits.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<ChatKey, Session>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Returns true if no sessions are stored.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, chat: ChatKey) -> Result<Option<Session>> {
        Ok(self.sessions.read().await.get(&chat).cloned())
    }

    async fn put(&self, chat: ChatKey, session: &Session) -> Result<()> {
        self.sessions.write().await.insert(chat, session.clone());
        Ok(())
    }

    async fn delete(&self, chat: ChatKey) -> Result<()> {
        self.sessions.write().await.remove(&chat);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

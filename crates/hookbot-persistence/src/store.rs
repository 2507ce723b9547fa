//! SessionStore trait definition.
//!
//! The onboarding flow only ever needs three operations on its per-chat
//! record, so the contract is deliberately small. Implementations must be
//! shareable across tasks; a handler reads, mutates and writes back one
//! chat's record within a single update, and last write wins.

use async_trait::async_trait;

use hookbot_models::{ChatKey, Session};

use crate::error::Result;

/// Keyed storage for onboarding sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads the session for `chat`, if any.
    async fn get(&self, chat: ChatKey) -> Result<Option<Session>>;

    /// Stores `session` for `chat`, replacing any existing record.
    async fn put(&self, chat: ChatKey, session: &Session) -> Result<()>;

    /// Removes the session for `chat`. Removing a missing record is not an
    /// error.
    async fn delete(&self, chat: ChatKey) -> Result<()>;

    /// Returns a short backend name for logging.
    fn backend_name(&self) -> &'static str;
}

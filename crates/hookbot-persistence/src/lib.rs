//! Session persistence for hookbot.
//!
//! Onboarding sessions live behind the [`SessionStore`] trait, a plain
//! get/put/delete contract keyed by chat. Two backends are provided:
//!
//! - [`FileSessionStore`]: one JSON file per chat, written atomically
//!   (write to temp file, then rename)
//! - [`MemorySessionStore`]: a map in process memory, for tests and
//!   throwaway deployments
//!
//! # Example
//!
//! ```no_run
//! use hookbot_models::{ChatKey, Session};
//! use hookbot_persistence::{FileSessionStore, SessionStore};
//!
//! # async fn demo() -> hookbot_persistence::Result<()> {
//! let store = FileSessionStore::new("/var/lib/hookbot/sessions");
//! store.put(ChatKey(42), &Session::new()).await?;
//! let loaded = store.get(ChatKey(42)).await?;
//! assert!(loaded.is_some());
//! # Ok(())
//! # }
//! ```

pub mod atomic;
pub mod error;
pub mod file_store;
pub mod memory_store;
pub mod store;

pub use error::{PersistenceError, Result};
pub use file_store::FileSessionStore;
pub use memory_store::MemorySessionStore;
pub use store::SessionStore;

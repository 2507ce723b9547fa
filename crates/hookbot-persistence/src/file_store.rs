//! File-backed session store.

use std::fs;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use hookbot_models::{ChatKey, Session};

use crate::atomic::{atomic_write_json, read_json_optional, remove_if_exists};
use crate::error::{PersistenceError, Result};
use crate::store::SessionStore;

/// Session store keeping one JSON file per chat:
/// ```text
/// base_path/
/// ├── 12345.json
/// └── -100987.json
/// ```
pub struct FileSessionStore {
    base_path: PathBuf,
}

impl FileSessionStore {
    /// Creates a store rooted at `base_path`. The directory is created on
    /// first write.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Returns the directory sessions are kept in.
    pub fn base_path(&self) -> &std::path::Path {
        &self.base_path
    }

    /// Ensures the base directory exists.
    pub fn ensure_dir(&self) -> Result<()> {
        if !self.base_path.exists() {
            fs::create_dir_all(&self.base_path).map_err(|source| {
                PersistenceError::DirectoryError {
                    path: self.base_path.clone(),
                    source,
                }
            })?;
        }
        Ok(())
    }

    fn session_path(&self, chat: ChatKey) -> PathBuf {
        self.base_path.join(format!("{}.json", chat))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self, chat: ChatKey) -> Result<Option<Session>> {
        let path = self.session_path(chat);
        tokio::task::spawn_blocking(move || read_json_optional(&path)).await?
    }

    async fn put(&self, chat: ChatKey, session: &Session) -> Result<()> {
        let path = self.session_path(chat);
        let record = session.clone();
        tokio::task::spawn_blocking(move || atomic_write_json(&path, &record)).await??;
        debug!(chat_id = %chat, step = %session.step, "Saved session");
        Ok(())
    }

    async fn delete(&self, chat: ChatKey) -> Result<()> {
        let path = self.session_path(chat);
        if tokio::task::spawn_blocking(move || remove_if_exists(&path)).await?? {
            debug!(chat_id = %chat, "Deleted session");
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookbot_models::{OrderId, Step};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_put_and_get() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());

        let mut session = Session::new();
        session.record_answer("SAVE10").unwrap();
        store.put(ChatKey(12345), &session).await.unwrap();

        assert!(dir.path().join("12345.json").exists());
        let loaded = store.get(ChatKey(12345)).await.unwrap().unwrap();
        assert_eq!(loaded, session);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("not-created-yet"));

        assert!(store.get(ChatKey(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());

        store.put(ChatKey(-100987), &Session::new()).await.unwrap();
        assert!(dir.path().join("-100987.json").exists());

        store.delete(ChatKey(-100987)).await.unwrap();
        assert!(store.get(ChatKey(-100987)).await.unwrap().is_none());

        // Deleting twice is fine.
        store.delete(ChatKey(-100987)).await.unwrap();
    }

    #[tokio::test]
    async fn test_sealed_password_not_on_disk() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());

        let mut session = Session::new();
        for answer in ["SAVE10", "ab@x.com", "hunter22", "John Doe"] {
            session.record_answer(answer).unwrap();
        }
        session.assign_order(OrderId::from("O1")).unwrap();
        session.seal_password("h******2");
        store.put(ChatKey(5), &session).await.unwrap();

        let raw = fs::read_to_string(dir.path().join("5.json")).unwrap();
        assert!(!raw.contains("hunter22"));

        let loaded = store.get(ChatKey(5)).await.unwrap().unwrap();
        assert_eq!(loaded.step, Step::Code);
        assert_eq!(loaded.password_mask.as_deref(), Some("h******2"));
    }

    #[tokio::test]
    async fn test_corrupt_record_is_an_error() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());
        fs::write(dir.path().join("9.json"), "{").unwrap();

        assert!(store.get(ChatKey(9)).await.is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_chats_on_worker_threads() {
        let dir = tempdir().unwrap();
        let store = std::sync::Arc::new(FileSessionStore::new(dir.path()));

        let mut tasks = Vec::new();
        for chat in 0..16 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                let mut session = Session::new();
                session.record_answer(format!("CODE{}", chat)).unwrap();
                store.put(ChatKey(chat), &session).await.unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        for chat in 0..16 {
            let loaded = store.get(ChatKey(chat)).await.unwrap().unwrap();
            assert_eq!(loaded.coupon, Some(format!("CODE{}", chat)));
        }
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 16);
    }

    #[test]
    fn test_ensure_dir() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("a/b"));
        store.ensure_dir().unwrap();
        assert!(store.base_path().is_dir());
    }
}

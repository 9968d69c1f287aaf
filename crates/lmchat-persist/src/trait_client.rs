use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lmchat_types::MessagePage;

use crate::error::Result;
use crate::models::{DBMessage, NewMessage, NewThread, Thread, ThreadPatch};

/// Append-only store of chat messages, keyed by thread
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Append a message; the returned copy carries the assigned id and timestamp
    async fn append_message(&self, message: NewMessage) -> Result<DBMessage>;

    /// Page of a thread's messages, newest first.
    ///
    /// Only messages strictly older than `before` are returned. `has_more`
    /// is exact: implementations over-fetch one row to decide it.
    async fn query_page(
        &self,
        thread_id: &str,
        before: Option<DateTime<Utc>>,
        limit: usize,
    ) -> Result<MessagePage<DBMessage>>;

    /// Most recent `limit` messages of a thread, oldest first
    async fn latest_messages(&self, thread_id: &str, limit: usize) -> Result<Vec<DBMessage>> {
        let mut messages = self.query_page(thread_id, None, limit).await?.items;
        messages.reverse();
        Ok(messages)
    }

    /// Delete every message of a thread, returning how many were removed
    async fn delete_messages(&self, thread_id: &str) -> Result<u64>;
}

/// Store of thread metadata and rolling memory
#[async_trait]
pub trait ThreadStore: Send + Sync {
    async fn create_thread(&self, thread: NewThread) -> Result<Thread>;

    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>>;

    /// Threads ordered by most recent activity
    async fn list_threads(&self, limit: Option<i64>, skip: Option<u64>) -> Result<Vec<Thread>>;

    /// Apply a patch and bump `updated_at`; fails with `ThreadNotFound`
    async fn update_thread(&self, thread_id: &str, patch: ThreadPatch) -> Result<Thread>;

    /// Append one memory entry and keep only the newest `capacity` entries.
    ///
    /// Must be a single atomic write that also bumps `updated_at`, so two
    /// exchanges finishing together cannot drop each other's entry.
    async fn push_memory(&self, thread_id: &str, entry: String, capacity: usize) -> Result<Vec<String>>;

    /// Returns whether a thread was removed
    async fn delete_thread(&self, thread_id: &str) -> Result<bool>;

    /// Cheap round trip used by health checks
    async fn ping(&self) -> Result<()>;
}

/// Both stores behind one handle
pub trait PersistenceClient: MessageStore + ThreadStore {}

impl<T: MessageStore + ThreadStore> PersistenceClient for T {}

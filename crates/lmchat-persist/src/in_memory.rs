use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lmchat_types::{now_millis, MessagePage};
use tokio::sync::RwLock;

use crate::error::{PersistError, Result};
use crate::models::{DBMessage, NewMessage, NewThread, Thread, ThreadPatch};
use crate::trait_client::{MessageStore, ThreadStore};

/// Process-local store for development and tests
///
/// Messages of a thread are kept in insertion order, which doubles as the
/// tie-breaker for equal timestamps.
#[derive(Default)]
pub struct InMemoryPersistenceClient {
    threads: RwLock<HashMap<String, Thread>>,
    messages: RwLock<HashMap<String, Vec<DBMessage>>>,
}

impl InMemoryPersistenceClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn new_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

#[async_trait]
impl MessageStore for InMemoryPersistenceClient {
    async fn append_message(&self, message: NewMessage) -> Result<DBMessage> {
        let stored = message.into_message(Self::new_id(), now_millis());
        let mut messages = self.messages.write().await;
        messages
            .entry(stored.thread_id.clone())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn query_page(
        &self,
        thread_id: &str,
        before: Option<DateTime<Utc>>,
        limit: usize,
    ) -> Result<MessagePage<DBMessage>> {
        let messages = self.messages.read().await;
        let Some(thread_messages) = messages.get(thread_id) else {
            return Ok(MessagePage::empty());
        };

        let mut ordered: Vec<&DBMessage> = thread_messages
            .iter()
            .filter(|m| before.map_or(true, |b| m.created_at < b))
            .collect();
        // stable sort keeps insertion order for equal timestamps
        ordered.sort_by_key(|m| m.created_at);

        let rows: Vec<DBMessage> = ordered
            .into_iter()
            .rev()
            .take(limit + 1)
            .cloned()
            .collect();

        Ok(MessagePage::from_probe(rows, limit))
    }

    async fn delete_messages(&self, thread_id: &str) -> Result<u64> {
        let mut messages = self.messages.write().await;
        Ok(messages.remove(thread_id).map_or(0, |m| m.len() as u64))
    }
}

#[async_trait]
impl ThreadStore for InMemoryPersistenceClient {
    async fn create_thread(&self, thread: NewThread) -> Result<Thread> {
        let thread = thread.into_thread(Self::new_id(), now_millis());
        self.threads
            .write()
            .await
            .insert(thread.id.clone(), thread.clone());
        Ok(thread)
    }

    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>> {
        Ok(self.threads.read().await.get(thread_id).cloned())
    }

    async fn list_threads(&self, limit: Option<i64>, skip: Option<u64>) -> Result<Vec<Thread>> {
        let threads = self.threads.read().await;
        let mut all: Vec<Thread> = threads.values().cloned().collect();
        all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        let skip = skip.unwrap_or(0) as usize;
        let limit = limit.map_or(usize::MAX, |l| l.max(0) as usize);
        Ok(all.into_iter().skip(skip).take(limit).collect())
    }

    async fn update_thread(&self, thread_id: &str, patch: ThreadPatch) -> Result<Thread> {
        let mut threads = self.threads.write().await;
        let thread = threads
            .get_mut(thread_id)
            .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_string()))?;
        patch.apply(thread, now_millis());
        Ok(thread.clone())
    }

    async fn push_memory(&self, thread_id: &str, entry: String, capacity: usize) -> Result<Vec<String>> {
        // the write lock makes append-and-trim one atomic step
        let mut threads = self.threads.write().await;
        let thread = threads
            .get_mut(thread_id)
            .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_string()))?;

        thread.memory.push(entry);
        let overflow = thread.memory.len().saturating_sub(capacity);
        thread.memory.drain(..overflow);
        thread.updated_at = now_millis();
        Ok(thread.memory.clone())
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<bool> {
        Ok(self.threads.write().await.remove(thread_id).is_some())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

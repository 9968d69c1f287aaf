use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lmchat_types::MessagePage;
use mongodb::{bson::doc, bson::oid::ObjectId, Client, Database};

use crate::dbs::mongo::models::{parse_object_id, MongoMessage};
use crate::dbs::mongo::repositories::{MongoMessageRepository, MongoThreadRepository};
use crate::error::{PersistError, Result};
use crate::models::{DBMessage, NewMessage, NewThread, Thread, ThreadPatch};
use crate::trait_client::{MessageStore, ThreadStore};

pub struct MongoPersistenceClient {
    database: Database,
    message_repo: MongoMessageRepository,
    thread_repo: MongoThreadRepository,
}

impl MongoPersistenceClient {
    /// Connect to MongoDB and create client
    pub async fn connect(mongodb_uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        let database = client.database(database);
        let message_repo = MongoMessageRepository::new(&database);
        let thread_repo = MongoThreadRepository::new(&database);

        Ok(Self {
            database,
            message_repo,
            thread_repo,
        })
    }

    /// Create the indexes the page and list queries rely on
    pub async fn ensure_indexes(&self) -> Result<()> {
        self.message_repo.ensure_indexes().await?;
        self.thread_repo.ensure_indexes().await?;
        tracing::debug!(database = %self.database.name(), "MongoDB indexes ensured");
        Ok(())
    }
}

#[async_trait]
impl MessageStore for MongoPersistenceClient {
    async fn append_message(&self, message: NewMessage) -> Result<DBMessage> {
        let message = MongoMessage {
            id: ObjectId::new(),
            thread_id: parse_object_id(&message.thread_id)?,
            sender: message.sender,
            content: message.content,
            raw: message.raw,
            created_at: lmchat_types::now_millis(),
        };
        self.message_repo.save_message(&message).await?;
        Ok(message.into())
    }

    async fn query_page(
        &self,
        thread_id: &str,
        before: Option<DateTime<Utc>>,
        limit: usize,
    ) -> Result<MessagePage<DBMessage>> {
        let object_id = parse_object_id(thread_id)?;
        let probe = i64::try_from(limit.saturating_add(1)).unwrap_or(i64::MAX);

        let rows = self.message_repo.find_page(object_id, before, probe).await?;
        let rows: Vec<DBMessage> = rows.into_iter().map(Into::into).collect();
        Ok(MessagePage::from_probe(rows, limit))
    }

    async fn delete_messages(&self, thread_id: &str) -> Result<u64> {
        let object_id = parse_object_id(thread_id)?;
        self.message_repo.delete_for_thread(object_id).await
    }
}

#[async_trait]
impl ThreadStore for MongoPersistenceClient {
    async fn create_thread(&self, thread: NewThread) -> Result<Thread> {
        let mongo_thread = self.thread_repo.create_thread(thread).await?;
        Ok(mongo_thread.into())
    }

    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>> {
        let object_id = parse_object_id(thread_id)?;
        let mongo_thread = self.thread_repo.get_thread(object_id).await?;
        Ok(mongo_thread.map(Into::into))
    }

    async fn list_threads(&self, limit: Option<i64>, skip: Option<u64>) -> Result<Vec<Thread>> {
        let mongo_threads = self.thread_repo.list_threads(limit, skip).await?;
        Ok(mongo_threads.into_iter().map(Into::into).collect())
    }

    async fn update_thread(&self, thread_id: &str, patch: ThreadPatch) -> Result<Thread> {
        let object_id = parse_object_id(thread_id)?;
        self.thread_repo
            .update_thread(object_id, patch)
            .await?
            .map(Into::into)
            .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_string()))
    }

    async fn push_memory(&self, thread_id: &str, entry: String, capacity: usize) -> Result<Vec<String>> {
        let object_id = parse_object_id(thread_id)?;
        self.thread_repo
            .push_memory(object_id, entry, capacity)
            .await?
            .map(|t| t.memory)
            .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_string()))
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<bool> {
        let object_id = parse_object_id(thread_id)?;
        self.thread_repo.delete_thread(object_id).await
    }

    async fn ping(&self) -> Result<()> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}

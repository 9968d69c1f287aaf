use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{bson::doc, bson::oid::ObjectId, Collection, Database, IndexModel};

use crate::dbs::mongo::models::MongoMessage;
use crate::error::Result;

#[derive(Clone)]
pub struct MongoMessageRepository {
    collection: Collection<MongoMessage>,
}

impl MongoMessageRepository {
    pub fn new(database: &Database) -> Self {
        let collection = database.collection("messages");
        Self { collection }
    }

    /// Index backing the per-thread, newest-first page query
    pub async fn ensure_indexes(&self) -> Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "thread_id": 1, "created_at": -1, "_id": -1 })
            .build();
        self.collection.create_index(index).await?;
        Ok(())
    }

    /// Save a single message
    pub async fn save_message(&self, message: &MongoMessage) -> Result<ObjectId> {
        self.collection.insert_one(message).await?;
        Ok(message.id)
    }

    /// Up to `limit` messages older than `before`, newest first.
    /// `_id` breaks timestamp ties in insertion order.
    pub async fn find_page(
        &self,
        thread_id: ObjectId,
        before: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<MongoMessage>> {
        let mut filter = doc! { "thread_id": thread_id };
        if let Some(before) = before {
            filter.insert("created_at", doc! { "$lt": bson::DateTime::from_chrono(before) });
        }

        let messages = self.collection
            .find(filter)
            .sort(doc! { "created_at": -1, "_id": -1 })
            .limit(limit)
            .await?
            .try_collect()
            .await?;
        Ok(messages)
    }

    /// Delete every message of a thread
    pub async fn delete_for_thread(&self, thread_id: ObjectId) -> Result<u64> {
        let result = self.collection
            .delete_many(doc! { "thread_id": thread_id })
            .await?;
        Ok(result.deleted_count)
    }
}

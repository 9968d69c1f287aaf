use futures::TryStreamExt;
use mongodb::options::ReturnDocument;
use mongodb::{bson, bson::doc, bson::oid::ObjectId, Collection, Database, IndexModel};

use crate::dbs::mongo::models::MongoThread;
use crate::error::Result;
use crate::models::{NewThread, ThreadPatch};

#[derive(Clone)]
pub struct MongoThreadRepository {
    collection: Collection<MongoThread>,
}

impl MongoThreadRepository {
    pub fn new(database: &Database) -> Self {
        let collection = database.collection("threads");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "updated_at": -1 })
            .build();
        self.collection.create_index(index).await?;
        Ok(())
    }

    /// Create a new thread
    pub async fn create_thread(&self, thread: NewThread) -> Result<MongoThread> {
        let now = lmchat_types::now_millis();
        let thread = MongoThread {
            id: ObjectId::new(),
            title: thread.title,
            model: thread.model,
            temperature: thread.temperature,
            memory: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        self.collection.insert_one(&thread).await?;
        Ok(thread)
    }

    /// Get thread by ID
    pub async fn get_thread(&self, thread_id: ObjectId) -> Result<Option<MongoThread>> {
        let filter = doc! { "_id": thread_id };
        Ok(self.collection.find_one(filter).await?)
    }

    /// List threads, most recently updated first
    pub async fn list_threads(
        &self,
        limit: Option<i64>,
        skip: Option<u64>,
    ) -> Result<Vec<MongoThread>> {
        let mut find_opts = self.collection
            .find(doc! {})
            .sort(doc! { "updated_at": -1 });

        if let Some(limit) = limit {
            find_opts = find_opts.limit(limit);
        }
        if let Some(skip) = skip {
            find_opts = find_opts.skip(skip);
        }

        let threads = find_opts
            .await?
            .try_collect()
            .await?;
        Ok(threads)
    }

    /// Apply a patch, returning the updated thread (None if missing)
    pub async fn update_thread(
        &self,
        thread_id: ObjectId,
        patch: ThreadPatch,
    ) -> Result<Option<MongoThread>> {
        let mut set = doc! { "updated_at": bson::DateTime::now() };
        if let Some(title) = patch.title {
            set.insert("title", title);
        }
        if let Some(memory) = patch.memory {
            set.insert("memory", bson::to_bson(&memory)?);
        }

        let updated = self.collection
            .find_one_and_update(doc! { "_id": thread_id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?;
        Ok(updated)
    }

    /// Server-side append-and-trim of the rolling memory
    pub async fn push_memory(
        &self,
        thread_id: ObjectId,
        entry: String,
        capacity: usize,
    ) -> Result<Option<MongoThread>> {
        let slice = -(capacity.min(i32::MAX as usize) as i32);
        let update = doc! {
            "$push": { "memory": { "$each": [entry], "$slice": slice } },
            "$set": { "updated_at": bson::DateTime::now() }
        };

        let updated = self.collection
            .find_one_and_update(doc! { "_id": thread_id }, update)
            .return_document(ReturnDocument::After)
            .await?;
        Ok(updated)
    }

    /// Delete thread
    pub async fn delete_thread(&self, thread_id: ObjectId) -> Result<bool> {
        let filter = doc! { "_id": thread_id };
        let result = self.collection.delete_one(filter).await?;
        Ok(result.deleted_count > 0)
    }
}

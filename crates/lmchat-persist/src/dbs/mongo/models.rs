use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use lmchat_types::Sender;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::error::{PersistError, Result};
use crate::models::{DBMessage, Thread};

/// MongoDB-specific Message model (uses ObjectId)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMessage {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub thread_id: ObjectId,
    pub sender: Sender,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// MongoDB-specific Thread model (uses ObjectId)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoThread {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub model: String,
    pub temperature: f32,
    #[serde(default)]
    pub memory: Vec<String>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

/// Parse a hex id coming from the API
pub(crate) fn parse_object_id(id: &str) -> Result<ObjectId> {
    ObjectId::parse_str(id).map_err(|e| PersistError::InvalidId(format!("{}: {}", id, e)))
}

// Conversions between database-agnostic and MongoDB-specific models

impl From<MongoMessage> for DBMessage {
    fn from(msg: MongoMessage) -> Self {
        Self {
            id: msg.id.to_hex(),
            thread_id: msg.thread_id.to_hex(),
            sender: msg.sender,
            content: msg.content,
            raw: msg.raw,
            created_at: msg.created_at,
        }
    }
}

impl From<MongoThread> for Thread {
    fn from(thread: MongoThread) -> Self {
        Self {
            id: thread.id.to_hex(),
            title: thread.title,
            model: thread.model,
            temperature: thread.temperature,
            memory: thread.memory,
            created_at: thread.created_at,
            updated_at: thread.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object_id() {
        let oid = ObjectId::new();
        assert_eq!(parse_object_id(&oid.to_hex()).unwrap(), oid);
        assert!(matches!(parse_object_id("not-an-id"), Err(PersistError::InvalidId(_))));
    }

    #[test]
    fn test_message_roundtrips_through_bson() {
        let msg = MongoMessage {
            id: ObjectId::new(),
            thread_id: ObjectId::new(),
            sender: Sender::Assistant,
            content: "Hi".to_string(),
            raw: Some(serde_json::json!({ "id": "chatcmpl-1", "choices": [] })),
            created_at: lmchat_types::now_millis(),
        };

        let doc = bson::to_document(&msg).unwrap();
        assert!(matches!(doc.get("created_at"), Some(bson::Bson::DateTime(_))));
        assert_eq!(doc.get_str("sender").unwrap(), "assistant");

        let back: MongoMessage = bson::from_document(doc).unwrap();
        let db: DBMessage = back.into();
        assert_eq!(db.id, msg.id.to_hex());
        assert_eq!(db.created_at, msg.created_at);
        assert_eq!(db.raw, msg.raw);
    }
}

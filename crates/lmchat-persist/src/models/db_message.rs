use chrono::{DateTime, Utc};
use lmchat_types::{Identified, Sender};
use serde::{Deserialize, Serialize};

/// Database-agnostic message model
///
/// Messages are immutable once stored; order is `created_at`, then insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DBMessage {
    pub id: String,
    pub thread_id: String,
    pub sender: Sender,
    pub content: String,
    /// Upstream model response, assistant messages only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Message about to be appended; the store assigns id and timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub thread_id: String,
    pub sender: Sender,
    pub content: String,
    pub raw: Option<serde_json::Value>,
}

impl NewMessage {
    pub fn user(thread_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            sender: Sender::User,
            content: content.into(),
            raw: None,
        }
    }

    pub fn assistant(
        thread_id: impl Into<String>,
        content: impl Into<String>,
        raw: Option<serde_json::Value>,
    ) -> Self {
        Self {
            thread_id: thread_id.into(),
            sender: Sender::Assistant,
            content: content.into(),
            raw,
        }
    }

    /// Materialize with a store-assigned id and timestamp
    pub fn into_message(self, id: String, created_at: DateTime<Utc>) -> DBMessage {
        DBMessage {
            id,
            thread_id: self.thread_id,
            sender: self.sender,
            content: self.content,
            raw: self.raw,
            created_at,
        }
    }
}

impl Identified for DBMessage {
    fn id(&self) -> &str {
        &self.id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.created_at
    }
}

// Conversion: DBMessage → lmchat_llm::Message
impl From<&DBMessage> for lmchat_llm::Message {
    fn from(msg: &DBMessage) -> Self {
        match msg.sender {
            Sender::User => lmchat_llm::Message::human(msg.content.clone()),
            Sender::Assistant => lmchat_llm::Message::ai(msg.content.clone()),
        }
    }
}

impl From<DBMessage> for lmchat_types::SessionMessage {
    fn from(msg: DBMessage) -> Self {
        lmchat_types::SessionMessage::new(msg.id, msg.sender, msg.content, msg.created_at)
    }
}

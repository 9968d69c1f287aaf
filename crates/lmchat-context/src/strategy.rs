use async_trait::async_trait;
use lmchat_llm::Message;
use lmchat_persist::PersistenceClient;
use lmchat_types::Sender;
use serde::Serialize;

use crate::error::Result;

/// One trimmed history entry of a context window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextEntry {
    pub sender: Sender,
    pub content: String,
}

impl ContextEntry {
    pub fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            sender,
            content: content.into(),
        }
    }
}

impl From<ContextEntry> for Message {
    fn from(entry: ContextEntry) -> Self {
        match entry.sender {
            Sender::User => Message::human(entry.content),
            Sender::Assistant => Message::ai(entry.content),
        }
    }
}

/// Result of context retrieval
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextWindow {
    pub system_prompt: String,
    /// Oldest first
    pub history: Vec<ContextEntry>,
    pub model: String,
    pub temperature: f32,
}

impl ContextWindow {
    /// Ordered model input: the system message, then the history
    pub fn into_messages(self) -> Vec<Message> {
        std::iter::once(Message::system(self.system_prompt))
            .chain(self.history.into_iter().map(Message::from))
            .collect()
    }
}

/// Strategy for building the model input of one user turn
#[async_trait]
pub trait ContextStrategy: Send + Sync {
    /// Get context window for a conversation.
    ///
    /// `user_text` is the text submitted for this turn; it ends the history
    /// whether or not the caller has persisted it yet. Callers that stored it
    /// pass the stored row's id as `user_message_id`.
    async fn get_context_window(
        &self,
        thread_id: &str,
        user_text: &str,
        user_message_id: Option<&str>,
        store: &dyn PersistenceClient,
    ) -> Result<ContextWindow>;
}

//! Client-side projection of a conversation.
//!
//! A [`ChatSession`] is what a front end renders: a locally created
//! conversation that is bound to a persisted thread on first send, hydrated
//! from the message store on first activation and then extended page by page.
//! The thread and message stores stay the source of truth.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::paging::{compute_oldest, merge_page, Identified, Placement};
use crate::Sender;

const FALLBACK_TITLE: &str = "Conversation";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMessage {
    pub id: String,
    pub sender: Sender,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl SessionMessage {
    pub fn new(
        id: impl Into<String>,
        sender: Sender,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            sender,
            content: content.into(),
            timestamp,
        }
    }

    /// Optimistic message that has not been persisted yet
    pub fn local(sender: Sender, content: impl Into<String>) -> Self {
        Self::new(uuid::Uuid::new_v4().to_string(), sender, content, crate::now_millis())
    }
}

impl Identified for SessionMessage {
    fn id(&self) -> &str {
        &self.id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    pub title: String,
    pub messages: Vec<SessionMessage>,
    pub has_more: bool,
    pub oldest_timestamp: Option<DateTime<Utc>>,
    pub has_loaded_initial: bool,
}

impl ChatSession {
    /// Brand new local conversation; nothing to hydrate yet.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            thread_id: None,
            title: title.into(),
            messages: Vec::new(),
            has_more: false,
            oldest_timestamp: None,
            has_loaded_initial: true,
        }
    }

    /// Session for a thread that already exists in the store
    pub fn from_thread(thread_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            thread_id: Some(thread_id.into()),
            has_loaded_initial: false,
            ..Self::new(title)
        }
    }

    /// Bind to a persisted thread. An already bound session keeps its thread.
    pub fn bind_thread(&mut self, thread_id: impl Into<String>) -> &str {
        self.thread_id.get_or_insert_with(|| thread_id.into())
    }

    pub fn is_bound(&self) -> bool {
        self.thread_id.is_some()
    }

    /// Bound to a thread but the first page has not been fetched
    pub fn needs_initial_load(&self) -> bool {
        self.is_bound() && !self.has_loaded_initial
    }

    pub fn can_load_more(&self) -> bool {
        self.is_bound() && self.has_more
    }

    /// Give an untitled session a usable title
    pub fn ensure_title(&mut self) {
        if self.title.trim().is_empty() {
            self.title = FALLBACK_TITLE.to_string();
        }
    }

    /// Optimistically show a message before the store confirms it
    pub fn append_local(&mut self, message: SessionMessage) {
        if self.oldest_timestamp.is_none() {
            self.oldest_timestamp = Some(message.timestamp);
        }
        self.messages.push(message);
        self.has_loaded_initial = true;
    }

    /// Merge a page as returned by the message store (newest first).
    pub fn apply_page(&mut self, mut page_newest_first: Vec<SessionMessage>, placement: Placement, has_more: bool) {
        page_newest_first.reverse();
        let existing = std::mem::take(&mut self.messages);
        self.messages = merge_page(existing, page_newest_first, placement);
        self.has_more = has_more;
        self.oldest_timestamp = compute_oldest(&self.messages).or(self.oldest_timestamp);
        self.has_loaded_initial = true;
    }

    /// Exclusive upper bound for the next "older messages" fetch
    pub fn next_page_before(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.oldest_timestamp.unwrap_or(now)
    }
}

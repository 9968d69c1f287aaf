use chrono::{DateTime, Utc};
use lmchat_types::ModelConfig;
use serde::{Deserialize, Serialize};

/// Title used when a thread is created with a blank title
pub const DEFAULT_THREAD_TITLE: &str = "New Chat";

/// Database-agnostic thread model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub title: String,
    pub model: String,
    pub temperature: f32,
    /// Rolling memory, oldest entry first
    #[serde(default)]
    pub memory: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewThread {
    pub title: String,
    pub model: String,
    pub temperature: f32,
}

impl NewThread {
    pub fn new(title: &str, config: ModelConfig) -> Self {
        let title = title.trim();
        Self {
            title: if title.is_empty() {
                DEFAULT_THREAD_TITLE.to_string()
            } else {
                title.to_string()
            },
            model: config.model,
            temperature: config.temperature,
        }
    }

    /// Materialize with a store-assigned id and timestamp
    pub fn into_thread(self, id: String, now: DateTime<Utc>) -> Thread {
        Thread {
            id,
            title: self.title,
            model: self.model,
            temperature: self.temperature,
            memory: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial thread update; every applied patch bumps `updated_at`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThreadPatch {
    pub title: Option<String>,
    pub memory: Option<Vec<String>>,
}

impl ThreadPatch {
    pub fn rename(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn memory(memory: Vec<String>) -> Self {
        Self {
            memory: Some(memory),
            ..Self::default()
        }
    }

    pub fn apply(self, thread: &mut Thread, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            thread.title = title;
        }
        if let Some(memory) = self.memory {
            thread.memory = memory;
        }
        thread.updated_at = now;
    }
}

use serde::{Deserialize, Serialize};

/// Bounds applied to context windows, rolling memory and message pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationLimits {
    /// Number of most recent messages sent to the model per turn
    pub history_window: usize,
    /// Max characters per history entry (ellipsis included)
    pub history_char_cap: usize,
    /// Max characters per rolling memory entry (ellipsis included)
    pub memory_entry_char_cap: usize,
    /// Max number of rolling memory entries kept per thread
    pub memory_capacity: usize,
    pub page_size: usize,
    pub max_page_size: usize,
}

impl Default for ConversationLimits {
    fn default() -> Self {
        Self {
            history_window: 6,
            history_char_cap: 700,
            memory_entry_char_cap: 500,
            memory_capacity: 10,
            page_size: 30,
            max_page_size: 100,
        }
    }
}

impl ConversationLimits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }

    pub fn with_history_char_cap(mut self, cap: usize) -> Self {
        self.history_char_cap = cap;
        self
    }

    pub fn with_memory_entry_char_cap(mut self, cap: usize) -> Self {
        self.memory_entry_char_cap = cap;
        self
    }

    pub fn with_memory_capacity(mut self, capacity: usize) -> Self {
        self.memory_capacity = capacity;
        self
    }

    pub fn with_page_size(mut self, page_size: usize, max_page_size: usize) -> Self {
        self.page_size = page_size;
        self.max_page_size = max_page_size;
        self
    }

    /// Resolve a requested page size: missing or zero falls back to the
    /// default page size, anything else is capped at `max_page_size`.
    pub fn clamp_page_size(&self, requested: Option<usize>) -> usize {
        match requested {
            None | Some(0) => self.page_size.min(self.max_page_size),
            Some(n) => n.min(self.max_page_size),
        }
    }
}

/// Model selection stored on each thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub model: String,
    pub temperature: f32,
}

impl ModelConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: 0.2,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::new("gpt-3.5-turbo")
    }
}

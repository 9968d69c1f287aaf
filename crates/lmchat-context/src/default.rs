use async_trait::async_trait;
use lmchat_persist::{DBMessage, PersistenceClient};
use lmchat_types::{truncate_with_ellipsis, ConversationLimits, Sender};

use crate::error::{ContextError, Result};
use crate::strategy::{ContextEntry, ContextStrategy, ContextWindow};
use crate::templates::{DEFAULT_SYSTEM_PROMPT, MEMORY_RECAP_HEADER};

/// Sliding window over the newest messages plus a numbered memory recap
pub struct DefaultContextStrategy {
    limits: ConversationLimits,
    system_prompt: String,
}

impl DefaultContextStrategy {
    pub fn new(limits: ConversationLimits) -> Self {
        Self {
            limits,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn limits(&self) -> &ConversationLimits {
        &self.limits
    }

    /// Base instruction, followed by the recap when memory is non-empty
    pub fn build_system_prompt(&self, memory: &[String]) -> String {
        if memory.is_empty() {
            return self.system_prompt.clone();
        }

        let recap = memory
            .iter()
            .enumerate()
            .map(|(i, entry)| format!("{}. {}", i + 1, entry))
            .collect::<Vec<_>>()
            .join("\n");

        format!("{}\n\n{}\n{}", self.system_prompt, MEMORY_RECAP_HEADER, recap)
    }

    /// Turn stored messages (oldest first) into trimmed history entries.
    ///
    /// The turn's text always ends the history. When `user_message_id` names
    /// the row the caller already persisted, that row is dropped from its
    /// stored position, so a concurrent turn writing after it cannot make the
    /// text appear twice. Without an id, only a trailing user row with the same
    /// text counts as already persisted.
    pub fn build_history(
        &self,
        messages: Vec<DBMessage>,
        user_text: &str,
        user_message_id: Option<&str>,
    ) -> Vec<ContextEntry> {
        let window = self.limits.history_window;
        let already_persisted = user_message_id.is_none()
            && messages
                .last()
                .is_some_and(|last| last.sender == Sender::User && last.content == user_text);

        let mut history: Vec<ContextEntry> = messages
            .into_iter()
            .filter(|m| user_message_id != Some(m.id.as_str()))
            .map(|m| ContextEntry::new(m.sender, m.content))
            .collect();

        if !already_persisted {
            history.push(ContextEntry::new(Sender::User, user_text));
        }

        let overflow = history.len().saturating_sub(window);
        history.drain(..overflow);

        for entry in &mut history {
            entry.content = truncate_with_ellipsis(&entry.content, self.limits.history_char_cap);
        }
        history
    }
}

impl Default for DefaultContextStrategy {
    fn default() -> Self {
        Self::new(ConversationLimits::default())
    }
}

#[async_trait]
impl ContextStrategy for DefaultContextStrategy {
    async fn get_context_window(
        &self,
        thread_id: &str,
        user_text: &str,
        user_message_id: Option<&str>,
        store: &dyn PersistenceClient,
    ) -> Result<ContextWindow> {
        // 1. Resolve the thread
        let thread = store
            .get_thread(thread_id)
            .await?
            .ok_or_else(|| ContextError::ThreadNotFound(thread_id.to_string()))?;

        // 2. Newest N messages of this thread, oldest first
        let messages = store
            .latest_messages(thread_id, self.limits.history_window)
            .await?;
        tracing::debug!(
            thread_id = %thread_id,
            fetched = messages.len(),
            memory_entries = thread.memory.len(),
            "Building context window"
        );

        // 3. Trim entries and assemble the prompt
        let history = self.build_history(messages, user_text, user_message_id);
        let system_prompt = self.build_system_prompt(&thread.memory);

        Ok(ContextWindow {
            system_prompt,
            history,
            model: thread.model,
            temperature: thread.temperature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lmchat_persist::NewMessage;

    fn stored(sender: Sender, content: &str) -> DBMessage {
        let message = match sender {
            Sender::User => NewMessage::user("t", content),
            Sender::Assistant => NewMessage::assistant("t", content, None),
        };
        message.into_message(content.to_string(), lmchat_types::now_millis())
    }

    #[test]
    fn test_system_prompt_without_memory_is_base() {
        let strategy = DefaultContextStrategy::default().with_system_prompt("base");
        assert_eq!(strategy.build_system_prompt(&[]), "base");
    }

    #[test]
    fn test_system_prompt_numbers_memory_oldest_first() {
        let strategy = DefaultContextStrategy::default().with_system_prompt("base");
        let prompt = strategy.build_system_prompt(&["first".to_string(), "second".to_string()]);
        assert_eq!(prompt, format!("base\n\n{}\n1. first\n2. second", MEMORY_RECAP_HEADER));
    }

    #[test]
    fn test_persisted_user_text_is_not_duplicated() {
        let strategy = DefaultContextStrategy::default();
        let history = strategy.build_history(vec![stored(Sender::User, "Hello")], "Hello", None);
        assert_eq!(history, vec![ContextEntry::new(Sender::User, "Hello")]);
    }

    #[test]
    fn test_unpersisted_user_text_evicts_oldest() {
        let limits = ConversationLimits::default().with_history_window(2);
        let strategy = DefaultContextStrategy::new(limits);
        let messages = vec![stored(Sender::User, "a"), stored(Sender::Assistant, "b")];

        let history = strategy.build_history(messages, "c", None);
        let contents: Vec<_> = history.iter().map(|e| e.content.as_str()).collect();
        assert_eq!(contents, vec!["b", "c"]);
    }

    #[test]
    fn test_history_entries_are_trimmed() {
        let strategy = DefaultContextStrategy::default();
        let long = "x".repeat(1_000);
        let history = strategy.build_history(vec![stored(Sender::Assistant, &long)], "next", None);

        assert_eq!(history[0].content.chars().count(), 700);
        assert!(history[0].content.ends_with("..."));
        assert_eq!(history[1].content, "next");
    }

    #[test]
    fn test_persisted_row_is_matched_by_id() {
        let strategy = DefaultContextStrategy::default();
        // another turn on the same thread stored its message after ours
        let messages = vec![
            stored(Sender::Assistant, "earlier"),
            stored(Sender::User, "mine"),
            stored(Sender::User, "theirs"),
        ];

        let history = strategy.build_history(messages, "mine", Some("mine"));
        let contents: Vec<_> = history.iter().map(|e| e.content.as_str()).collect();
        assert_eq!(contents, vec!["earlier", "theirs", "mine"]);
    }
}

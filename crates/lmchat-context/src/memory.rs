use lmchat_persist::ThreadStore;
use lmchat_types::{truncate_with_ellipsis, ConversationLimits};

use crate::error::Result;

/// Condenses finished exchanges into the thread's rolling memory
#[derive(Debug, Clone, Default)]
pub struct MemoryUpdater {
    limits: ConversationLimits,
}

impl MemoryUpdater {
    pub fn new(limits: ConversationLimits) -> Self {
        Self { limits }
    }

    pub fn build_entry(&self, user_text: &str, reply_text: &str) -> String {
        let entry = format!("User: {}\nAssistant: {}", user_text, reply_text);
        truncate_with_ellipsis(&entry, self.limits.memory_entry_char_cap)
    }

    /// Append `entry`, keeping only the newest `memory_capacity` entries
    pub fn apply(&self, mut memory: Vec<String>, entry: String) -> Vec<String> {
        memory.push(entry);
        let overflow = memory.len().saturating_sub(self.limits.memory_capacity);
        memory.drain(..overflow);
        memory
    }

    /// Store one exchange through the store's atomic append-and-trim
    pub async fn record_exchange<S>(
        &self,
        thread_id: &str,
        user_text: &str,
        reply_text: &str,
        store: &S,
    ) -> Result<Vec<String>>
    where
        S: ThreadStore + ?Sized,
    {
        let entry = self.build_entry(user_text, reply_text);
        let memory = store
            .push_memory(thread_id, entry, self.limits.memory_capacity)
            .await?;
        Ok(memory)
    }

    /// Like `record_exchange`, but failures are logged and dropped
    pub async fn record_exchange_best_effort<S>(
        &self,
        thread_id: &str,
        user_text: &str,
        reply_text: &str,
        store: &S,
    ) -> Option<Vec<String>>
    where
        S: ThreadStore + ?Sized,
    {
        match self.record_exchange(thread_id, user_text, reply_text, store).await {
            Ok(memory) => Some(memory),
            Err(e) => {
                tracing::warn!(thread_id = %thread_id, error = %e, "Failed to update thread memory");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_entry_format() {
        let updater = MemoryUpdater::default();
        assert_eq!(updater.build_entry("Hi", "Hello!"), "User: Hi\nAssistant: Hello!");
    }

    #[test]
    fn test_build_entry_is_capped() {
        let updater = MemoryUpdater::default();
        let entry = updater.build_entry(&"a".repeat(400), &"b".repeat(400));
        assert_eq!(entry.chars().count(), 500);
        assert!(entry.ends_with("..."));
    }

    #[test]
    fn test_apply_evicts_oldest_first() {
        let updater = MemoryUpdater::default();
        let memory: Vec<String> = (0..10).map(|i| format!("e{i}")).collect();

        let memory = updater.apply(memory, "new".to_string());
        assert_eq!(memory.len(), 10);
        assert_eq!(memory.first().map(String::as_str), Some("e1"));
        assert_eq!(memory.last().map(String::as_str), Some("new"));
    }

    #[test]
    fn test_apply_below_capacity_keeps_everything() {
        let updater = MemoryUpdater::new(ConversationLimits::default().with_memory_capacity(3));
        let memory = updater.apply(vec!["a".to_string()], "b".to_string());
        assert_eq!(memory, vec!["a", "b"]);
    }
}

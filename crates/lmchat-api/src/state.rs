use std::sync::Arc;

use lmchat_context::{DefaultContextStrategy, MemoryUpdater};
use lmchat_llm::ChatClient;
use lmchat_media::{TextExtractor, Transcriber};
use lmchat_persist::PersistenceClient;

use crate::chat::ChatService;
use crate::config::Config;

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub persist: Arc<dyn PersistenceClient>,
    pub llm_client: Arc<dyn ChatClient>,
    pub chat: Arc<ChatService>,
}

impl AppState {
    pub fn new(
        config: Config,
        persist: Arc<dyn PersistenceClient>,
        llm_client: Arc<dyn ChatClient>,
        ocr: Arc<dyn TextExtractor>,
        transcriber: Arc<dyn Transcriber>,
    ) -> Self {
        let limits = config.conversation.clone();
        let chat = ChatService::new(
            persist.clone(),
            llm_client.clone(),
            Arc::new(DefaultContextStrategy::new(limits.clone())),
            MemoryUpdater::new(limits),
            ocr,
            transcriber,
        );

        Self {
            config: Arc::new(config),
            persist,
            llm_client,
            chat: Arc::new(chat),
        }
    }
}

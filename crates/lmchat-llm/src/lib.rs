pub mod types;
pub mod traits;
pub mod config;
pub mod openai;

pub use traits::{ChatClient, ChatRequest, ChatResponse, ChatOptions, TokenUsage};
pub use config::{LlmConfig, ClientFactory};
pub use openai::{OpenAIClient, EMPTY_CONTENT_PLACEHOLDER};
pub use types::Message;

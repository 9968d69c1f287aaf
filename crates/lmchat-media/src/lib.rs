pub mod types;
pub mod error;
pub mod traits;
pub mod client;
pub mod prompt;

pub use types::{AudioTranscription, MediaKind, MediaRequest, OcrResponse};
pub use error::{MediaError, Result};
pub use traits::{TextExtractor, Transcriber};
pub use client::{AudioClient, OcrClient};
pub use prompt::{compose_attachment_prompt, DEFAULT_AUDIO_COMMAND, DEFAULT_FILE_COMMAND, NO_TEXT_DETECTED};

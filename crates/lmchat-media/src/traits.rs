use async_trait::async_trait;

use crate::error::Result;
use crate::types::{AudioTranscription, MediaRequest, OcrResponse};

/// Extracts text from a stored document or image
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, request: &MediaRequest) -> Result<OcrResponse>;
}

/// Transcribes a stored audio clip
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, request: &MediaRequest) -> Result<AudioTranscription>;
}

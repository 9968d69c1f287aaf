use std::sync::Arc;

use lmchat_context::{ContextStrategy, MemoryUpdater};
use lmchat_llm::{ChatClient, ChatOptions, ChatRequest};
use lmchat_media::{
    compose_attachment_prompt, AudioTranscription, MediaError, MediaKind, MediaRequest,
    OcrResponse, TextExtractor, Transcriber,
};
use lmchat_persist::{NewMessage, PersistenceClient};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ApiError, ApiResult};

/// Ids and text produced by one completed turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TurnOutcome {
    pub user_message_id: String,
    pub assistant_message_id: String,
    pub assistant_text: String,
}

/// Attachment already uploaded to the object store, plus an optional instruction
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttachmentRequest {
    pub bucket: String,
    pub key: String,
    pub mime_type: String,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttachmentOutcome {
    /// User turn built from the command and the extracted text
    pub prompt: String,
    #[serde(flatten)]
    pub turn: TurnOutcome,
}

/// Runs user turns: persistence, context, model call and memory
pub struct ChatService {
    store: Arc<dyn PersistenceClient>,
    llm_client: Arc<dyn ChatClient>,
    context_strategy: Arc<dyn ContextStrategy>,
    memory: MemoryUpdater,
    ocr: Arc<dyn TextExtractor>,
    transcriber: Arc<dyn Transcriber>,
}

impl ChatService {
    pub fn new(
        store: Arc<dyn PersistenceClient>,
        llm_client: Arc<dyn ChatClient>,
        context_strategy: Arc<dyn ContextStrategy>,
        memory: MemoryUpdater,
        ocr: Arc<dyn TextExtractor>,
        transcriber: Arc<dyn Transcriber>,
    ) -> Self {
        Self {
            store,
            llm_client,
            context_strategy,
            memory,
            ocr,
            transcriber,
        }
    }

    /// Persist the user text, ask the model and persist its reply.
    ///
    /// A model failure leaves the user message in place.
    pub async fn send_turn(&self, thread_id: &str, user_text: &str) -> ApiResult<TurnOutcome> {
        // 1. Validate before touching the store
        let thread_id = validate_thread_id(thread_id)?;
        if user_text.trim().is_empty() {
            return Err(ApiError::InvalidText("Message text must be a non-empty string".to_string()));
        }

        // 2. Thread must exist
        if self.store.get_thread(thread_id).await?.is_none() {
            return Err(ApiError::ThreadNotFound(thread_id.to_string()));
        }

        // 3. User message is kept even if the model call fails
        let user_message = self
            .store
            .append_message(NewMessage::user(thread_id, user_text))
            .await?;

        // 4. Context window and model call
        let window = self
            .context_strategy
            .get_context_window(
                thread_id,
                user_text,
                Some(user_message.id.as_str()),
                self.store.as_ref(),
            )
            .await?;
        let options = ChatOptions::new().temperature(window.temperature);
        let request = ChatRequest::new(window.model.clone(), window.into_messages())
            .with_options(options);

        let response = self.llm_client.chat(request).await.map_err(|e| {
            tracing::warn!(thread_id = %thread_id, error = %e, "Model call failed, user message kept");
            ApiError::Llm(e)
        })?;

        // 5. Assistant reply with the raw upstream payload
        let assistant_message = self
            .store
            .append_message(NewMessage::assistant(
                thread_id,
                response.content.clone(),
                Some(response.raw),
            ))
            .await?;

        // 6. Memory is best effort
        self.memory
            .record_exchange_best_effort(thread_id, user_text, &response.content, self.store.as_ref())
            .await;

        tracing::info!(
            thread_id = %thread_id,
            user_message_id = %user_message.id,
            assistant_message_id = %assistant_message.id,
            "Turn completed"
        );

        Ok(TurnOutcome {
            user_message_id: user_message.id,
            assistant_message_id: assistant_message.id,
            assistant_text: response.content,
        })
    }

    /// Run OCR or transcription on an attachment, then send it as a turn
    pub async fn analyze_attachment(
        &self,
        thread_id: &str,
        attachment: AttachmentRequest,
    ) -> ApiResult<AttachmentOutcome> {
        let thread_id = validate_thread_id(thread_id)?;
        let request = validate_media(MediaRequest::new(
            attachment.bucket,
            attachment.key,
            attachment.mime_type,
        ))?;

        if self.store.get_thread(thread_id).await?.is_none() {
            return Err(ApiError::ThreadNotFound(thread_id.to_string()));
        }

        let kind = request.kind();
        let extracted = match kind {
            MediaKind::Audio => self.transcribe(request).await?.text,
            MediaKind::Document => Some(self.extract_text(request).await?.text),
        };

        let prompt = compose_attachment_prompt(
            kind,
            attachment.command.as_deref(),
            attachment.file_name.as_deref(),
            extracted.as_deref(),
        );
        let turn = self.send_turn(thread_id, &prompt).await?;

        Ok(AttachmentOutcome { prompt, turn })
    }

    pub async fn extract_text(&self, request: MediaRequest) -> ApiResult<OcrResponse> {
        let request = validate_media(request)?;
        self.ocr.extract_text(&request).await.map_err(ApiError::Ocr)
    }

    pub async fn transcribe(&self, request: MediaRequest) -> ApiResult<AudioTranscription> {
        let request = validate_media(request)?;
        self.transcriber.transcribe(&request).await.map_err(ApiError::Audio)
    }
}

fn validate_thread_id(thread_id: &str) -> ApiResult<&str> {
    let trimmed = thread_id.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidThread("threadId must be a non-empty string".to_string()));
    }
    Ok(trimmed)
}

fn validate_media(request: MediaRequest) -> ApiResult<MediaRequest> {
    request.validate().map_err(|e| match e {
        MediaError::Validation(msg) => ApiError::InvalidMedia(msg),
        other => ApiError::InvalidMedia(other.to_string()),
    })
}

use utoipa::OpenApi;

use crate::chat::{AttachmentOutcome, AttachmentRequest, TurnOutcome};
use crate::routes::{attachments, health, media, messages, threads};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        threads::create_thread,
        threads::list_threads,
        threads::get_thread,
        threads::rename_thread,
        threads::delete_thread,
        messages::list_messages,
        messages::send_message,
        attachments::analyze_attachment,
        media::extract_text,
        media::transcribe,
    ),
    components(schemas(
        health::HealthResponse,
        threads::CreateThreadRequest,
        threads::RenameThreadRequest,
        threads::ThreadResponse,
        threads::ListThreadsResponse,
        messages::MessageResponse,
        messages::ListMessagesResponse,
        messages::SendMessageRequest,
        media::MediaRequestBody,
        media::OcrResponseBody,
        media::TranscriptionResponseBody,
        TurnOutcome,
        AttachmentRequest,
        AttachmentOutcome,
    )),
    tags(
        (name = "health", description = "Service status"),
        (name = "threads", description = "Conversation threads"),
        (name = "messages", description = "Message history and turns"),
        (name = "attachments", description = "File and audio analysis"),
        (name = "media", description = "OCR and transcription proxies"),
    )
)]
pub struct ApiDoc;

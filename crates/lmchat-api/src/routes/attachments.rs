use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::{
    chat::{AttachmentOutcome, AttachmentRequest},
    error::ApiResult,
    extract::ApiJson,
    state::AppState,
};

/// Extract text from an uploaded file or audio clip and send it as a turn
#[utoipa::path(
    post,
    path = "/threads/{thread_id}/attachments",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    request_body = AttachmentRequest,
    responses(
        (status = 200, description = "Attachment analyzed", body = AttachmentOutcome),
        (status = 400, description = "Invalid thread or media reference"),
        (status = 404, description = "Thread not found"),
        (status = 502, description = "OCR, audio or model service failed")
    ),
    tag = "attachments"
)]
pub async fn analyze_attachment(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    ApiJson(req): ApiJson<AttachmentRequest>,
) -> ApiResult<Json<AttachmentOutcome>> {
    let outcome = state.chat.analyze_attachment(&thread_id, req).await?;
    Ok(Json(outcome))
}

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use lmchat_persist::DBMessage;
use lmchat_types::Sender;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    chat::TurnOutcome,
    error::{ApiError, ApiResult},
    extract::ApiQuery,
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message_id: String,
    pub thread_id: String,
    #[schema(value_type = String, example = "user")]
    pub sender: Sender,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ListMessagesQuery {
    pub limit: Option<usize>,
    /// Exclusive upper bound, RFC 3339
    pub before: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListMessagesResponse {
    /// Newest first
    pub messages: Vec<MessageResponse>,
    pub has_more: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    pub text: String,
}

/// List messages in a thread, newest first
#[utoipa::path(
    get,
    path = "/threads/{thread_id}/messages",
    params(
        ("thread_id" = String, Path, description = "Thread ID"),
        ("limit" = Option<usize>, Query, description = "Page size (default: 30, max: 100)"),
        ("before" = Option<String>, Query, description = "Only messages created strictly before this RFC 3339 timestamp")
    ),
    responses(
        (status = 200, description = "Page of messages", body = ListMessagesResponse),
        (status = 404, description = "Thread not found")
    ),
    tag = "messages"
)]
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    ApiQuery(query): ApiQuery<ListMessagesQuery>,
) -> ApiResult<Json<ListMessagesResponse>> {
    if state.persist.get_thread(&thread_id).await?.is_none() {
        return Err(ApiError::ThreadNotFound(thread_id));
    }

    let limit = state.config.conversation.clamp_page_size(query.limit);
    let page = state
        .persist
        .query_page(&thread_id, query.before, limit)
        .await?;

    let page = page.map(message_to_response);
    Ok(Json(ListMessagesResponse {
        has_more: page.has_more,
        messages: page.items,
    }))
}

/// Send a user message and get the assistant reply
#[utoipa::path(
    post,
    path = "/threads/{thread_id}/messages",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Turn completed", body = TurnOutcome),
        (status = 400, description = "Invalid thread or text"),
        (status = 404, description = "Thread not found"),
        (status = 502, description = "Model server failed; the user message was kept")
    ),
    tag = "messages"
)]
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> ApiResult<Json<TurnOutcome>> {
    let Json(req) = payload.map_err(|e| ApiError::InvalidText(e.body_text()))?;
    let outcome = state.chat.send_turn(&thread_id, &req.text).await?;
    Ok(Json(outcome))
}

fn message_to_response(message: DBMessage) -> MessageResponse {
    MessageResponse {
        message_id: message.id,
        thread_id: message.thread_id,
        sender: message.sender,
        content: message.content,
        created_at: message.created_at,
    }
}

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use lmchat_persist::{NewThread, Thread, ThreadPatch};
use lmchat_types::ModelConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiQuery},
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateThreadRequest {
    #[serde(default)]
    pub title: String,
    /// Defaults to the configured model
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RenameThreadRequest {
    pub title: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ThreadResponse {
    pub thread_id: String,
    pub title: String,
    pub model: String,
    pub temperature: f32,
    pub memory: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ListThreadsQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub skip: u64,
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListThreadsResponse {
    pub threads: Vec<ThreadResponse>,
    pub has_more: bool,
}

/// Create a new thread
#[utoipa::path(
    post,
    path = "/threads",
    request_body = CreateThreadRequest,
    responses(
        (status = 201, description = "Thread created", body = ThreadResponse),
        (status = 400, description = "Invalid request")
    ),
    tag = "threads"
)]
pub async fn create_thread(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateThreadRequest>,
) -> ApiResult<(StatusCode, Json<ThreadResponse>)> {
    let model = req
        .model
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| state.config.llm.model.clone());
    let temperature = req.temperature.unwrap_or(state.config.llm.temperature);
    if !(0.0..=2.0).contains(&temperature) {
        return Err(ApiError::BadRequest("temperature must be between 0 and 2".to_string()));
    }

    let config = ModelConfig::new(model).with_temperature(temperature);
    let thread = state
        .persist
        .create_thread(NewThread::new(&req.title, config))
        .await?;

    tracing::info!(thread_id = %thread.id, "Thread created");
    Ok((StatusCode::CREATED, Json(thread_to_response(thread))))
}

/// List threads, most recently active first
#[utoipa::path(
    get,
    path = "/threads",
    params(
        ("limit" = Option<i64>, Query, description = "Maximum number of threads to return (default: 20, max: 100)"),
        ("skip" = Option<u64>, Query, description = "Number of threads to skip")
    ),
    responses(
        (status = 200, description = "List of threads", body = ListThreadsResponse)
    ),
    tag = "threads"
)]
pub async fn list_threads(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<ListThreadsQuery>,
) -> ApiResult<Json<ListThreadsResponse>> {
    let limit = query.limit.clamp(1, 100);

    // one extra row decides has_more
    let mut threads = state
        .persist
        .list_threads(Some(limit + 1), Some(query.skip))
        .await?;
    let has_more = threads.len() as i64 > limit;
    threads.truncate(limit as usize);

    Ok(Json(ListThreadsResponse {
        threads: threads.into_iter().map(thread_to_response).collect(),
        has_more,
    }))
}

/// Get thread by ID
#[utoipa::path(
    get,
    path = "/threads/{thread_id}",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    responses(
        (status = 200, description = "Thread found", body = ThreadResponse),
        (status = 404, description = "Thread not found")
    ),
    tag = "threads"
)]
pub async fn get_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<ThreadResponse>> {
    let thread = state
        .persist
        .get_thread(&thread_id)
        .await?
        .ok_or(ApiError::ThreadNotFound(thread_id))?;

    Ok(Json(thread_to_response(thread)))
}

/// Rename a thread
#[utoipa::path(
    patch,
    path = "/threads/{thread_id}",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    request_body = RenameThreadRequest,
    responses(
        (status = 200, description = "Thread renamed", body = ThreadResponse),
        (status = 400, description = "Invalid title"),
        (status = 404, description = "Thread not found")
    ),
    tag = "threads"
)]
pub async fn rename_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    payload: Result<Json<RenameThreadRequest>, JsonRejection>,
) -> ApiResult<Json<ThreadResponse>> {
    let Json(req) = payload.map_err(|e| ApiError::InvalidTitle(e.body_text()))?;
    let title = req.title.trim();
    if title.is_empty() {
        return Err(ApiError::InvalidTitle("Chat title must be a non-empty string".to_string()));
    }

    let thread = state
        .persist
        .update_thread(&thread_id, ThreadPatch::rename(title))
        .await?;

    Ok(Json(thread_to_response(thread)))
}

/// Delete a thread and all of its messages
#[utoipa::path(
    delete,
    path = "/threads/{thread_id}",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    responses(
        (status = 204, description = "Thread deleted"),
        (status = 404, description = "Thread not found")
    ),
    tag = "threads"
)]
pub async fn delete_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> ApiResult<StatusCode> {
    if state.persist.get_thread(&thread_id).await?.is_none() {
        return Err(ApiError::ThreadNotFound(thread_id));
    }

    let removed = state.persist.delete_messages(&thread_id).await?;
    state.persist.delete_thread(&thread_id).await?;

    tracing::info!(thread_id = %thread_id, messages = removed, "Thread deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn thread_to_response(thread: Thread) -> ThreadResponse {
    ThreadResponse {
        thread_id: thread.id,
        title: thread.title,
        model: thread.model,
        temperature: thread.temperature,
        memory: thread.memory,
        created_at: thread.created_at,
        updated_at: thread.updated_at,
    }
}

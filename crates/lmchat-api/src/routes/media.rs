use axum::{extract::State, Json};
use lmchat_media::{AudioTranscription, MediaRequest, OcrResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{error::ApiResult, extract::ApiJson, state::AppState};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MediaRequestBody {
    pub bucket: String,
    pub key: String,
    pub mime_type: String,
}

impl From<MediaRequestBody> for MediaRequest {
    fn from(body: MediaRequestBody) -> Self {
        MediaRequest::new(body.bucket, body.key, body.mime_type)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OcrResponseBody {
    pub text: String,
    pub bucket: String,
    pub key: String,
}

impl From<OcrResponse> for OcrResponseBody {
    fn from(response: OcrResponse) -> Self {
        Self {
            text: response.text,
            bucket: response.bucket,
            key: response.key,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionResponseBody {
    pub text: Option<String>,
    pub confidence: Option<f64>,
    pub language: Option<String>,
    pub duration_seconds: Option<f64>,
    pub rms_amplitude: Option<f64>,
    pub sample_rate: Option<u32>,
}

impl From<AudioTranscription> for TranscriptionResponseBody {
    fn from(t: AudioTranscription) -> Self {
        Self {
            text: t.text,
            confidence: t.confidence,
            language: t.language,
            duration_seconds: t.duration_seconds,
            rms_amplitude: t.rms_amplitude,
            sample_rate: t.sample_rate,
        }
    }
}

/// Run OCR on a stored document or image
#[utoipa::path(
    post,
    path = "/media/ocr",
    request_body = MediaRequestBody,
    responses(
        (status = 200, description = "Extracted text", body = OcrResponseBody),
        (status = 400, description = "Invalid media reference"),
        (status = 502, description = "OCR service failed")
    ),
    tag = "media"
)]
pub async fn extract_text(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<MediaRequestBody>,
) -> ApiResult<Json<OcrResponseBody>> {
    let response = state.chat.extract_text(req.into()).await?;
    Ok(Json(response.into()))
}

/// Transcribe a stored audio clip
#[utoipa::path(
    post,
    path = "/media/transcribe",
    request_body = MediaRequestBody,
    responses(
        (status = 200, description = "Transcription", body = TranscriptionResponseBody),
        (status = 400, description = "Invalid media reference"),
        (status = 502, description = "Audio service failed")
    ),
    tag = "media"
)]
pub async fn transcribe(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<MediaRequestBody>,
) -> ApiResult<Json<TranscriptionResponseBody>> {
    let transcription = state.chat.transcribe(req.into()).await?;
    Ok(Json(transcription.into()))
}

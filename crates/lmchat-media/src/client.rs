use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::{MediaError, Result};
use crate::traits::{TextExtractor, Transcriber};
use crate::types::{AudioTranscription, MediaRequest, OcrResponse};

const DEFAULT_OCR_BASE_URL: &str = "http://127.0.0.1:8001";
const DEFAULT_AUDIO_BASE_URL: &str = "http://127.0.0.1:8002";

fn normalize_base_url(base_url: &str, fallback: &str) -> String {
    let trimmed = base_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// POST a media request and decode the JSON reply
async fn post_media<T: DeserializeOwned>(
    http_client: &Client,
    service: &'static str,
    url: String,
    request: &MediaRequest,
) -> Result<T> {
    tracing::debug!(service, bucket = %request.bucket, key = %request.key, "Sending media request");

    let response = http_client
        .post(url)
        .json(request)
        .send()
        .await
        .map_err(|source| MediaError::Request { service, source })?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(MediaError::Upstream { service, status, body });
    }

    response
        .json()
        .await
        .map_err(|source| MediaError::Request { service, source })
}

/// Client for the OCR service (`POST /ocr`)
pub struct OcrClient {
    http_client: Client,
    base_url: String,
}

impl OcrClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            http_client: Client::builder().build()?,
            base_url: normalize_base_url(base_url, DEFAULT_OCR_BASE_URL),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl TextExtractor for OcrClient {
    async fn extract_text(&self, request: &MediaRequest) -> Result<OcrResponse> {
        let url = format!("{}/ocr", self.base_url);
        post_media(&self.http_client, "OCR", url, request).await
    }
}

/// Client for the audio analysis service (`POST /transcribe`)
pub struct AudioClient {
    http_client: Client,
    base_url: String,
}

impl AudioClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            http_client: Client::builder().build()?,
            base_url: normalize_base_url(base_url, DEFAULT_AUDIO_BASE_URL),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transcriber for AudioClient {
    async fn transcribe(&self, request: &MediaRequest) -> Result<AudioTranscription> {
        let url = format!("{}/transcribe", self.base_url);
        post_media(&self.http_client, "Audio", url, request).await
    }
}

use serde::{Deserialize, Serialize};

use crate::error::{MediaError, Result};

/// Reference to an object already stored in the bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRequest {
    pub bucket: String,
    pub key: String,
    pub mime_type: String,
}

impl MediaRequest {
    pub fn new(
        bucket: impl Into<String>,
        key: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Trim every field, reject blanks and lowercase the mime type
    pub fn validate(self) -> Result<Self> {
        let bucket = non_blank("bucket", &self.bucket)?;
        let key = non_blank("key", &self.key)?;
        let mime_type = non_blank("mime_type", &self.mime_type)?.to_ascii_lowercase();
        Ok(Self { bucket, key, mime_type })
    }

    pub fn kind(&self) -> MediaKind {
        MediaKind::from_mime(&self.mime_type)
    }
}

fn non_blank(field: &str, value: &str) -> Result<String> {
    let cleaned = value.trim();
    if cleaned.is_empty() {
        return Err(MediaError::Validation(format!("{} must be a non-empty string", field)));
    }
    Ok(cleaned.to_string())
}

/// Which service handles an attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Document,
    Audio,
}

impl MediaKind {
    pub fn from_mime(mime_type: &str) -> Self {
        if mime_type.trim().to_ascii_lowercase().starts_with("audio/") {
            MediaKind::Audio
        } else {
            MediaKind::Document
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrResponse {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub key: String,
}

/// Transcription plus whatever signal metadata the service reports
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioTranscription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rms_amplitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
}

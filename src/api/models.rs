//! API data models

use serde::{Deserialize, Serialize};

use crate::transcript::{ExtractionFailure, TranscriptResult};
use crate::youtube::CaptionSegment;

pub const MISSING_URL_ERROR: &str = "YouTube URL is required";
pub const INVALID_URL_ERROR: &str = "Invalid YouTube URL";
pub const SUCCESS_MESSAGE: &str = "Transcript extracted successfully";
pub const HEALTH_MESSAGE: &str = "YouTube Transcript API is running";
pub const UPLOAD_NOT_IMPLEMENTED_ERROR: &str =
    "Direct audio transcription is not implemented in this version. Please use YouTube videos with captions.";
pub const UPLOAD_NOT_IMPLEMENTED_MESSAGE: &str = "This feature requires OpenAI Whisper API integration";

/// Response body shared by every entry point, discriminated by `success`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseEnvelope {
    Success(SuccessEnvelope),
    Failure(FailureEnvelope),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessEnvelope {
    pub success: bool,
    pub transcript: String,
    pub video_id: String,
    pub segments: Vec<CaptionSegment>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureEnvelope {
    pub success: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ResponseEnvelope {
    pub fn success(result: TranscriptResult) -> Self {
        ResponseEnvelope::Success(SuccessEnvelope {
            success: true,
            transcript: result.full_text,
            video_id: result.video_id.into_string(),
            segments: result.segments,
            message: SUCCESS_MESSAGE.to_string(),
        })
    }

    pub fn failure(error: impl Into<String>) -> Self {
        ResponseEnvelope::Failure(FailureEnvelope {
            success: false,
            error: error.into(),
            video_id: None,
            message: None,
        })
    }

    pub fn missing_url() -> Self {
        Self::failure(MISSING_URL_ERROR)
    }

    pub fn invalid_url() -> Self {
        Self::failure(INVALID_URL_ERROR)
    }

    pub fn extraction_failed(failure: &ExtractionFailure) -> Self {
        ResponseEnvelope::Failure(FailureEnvelope {
            success: false,
            error: format!("Could not extract transcript: {}", failure.description),
            video_id: Some(failure.video_id.to_string()),
            message: Some(failure.hint().to_string()),
        })
    }

    pub fn server_error(description: impl std::fmt::Display) -> Self {
        Self::failure(format!("Server error: {}", description))
    }

    pub fn upload_not_implemented() -> Self {
        ResponseEnvelope::Failure(FailureEnvelope {
            success: false,
            error: UPLOAD_NOT_IMPLEMENTED_ERROR.to_string(),
            video_id: None,
            message: Some(UPLOAD_NOT_IMPLEMENTED_MESSAGE.to_string()),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResponseEnvelope::Success(_))
    }

    /// Serialized JSON body
    pub fn to_json_bytes(&self) -> Vec<u8> {
        // Serializing plain strings, numbers and bools cannot fail.
        serde_json::to_vec(self).unwrap_or_else(|_| {
            br#"{"success":false,"error":"Server error: response serialization failed"}"#.to_vec()
        })
    }
}

/// Health check body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
}

impl HealthStatus {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            message: HEALTH_MESSAGE.to_string(),
        }
    }
}

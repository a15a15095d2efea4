//! API request handlers
//!
//! Transport-agnostic request handling shared by the HTTP server and the
//! single-invocation handler. Each entry point adapts its own request and
//! response types around these functions.

use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::models::{HealthStatus, ResponseEnvelope};
use crate::config::{Config, UploadConfig};
use crate::transcript::{ExtractionFailure, TranscriptAggregator, TranscriptResult};
use crate::youtube::{extract_video_id, CaptionError, CaptionFetcher, YouTubeCaptionClient};

/// Unexpected request-level failures. Reported as a generic server error.
#[derive(thiserror::Error, Debug)]
pub enum RequestError {
    #[error("Invalid JSON body: {0}")]
    InvalidJson(String),

    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Field '{field}' must be a string")]
    InvalidField { field: &'static str },

    #[error("Missing Content-Length")]
    MissingContentLength,

    #[error("Invalid Content-Length: {0}")]
    InvalidContentLength(String),

    #[error("Failed to read request body: {0}")]
    Body(String),

    #[error("Invalid multipart body: {0}")]
    Multipart(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Unsupported Content-Type: expected application/json, got {0}")]
    UnsupportedContentType(String),
}

/// Terminal state of one transcript request
#[derive(Debug)]
pub enum TranscribeOutcome {
    MissingUrl,
    InvalidUrl,
    ExtractionFailed(ExtractionFailure),
    Success(TranscriptResult),
    ServerError(RequestError),
}

/// How an entry point maps outcomes to HTTP status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPolicy {
    /// 200 success, 400 input or extraction failure, 500 unexpected error
    Strict,
    /// 200 regardless of outcome; callers inspect `success`
    AlwaysOk,
}

impl TranscribeOutcome {
    pub fn envelope(&self) -> ResponseEnvelope {
        match self {
            TranscribeOutcome::MissingUrl => ResponseEnvelope::missing_url(),
            TranscribeOutcome::InvalidUrl => ResponseEnvelope::invalid_url(),
            TranscribeOutcome::ExtractionFailed(failure) => ResponseEnvelope::extraction_failed(failure),
            TranscribeOutcome::Success(result) => ResponseEnvelope::success(result.clone()),
            TranscribeOutcome::ServerError(e) => ResponseEnvelope::server_error(e),
        }
    }

    pub fn into_envelope(self) -> ResponseEnvelope {
        match self {
            TranscribeOutcome::Success(result) => ResponseEnvelope::success(result),
            other => other.envelope(),
        }
    }

    pub fn status(&self, policy: StatusPolicy) -> u16 {
        match (policy, self) {
            (StatusPolicy::AlwaysOk, _) => 200,
            (StatusPolicy::Strict, TranscribeOutcome::Success(_)) => 200,
            (StatusPolicy::Strict, TranscribeOutcome::ServerError(_)) => 500,
            (StatusPolicy::Strict, _) => 400,
        }
    }
}

/// URL resolution followed by transcript aggregation
#[derive(Clone)]
pub struct TranscriptPipeline {
    aggregator: TranscriptAggregator,
}

impl TranscriptPipeline {
    pub fn new(fetcher: Arc<dyn CaptionFetcher>, languages: Vec<String>) -> Self {
        Self {
            aggregator: TranscriptAggregator::new(fetcher, languages),
        }
    }

    /// Pipeline backed by the live YouTube caption client
    pub fn from_config(config: &Config) -> Result<Self, CaptionError> {
        let client = YouTubeCaptionClient::new(&config.transcript)?;
        Ok(Self::new(Arc::new(client), config.transcript.languages.clone()))
    }

    /// Run the pipeline for a raw URL field
    pub async fn run(&self, youtube_url: &str) -> TranscribeOutcome {
        let youtube_url = youtube_url.trim();
        if youtube_url.is_empty() {
            debug!("Rejecting request without a YouTube URL");
            return TranscribeOutcome::MissingUrl;
        }

        let Some(video_id) = extract_video_id(youtube_url) else {
            debug!("No video ID found in: {}", youtube_url);
            return TranscribeOutcome::InvalidUrl;
        };

        info!("🎬 Processing video ID: {}", video_id);

        match self.aggregator.aggregate(video_id).await {
            Ok(result) => TranscribeOutcome::Success(result),
            Err(failure) => TranscribeOutcome::ExtractionFailed(failure),
        }
    }

    /// Run the pipeline for a raw JSON request body
    pub async fn handle_body(&self, body: &[u8]) -> TranscribeOutcome {
        match parse_youtube_url(body) {
            Ok(youtube_url) => self.run(&youtube_url).await,
            Err(e) => {
                error!("Request processing error: {}", e);
                TranscribeOutcome::ServerError(e)
            }
        }
    }
}

/// The persistent server only reads JSON bodies declared as such.
/// Parameters such as `charset` are allowed.
pub fn check_json_content_type(content_type: Option<&str>) -> Result<(), RequestError> {
    let Some(content_type) = content_type else {
        return Err(RequestError::UnsupportedContentType("none".to_string()));
    };

    let mime = content_type.split(';').next().unwrap_or_default().trim();
    if mime.eq_ignore_ascii_case("application/json") {
        Ok(())
    } else {
        Err(RequestError::UnsupportedContentType(content_type.to_string()))
    }
}

/// Extract the `youtube_url` field. An absent field reads as empty.
pub fn parse_youtube_url(body: &[u8]) -> Result<String, RequestError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| RequestError::InvalidJson(e.to_string()))?;

    let object = value.as_object().ok_or(RequestError::NotAnObject)?;

    match object.get("youtube_url") {
        None => Ok(String::new()),
        Some(Value::String(url)) => Ok(url.clone()),
        Some(_) => Err(RequestError::InvalidField { field: "youtube_url" }),
    }
}

/// Handle health check requests
pub fn health_check() -> HealthStatus {
    HealthStatus::healthy()
}

/// Why an upload was turned away before reaching transcription
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadRejection {
    #[error("No audio file provided")]
    NoFile,

    #[error("No file selected")]
    NoFilename,

    #[error("File too large. Maximum size is {0}MB")]
    TooLarge(u64),

    #[error("Unsupported file type. Allowed: {0}")]
    UnsupportedType(String),
}

/// Lower-cased extension of `filename` including the leading dot
fn file_extension(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default()
}

/// Validate an uploaded file's name and size
pub fn validate_upload(filename: &str, size: u64, limits: &UploadConfig) -> Result<(), UploadRejection> {
    if filename.is_empty() {
        return Err(UploadRejection::NoFilename);
    }

    if size > limits.max_file_size {
        return Err(UploadRejection::TooLarge(limits.max_file_size / (1024 * 1024)));
    }

    let extension = file_extension(filename);
    if !limits.allowed_extensions.iter().any(|allowed| *allowed == extension) {
        return Err(UploadRejection::UnsupportedType(limits.allowed_extensions.join(", ")));
    }

    Ok(())
}

/// Outcome of an upload that passed validation. Direct audio transcription is
/// not available, so this is always a failure envelope.
pub fn upload_outcome(filename: &str, size: u64) -> ResponseEnvelope {
    info!("📁 Upload accepted but not transcribed: {} ({} bytes)", filename, size);
    ResponseEnvelope::upload_not_implemented()
}

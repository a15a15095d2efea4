/// YouTube Transcript API
///
/// Resolves YouTube URLs to video identifiers, fetches caption tracks and
/// serves the flattened transcript plus timed segments over HTTP, either from
/// a long-running server or a single-invocation handler.

pub mod api;
pub mod config;
pub mod transcript;
pub mod youtube;

// Re-export main types for easy access
pub use crate::api::{ApiServer, ResponseEnvelope, StatusPolicy, TranscribeOutcome, TranscriptPipeline};
pub use crate::config::{Config, ConfigBuilder};
pub use crate::transcript::{ExtractionFailure, TranscriptAggregator, TranscriptResult};
pub use crate::youtube::{
    extract_video_id, CaptionError, CaptionFetcher, CaptionSegment, VideoId, YouTubeCaptionClient,
};

//! Transcript aggregation over a caption source
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::youtube::{CaptionFetcher, CaptionSegment, VideoId};

/// Hint attached to every extraction failure
pub const NO_CAPTIONS_HINT: &str = "This video may not have captions available";

/// All caption segments of one video plus the flattened text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptResult {
    pub video_id: VideoId,
    /// Segment texts joined by a single space, in received order
    pub full_text: String,
    pub segments: Vec<CaptionSegment>,
}

impl TranscriptResult {
    /// Build a result from segments in the order the caption source returned them
    pub fn from_segments(video_id: VideoId, segments: Vec<CaptionSegment>) -> Self {
        let full_text = segments
            .iter()
            .map(|segment| segment.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            video_id,
            full_text,
            segments,
        }
    }
}

/// Extraction failure for an already resolved video. Causes are not
/// distinguished; `description` is the caption source's error text.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionFailure {
    pub video_id: VideoId,
    pub description: String,
}

impl ExtractionFailure {
    pub fn hint(&self) -> &'static str {
        NO_CAPTIONS_HINT
    }
}

/// Fetches captions with a fixed language preference and flattens them
#[derive(Clone)]
pub struct TranscriptAggregator {
    fetcher: Arc<dyn CaptionFetcher>,
    languages: Vec<String>,
}

impl TranscriptAggregator {
    pub fn new(fetcher: Arc<dyn CaptionFetcher>, languages: Vec<String>) -> Self {
        Self { fetcher, languages }
    }

    pub async fn aggregate(&self, video_id: VideoId) -> Result<TranscriptResult, ExtractionFailure> {
        match self.fetcher.fetch(&video_id, &self.languages).await {
            Ok(segments) => {
                let result = TranscriptResult::from_segments(video_id, segments);
                info!(
                    "✅ Extracted transcript for {}: {} segments, {} characters",
                    result.video_id,
                    result.segments.len(),
                    result.full_text.len()
                );
                Ok(result)
            }
            Err(e) => {
                error!("Transcript extraction failed for {}: {}", video_id, e);
                Err(ExtractionFailure {
                    video_id,
                    description: e.to_string(),
                })
            }
        }
    }
}

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use yt_transcript_api::{CaptionError, CaptionFetcher, CaptionSegment, TranscriptPipeline, VideoId};

/// Caption source returning canned segments for one known video
pub struct StubFetcher {
    pub known_video: &'static str,
    pub segments: Vec<CaptionSegment>,
    calls: AtomicUsize,
}

impl StubFetcher {
    pub fn new(known_video: &'static str, segments: Vec<CaptionSegment>) -> Self {
        Self {
            known_video,
            segments,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CaptionFetcher for StubFetcher {
    async fn fetch(
        &self,
        video_id: &VideoId,
        _languages: &[String],
    ) -> Result<Vec<CaptionSegment>, CaptionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if video_id.as_str() == self.known_video {
            Ok(self.segments.clone())
        } else {
            Err(CaptionError::VideoUnavailable("This video is unavailable".to_string()))
        }
    }
}

pub fn rick_segments() -> Vec<CaptionSegment> {
    vec![
        CaptionSegment::new("We're no strangers to love", 18.64, 3.24),
        CaptionSegment::new("You know the rules and so do I", 22.64, 4.32),
    ]
}

pub fn stub_pipeline() -> (Arc<TranscriptPipeline>, Arc<StubFetcher>) {
    let fetcher = Arc::new(StubFetcher::new("dQw4w9WgXcQ", rick_segments()));
    let pipeline = TranscriptPipeline::new(
        fetcher.clone(),
        vec!["en".to_string(), "en-US".to_string(), "en-GB".to_string()],
    );
    (Arc::new(pipeline), fetcher)
}

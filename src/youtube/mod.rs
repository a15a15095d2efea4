/// YouTube integration: URL resolution and caption retrieval
///
/// The resolver is pure string matching; the caption client is the only
/// part of the crate that talks to youtube.com.

pub mod captions;
pub mod resolver;

// Re-export main types
pub use captions::{CaptionError, CaptionFetcher, CaptionSegment, YouTubeCaptionClient};
pub use resolver::{extract_video_id, VideoId};

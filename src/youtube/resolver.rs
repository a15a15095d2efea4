//! Video identifier extraction from free-form YouTube URLs
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Ordered URL patterns. The first matching pattern wins; the identifier
/// stops at the first `&`, newline, `?` or `#`.
const VIDEO_ID_PATTERNS: [&str; 3] = [
    r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([^&\n?#]+)",
    r"youtube\.com/watch\?.*v=([^&\n?#]+)",
    r"youtu\.be/([^&\n?#]+)",
];

fn patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        VIDEO_ID_PATTERNS
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect()
    })
}

/// Opaque YouTube video identifier. Not validated against YouTube's format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Extract the video identifier from a URL string.
///
/// Returns `None` when no pattern matches; arbitrary input never errors.
pub fn extract_video_id(url: &str) -> Option<VideoId> {
    patterns()
        .iter()
        .find_map(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| VideoId::new(m.as_str()))
}

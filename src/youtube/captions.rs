//! YouTube caption retrieval through the innertube player API
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;

use super::VideoId;
use crate::config::TranscriptConfig;

const YOUTUBE_BASE_URL: &str = "https://www.youtube.com";
const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";

/// One timed unit of caption text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionSegment {
    pub text: String,
    /// Offset from the start of the video in seconds
    pub start: f64,
    /// Seconds
    pub duration: f64,
}

impl CaptionSegment {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }
}

/// Failures from the caption source
#[derive(thiserror::Error, Debug)]
pub enum CaptionError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("YouTube returned HTTP {status} for {url}")]
    Http { status: u16, url: String },

    #[error("Too many requests; YouTube is asking for a captcha")]
    TooManyRequests,

    #[error("The video is no longer available: {0}")]
    VideoUnavailable(String),

    #[error("Subtitles are disabled for this video")]
    TranscriptsDisabled,

    #[error("No transcripts were found for any of the requested language codes: [{requested}]. Available: [{available}]")]
    NoTranscriptFound { requested: String, available: String },

    #[error("Failed to parse YouTube response: {0}")]
    Parse(String),
}

/// Source of caption segments for a video
#[async_trait]
pub trait CaptionFetcher: Send + Sync {
    /// Fetch the caption segments for `video_id`, trying `languages` in order
    async fn fetch(
        &self,
        video_id: &VideoId,
        languages: &[String],
    ) -> Result<Vec<CaptionSegment>, CaptionError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    playability_status: Option<PlayabilityStatus>,
    captions: Option<Captions>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: String,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Captions {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    language_code: String,
    /// `"asr"` for auto-generated tracks
    kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

#[derive(Debug, Deserialize)]
struct Json3Response {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Json3Event {
    t_start_ms: Option<f64>,
    d_duration_ms: Option<f64>,
    segs: Option<Vec<Json3Seg>>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: String,
}

/// Caption client talking to youtube.com
#[derive(Clone)]
pub struct YouTubeCaptionClient {
    client: Client,
}

impl YouTubeCaptionClient {
    /// Create a new client; no request timeout unless configured
    pub fn new(config: &TranscriptConfig) -> Result<Self, CaptionError> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(seconds) = config.request_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    async fn fetch_watch_page(&self, video_id: &VideoId) -> Result<String, CaptionError> {
        let url = format!("{}/watch?v={}", YOUTUBE_BASE_URL, video_id);
        debug!("Fetching watch page: {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept-Language", "en-US")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CaptionError::Http {
                status: response.status().as_u16(),
                url,
            });
        }

        let html = response.text().await?;
        if html.contains("class=\"g-recaptcha\"") {
            return Err(CaptionError::TooManyRequests);
        }

        Ok(html)
    }

    async fn fetch_player_response(
        &self,
        video_id: &VideoId,
        api_key: &str,
    ) -> Result<PlayerResponse, CaptionError> {
        let url = format!("{}/youtubei/v1/player?key={}", YOUTUBE_BASE_URL, api_key);
        let payload = serde_json::json!({
            "context": {
                "client": {
                    "clientName": INNERTUBE_CLIENT_NAME,
                    "clientVersion": INNERTUBE_CLIENT_VERSION
                }
            },
            "videoId": video_id.as_str()
        });

        let response = self.client.post(&url).json(&payload).send().await?;

        if response.status().as_u16() == 429 {
            return Err(CaptionError::TooManyRequests);
        }
        if !response.status().is_success() {
            return Err(CaptionError::Http {
                status: response.status().as_u16(),
                url: format!("{}/youtubei/v1/player", YOUTUBE_BASE_URL),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| CaptionError::Parse(format!("player response: {}", e)))
    }

    async fn fetch_track(&self, track: &CaptionTrack) -> Result<Vec<CaptionSegment>, CaptionError> {
        let url = captions_url(&track.base_url);
        debug!("Fetching {} captions ({})", track.language_code, if track.is_generated() { "generated" } else { "manual" });

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(CaptionError::Http {
                status: response.status().as_u16(),
                url: track.base_url.clone(),
            });
        }

        let body = response.text().await?;
        parse_json3(&body)
    }
}

#[async_trait]
impl CaptionFetcher for YouTubeCaptionClient {
    async fn fetch(
        &self,
        video_id: &VideoId,
        languages: &[String],
    ) -> Result<Vec<CaptionSegment>, CaptionError> {
        let html = self.fetch_watch_page(video_id).await?;
        let api_key = extract_innertube_api_key(&html)
            .ok_or_else(|| CaptionError::Parse("INNERTUBE_API_KEY not found on watch page".to_string()))?;

        let player = self.fetch_player_response(video_id, &api_key).await?;
        let tracks = caption_tracks(player)?;
        let track = select_track(&tracks, languages)?;

        self.fetch_track(track).await
    }
}

fn extract_innertube_api_key(html: &str) -> Option<String> {
    static API_KEY: OnceLock<Option<Regex>> = OnceLock::new();
    API_KEY
        .get_or_init(|| Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#).ok())
        .as_ref()?
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn caption_tracks(player: PlayerResponse) -> Result<Vec<CaptionTrack>, CaptionError> {
    if let Some(status) = player.playability_status {
        if status.status != "OK" {
            let reason = status.reason.unwrap_or(status.status);
            return Err(CaptionError::VideoUnavailable(reason));
        }
    }

    player
        .captions
        .and_then(|c| c.player_captions_tracklist_renderer)
        .map(|r| r.caption_tracks)
        .filter(|tracks| !tracks.is_empty())
        .ok_or(CaptionError::TranscriptsDisabled)
}

/// For each language in order, a manually created track beats a generated one.
fn select_track<'a>(tracks: &'a [CaptionTrack], languages: &[String]) -> Result<&'a CaptionTrack, CaptionError> {
    for language in languages {
        let manual = tracks
            .iter()
            .find(|t| t.language_code == *language && !t.is_generated());
        let generated = || {
            tracks
                .iter()
                .find(|t| t.language_code == *language && t.is_generated())
        };

        if let Some(track) = manual.or_else(generated) {
            return Ok(track);
        }
    }

    let available = tracks
        .iter()
        .map(|t| {
            if t.is_generated() {
                format!("{} (generated)", t.language_code)
            } else {
                t.language_code.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ");

    Err(CaptionError::NoTranscriptFound {
        requested: languages.join(", "),
        available,
    })
}

fn captions_url(base_url: &str) -> String {
    let base = base_url.replace("\\u0026", "&").replace("&fmt=srv3", "");
    if base.contains('?') {
        format!("{}&fmt=json3", base)
    } else {
        format!("{}?fmt=json3", base)
    }
}

fn parse_json3(body: &str) -> Result<Vec<CaptionSegment>, CaptionError> {
    let response: Json3Response = serde_json::from_str(body)
        .map_err(|e| CaptionError::Parse(format!("caption track: {}", e)))?;

    Ok(response
        .events
        .into_iter()
        .filter_map(|event| {
            let segs = event.segs?;
            let text: String = segs.iter().map(|s| s.utf8.as_str()).collect();
            if text.trim().is_empty() {
                return None;
            }

            Some(CaptionSegment {
                text,
                start: event.t_start_ms.unwrap_or(0.0) / 1000.0,
                duration: event.d_duration_ms.unwrap_or(0.0) / 1000.0,
            })
        })
        .collect())
}

//! API module for the YouTube transcript service
//!
//! Request handling lives in `handlers`; `server` (persistent HTTP) and
//! `invocation` (one request per process) are thin transport adapters over it.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;

pub mod handlers;
pub mod invocation;
pub mod models;
pub mod server;

pub use handlers::{StatusPolicy, TranscribeOutcome, TranscriptPipeline};
pub use models::ResponseEnvelope;

pub const CORS_ALLOW_ORIGIN: &str = "*";
pub const CORS_ALLOW_METHODS: &str = "POST, OPTIONS";
pub const CORS_ALLOW_HEADERS: &str = "Content-Type";

/// API Server for handling REST requests
pub struct ApiServer {
    pipeline: Arc<TranscriptPipeline>,
    config: Arc<Config>,
}

impl ApiServer {
    /// Create a server backed by the live YouTube caption client
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let pipeline = Arc::new(TranscriptPipeline::from_config(&config)?);
        Ok(Self { pipeline, config })
    }

    /// Start the API server
    pub async fn start(self) -> Result<()> {
        info!("🚀 Starting API server on {}", self.config.bind_address());

        server::start_http_server(self.config, self.pipeline).await
    }
}

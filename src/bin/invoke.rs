//! Single-invocation entry point: handles exactly one CGI-style request.
//!
//! Logs go to stderr; stdout carries the response.

use anyhow::Result;
use tracing::warn;

use yt_transcript_api::api::invocation::{handle_invocation, InvocationRequest};
use yt_transcript_api::{Config, TranscriptPipeline};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let (config, load_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(config.logging.env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Some(e) = load_error {
        warn!("Failed to load config, using defaults: {}", e);
    }
    let pipeline = TranscriptPipeline::from_config(&config)?;

    let request = InvocationRequest::from_process();
    let response = handle_invocation(&pipeline, request).await;

    let stdout = std::io::stdout();
    response.write_cgi(stdout.lock())?;

    Ok(())
}

use anyhow::Result;
use clap::{Arg, Command};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use yt_transcript_api::{ApiServer, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("YouTube Transcript API")
        .version(env!("CARGO_PKG_VERSION"))
        .author("TigreRoll")
        .about("HTTP API returning YouTube caption transcripts")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to a TOML configuration file")
        )
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("ADDR")
                .help("Bind address (overrides HOST)")
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Listen port (overrides PORT, default 5001)")
                .value_parser(clap::value_parser!(u16))
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue)
        )
        .get_matches();

    // Load configuration before logging so the configured filter applies
    let (mut config, load_error) = match matches.get_one::<String>("config") {
        Some(path) => (Config::load_from(&PathBuf::from(path))?, None),
        None => match Config::load() {
            Ok(config) => (config, None),
            Err(e) => (Config::default(), Some(e)),
        },
    };

    if let Some(host) = matches.get_one::<String>("host") {
        config.server.host = host.clone();
    }
    if let Some(port) = matches.get_one::<u16>("port") {
        config.server.port = *port;
    }

    // Initialize logging
    let filter = if matches.get_flag("verbose") {
        EnvFilter::new("yt_transcript_api=debug,tower_http=debug,info")
    } else {
        config.logging.env_filter()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Some(e) = load_error {
        warn!("Failed to load config, using defaults: {}", e);
    }
    config.validate()?;

    info!("🚀 YouTube Transcript API starting...");
    info!("{}", config.summary());

    ApiServer::new(Arc::new(config))?.start().await
}

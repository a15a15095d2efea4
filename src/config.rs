use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Configuration for the YouTube transcript API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings (persistent deployment only)
    #[serde(default)]
    pub server: ServerConfig,

    /// Caption retrieval settings
    #[serde(default)]
    pub transcript: TranscriptConfig,

    /// Upload endpoint limits
    #[serde(default)]
    pub upload: UploadConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Listen port
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptConfig {
    /// Caption languages in order of preference
    pub languages: Vec<String>,

    /// Timeout for upstream caption requests (seconds), unset means none
    pub request_timeout_seconds: Option<u64>,

    /// User agent sent to YouTube
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Maximum accepted upload size in bytes
    pub max_file_size: u64,

    /// Accepted file extensions, lower-case with leading dot
    pub allowed_extensions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Tracing filter directive
    pub log_level: String,
}

pub const DEFAULT_PORT: u16 = 5001;
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 25 * 1024 * 1024;

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string(), "en-US".to_string(), "en-GB".to_string()],
            request_timeout_seconds: None,
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_UPLOAD_SIZE,
            allowed_extensions: [".mp3", ".m4a", ".wav", ".flac", ".ogg", ".webm", ".mp4"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl LoggingConfig {
    /// Tracing filter for `log_level`, falling back to `info`
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.log_level).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            transcript: TranscriptConfig::default(),
            upload: UploadConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the first config file found, then apply
    /// environment overrides
    pub fn load() -> Result<Self> {
        let config_paths = [
            "yt-transcript.toml",
            "config/yt-transcript.toml",
            "/etc/yt-transcript/config.toml",
        ];

        let mut config = Self::default();
        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str(&config_str) {
                    Ok(parsed) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        config = parsed;
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an explicit file, then apply environment overrides
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Cannot read config file {}: {}", path.display(), e))?;
        let mut config: Config = toml::from_str(&config_str)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path.display(), e))?;
        tracing::info!("📄 Loaded configuration from: {}", path.display());

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(port) = std::env::var("PORT") {
            match port.trim().parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid PORT value: {}", port),
            }
        }

        if let Ok(host) = std::env::var("HOST") {
            if !host.trim().is_empty() {
                self.server.host = host.trim().to_string();
            }
        }

        if let Ok(languages) = std::env::var("YT_TRANSCRIPT_LANGUAGES") {
            let languages = parse_language_list(&languages);
            if !languages.is_empty() {
                self.transcript.languages = languages;
            }
        }

        if let Ok(log_level) = std::env::var("YT_TRANSCRIPT_LOG_LEVEL") {
            self.logging.log_level = log_level;
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &PathBuf) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow!("server.port must be greater than 0"));
        }

        if self.transcript.languages.is_empty() {
            return Err(anyhow!("transcript.languages must name at least one language"));
        }

        if self.upload.max_file_size == 0 {
            return Err(anyhow!("upload.max_file_size must be greater than 0"));
        }

        if self.upload.allowed_extensions.is_empty() {
            return Err(anyhow!("upload.allowed_extensions must not be empty"));
        }

        if let Err(e) = EnvFilter::try_new(&self.logging.log_level) {
            return Err(anyhow!("logging.log_level is not a valid filter: {}", e));
        }

        Ok(())
    }

    /// Socket address string for the HTTP server
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "YouTube Transcript API Configuration:\n\
            - Listen: {}\n\
            - Caption Languages: {}\n\
            - Upstream Timeout: {}\n\
            - Upload Limit: {} bytes\n\
            - Upload Extensions: {}\n\
            - Log Level: {}",
            self.bind_address(),
            self.transcript.languages.join(", "),
            self.transcript
                .request_timeout_seconds
                .map(|s| format!("{}s", s))
                .unwrap_or_else(|| "none".to_string()),
            self.upload.max_file_size,
            self.upload.allowed_extensions.join(", "),
            self.logging.log_level
        )
    }
}

fn parse_language_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|lang| lang.trim().to_string())
        .filter(|lang| !lang.is_empty())
        .collect()
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.config.server.host = host.into();
        self
    }

    pub fn with_languages(mut self, languages: Vec<String>) -> Self {
        self.config.transcript.languages = languages;
        self
    }

    pub fn with_request_timeout(mut self, seconds: u64) -> Self {
        self.config.transcript.request_timeout_seconds = Some(seconds);
        self
    }

    pub fn with_max_upload_size(mut self, bytes: u64) -> Self {
        self.config.upload.max_file_size = bytes;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

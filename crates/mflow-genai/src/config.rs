//! Generation client configuration.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_VIDEO_MODEL: &str = "veo-3.1-fast-generate-preview";

/// Configuration for the generation client.
#[derive(Clone)]
pub struct GenAiConfig {
    /// Base URL of the generative API
    pub base_url: String,
    /// API credential, if one is configured up front
    pub api_key: Option<String>,
    /// Model used for subject validation and motion analysis
    pub text_model: String,
    /// Model used for video synthesis
    pub video_model: String,
    /// Delay between operation status checks
    pub poll_interval: Duration,
    /// Upper bound on status checks; `None` polls until the operation finishes
    pub max_poll_attempts: Option<u32>,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Where downloaded videos are written
    pub output_dir: PathBuf,
}

impl Default for GenAiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            video_model: DEFAULT_VIDEO_MODEL.to_string(),
            poll_interval: Duration::from_secs(8),
            max_poll_attempts: None,
            request_timeout: Duration::from_secs(120),
            output_dir: std::env::temp_dir().join("mflow"),
        }
    }
}

impl GenAiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            base_url: std::env::var("GEMINI_BASE_URL").unwrap_or(defaults.base_url),
            api_key: std::env::var("GEMINI_API_KEY")
                .or_else(|_| std::env::var("API_KEY"))
                .ok()
                .filter(|k| !k.trim().is_empty()),
            text_model: std::env::var("GEMINI_TEXT_MODEL").unwrap_or(defaults.text_model),
            video_model: std::env::var("GEMINI_VIDEO_MODEL").unwrap_or(defaults.video_model),
            poll_interval: Duration::from_secs(
                std::env::var("GEMINI_POLL_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(8),
            ),
            max_poll_attempts: std::env::var("GEMINI_MAX_POLL_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok()),
            request_timeout: Duration::from_secs(
                std::env::var("GEMINI_REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
            output_dir: std::env::var("MFLOW_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
        }
    }
}

impl std::fmt::Debug for GenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenAiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("text_model", &self.text_model)
            .field("video_model", &self.video_model)
            .field("poll_interval", &self.poll_interval)
            .field("max_poll_attempts", &self.max_poll_attempts)
            .field("request_timeout", &self.request_timeout)
            .field("output_dir", &self.output_dir)
            .finish()
    }
}

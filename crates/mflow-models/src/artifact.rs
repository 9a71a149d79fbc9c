//! Results produced by the generation service.

use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Token the validation model returns for acceptable inputs.
pub const VALID_VERDICT: &str = "VALID";

/// Verdict of the subject validation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub message: String,
}

impl ValidationOutcome {
    pub fn valid() -> Self {
        Self {
            valid: true,
            message: "Valid inputs".to_string(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }

    /// Interpret the model's free-text verdict.
    ///
    /// Only the exact token `VALID` (surrounding whitespace ignored) accepts;
    /// any other text is the rejection reason, verbatim.
    pub fn from_verdict(text: &str) -> Self {
        let verdict = text.trim();
        if verdict == VALID_VERDICT {
            Self::valid()
        } else if verdict.is_empty() {
            Self::rejected("Validation failed")
        } else {
            Self::rejected(verdict)
        }
    }
}

/// Motion description extracted from the reference video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MotionDescriptor {
    pub description: String,
    #[serde(default)]
    pub key_moments: Vec<String>,
}

impl MotionDescriptor {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            key_moments: Vec::new(),
        }
    }
}

/// A generated video, downloaded and playable from local disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ArtifactRef {
    /// Remote locator reported by the generation service
    pub source_uri: String,
    /// Local file holding the video
    pub path: PathBuf,
    pub size_bytes: u64,
    pub mime_type: String,
}

//! Generation modes, media inputs and per-run requests.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use base64::prelude::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default MIME type for identity images.
pub const DEFAULT_IMAGE_MIME: &str = "image/png";
/// Default MIME type for reference videos.
pub const DEFAULT_VIDEO_MIME: &str = "video/mp4";

/// Which pipeline a run goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// Identity image + reference video -> performance video
    #[default]
    Transfer,
    /// Text prompt -> generated video
    Dream,
}

impl GenerationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::Transfer => "transfer",
            GenerationMode::Dream => "dream",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GenerationMode::Transfer => "Neural Transfer",
            GenerationMode::Dream => "Dream Engine",
        }
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GenerationMode {
    type Err = ModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "transfer" => Ok(GenerationMode::Transfer),
            "dream" => Ok(GenerationMode::Dream),
            _ => Err(ModeParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown generation mode: {0}")]
pub struct ModeParseError(String);

/// A user-selected media file held in memory.
///
/// The payload is shared, so cloning a `MediaInput` into a run snapshot does
/// not copy the bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct MediaInput {
    data: Arc<[u8]>,
    mime_type: String,
    /// Locally renderable preview handle (a path or URL supplied by the capture side)
    pub preview: Option<String>,
}

impl MediaInput {
    pub fn new(data: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        Self {
            data: Arc::from(data.into()),
            mime_type: mime_type.into(),
            preview: None,
        }
    }

    /// Attach a preview handle.
    pub fn with_preview(mut self, preview: impl Into<String>) -> Self {
        self.preview = Some(preview.into());
        self
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Standard base64 encoding of the payload, as expected by inline-data parts.
    pub fn to_base64(&self) -> String {
        BASE64_STANDARD.encode(&self.data)
    }
}

impl fmt::Debug for MediaInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaInput")
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.data.len())
            .field("preview", &self.preview)
            .finish()
    }
}

/// Inputs missing when a run is requested. Never a failure state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Missing required media files")]
    MissingMedia,

    #[error("Please enter a prompt for Dream Engine")]
    EmptyPrompt,
}

/// One run's mode-specific payload. Exactly one variant is active.
#[derive(Debug, Clone)]
pub enum GenerationRequest {
    Transfer {
        identity_image: MediaInput,
        reference_video: MediaInput,
    },
    Dream {
        prompt: String,
    },
}

impl GenerationRequest {
    /// Build a request from whatever the user has entered so far.
    ///
    /// Media must be present with a non-empty payload; the prompt must be
    /// non-blank after trimming but is carried verbatim.
    pub fn from_inputs(
        mode: GenerationMode,
        identity_image: Option<&MediaInput>,
        reference_video: Option<&MediaInput>,
        prompt: &str,
    ) -> Result<Self, InputError> {
        match mode {
            GenerationMode::Transfer => match (identity_image, reference_video) {
                (Some(image), Some(video)) if !image.is_empty() && !video.is_empty() => {
                    Ok(GenerationRequest::Transfer {
                        identity_image: image.clone(),
                        reference_video: video.clone(),
                    })
                }
                _ => Err(InputError::MissingMedia),
            },
            GenerationMode::Dream => {
                if prompt.trim().is_empty() {
                    Err(InputError::EmptyPrompt)
                } else {
                    Ok(GenerationRequest::Dream {
                        prompt: prompt.to_string(),
                    })
                }
            }
        }
    }

    pub fn mode(&self) -> GenerationMode {
        match self {
            GenerationRequest::Transfer { .. } => GenerationMode::Transfer,
            GenerationRequest::Dream { .. } => GenerationMode::Dream,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> MediaInput {
        MediaInput::new(vec![0x89, b'P', b'N', b'G'], DEFAULT_IMAGE_MIME)
    }

    fn video() -> MediaInput {
        MediaInput::new(vec![0, 0, 0, 0x18, b'f', b't', b'y', b'p'], DEFAULT_VIDEO_MIME)
    }

    #[test]
    fn test_transfer_requires_both_media() {
        let img = image();
        let vid = video();
        assert_eq!(
            GenerationRequest::from_inputs(GenerationMode::Transfer, Some(&img), None, "")
                .unwrap_err(),
            InputError::MissingMedia
        );
        assert_eq!(
            GenerationRequest::from_inputs(GenerationMode::Transfer, None, Some(&vid), "")
                .unwrap_err(),
            InputError::MissingMedia
        );

        let request =
            GenerationRequest::from_inputs(GenerationMode::Transfer, Some(&img), Some(&vid), "")
                .unwrap();
        assert_eq!(request.mode(), GenerationMode::Transfer);
    }

    #[test]
    fn test_transfer_rejects_empty_payload() {
        let empty = MediaInput::new(Vec::new(), DEFAULT_IMAGE_MIME);
        let vid = video();
        assert!(GenerationRequest::from_inputs(
            GenerationMode::Transfer,
            Some(&empty),
            Some(&vid),
            ""
        )
        .is_err());
    }

    #[test]
    fn test_dream_prompt_trimmed_for_check_only() {
        assert_eq!(
            GenerationRequest::from_inputs(GenerationMode::Dream, None, None, "   \n").unwrap_err(),
            InputError::EmptyPrompt
        );

        let request =
            GenerationRequest::from_inputs(GenerationMode::Dream, None, None, "  a cat ").unwrap();
        match request {
            GenerationRequest::Dream { prompt } => assert_eq!(prompt, "  a cat "),
            other => panic!("Expected Dream request, got {:?}", other),
        }
    }

    #[test]
    fn test_media_base64() {
        let media = MediaInput::new(b"hello".to_vec(), "image/png");
        assert_eq!(media.to_base64(), "aGVsbG8=");
        assert_eq!(media.len(), 5);
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("Dream".parse::<GenerationMode>().unwrap(), GenerationMode::Dream);
        assert!("remix".parse::<GenerationMode>().is_err());
        assert_eq!(GenerationMode::default(), GenerationMode::Transfer);
    }
}

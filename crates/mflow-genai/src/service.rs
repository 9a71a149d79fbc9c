//! The generation service seam.
//!
//! The orchestrator depends only on [`GenerationService`]; [`GeminiClient`]
//! is the production implementation.
//!
//! [`GeminiClient`]: crate::client::GeminiClient

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use mflow_models::{
    ArtifactRef, CinematicSettings, GenerationMode, MediaInput, MotionDescriptor, ValidationOutcome,
};

use crate::error::GenAiResult;

/// Mode-specific content of a synthesis request.
#[derive(Debug, Clone)]
pub enum SynthesisPayload {
    /// Identity image plus the motion description from the analysis step
    Transfer {
        identity_image: MediaInput,
        motion_description: String,
    },
    /// Raw user prompt
    Dream { prompt: String },
}

impl SynthesisPayload {
    pub fn mode(&self) -> GenerationMode {
        match self {
            SynthesisPayload::Transfer { .. } => GenerationMode::Transfer,
            SynthesisPayload::Dream { .. } => GenerationMode::Dream,
        }
    }

    /// Conditioning image, if the mode uses one.
    pub fn identity_image(&self) -> Option<&MediaInput> {
        match self {
            SynthesisPayload::Transfer { identity_image, .. } => Some(identity_image),
            SynthesisPayload::Dream { .. } => None,
        }
    }
}

/// Everything the synthesis step needs.
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    /// Settings snapshot taken when the step was invoked
    pub settings: CinematicSettings,
    pub payload: SynthesisPayload,
}

impl SynthesisRequest {
    pub fn new(settings: CinematicSettings, payload: SynthesisPayload) -> Self {
        Self { settings, payload }
    }

    pub fn mode(&self) -> GenerationMode {
        self.payload.mode()
    }

    /// Full instruction text for this request.
    pub fn prompt(&self) -> String {
        crate::prompt::compose_prompt(&self.settings, &self.payload)
    }
}

/// Remote operations of the generative engine.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Check that the image shows exactly one realistic human and the video
    /// exactly one human performer.
    ///
    /// Fails closed: transport or API errors come back as a rejection with a
    /// generic message, never as an error.
    async fn validate(&self, identity_image: &MediaInput, reference_video: &MediaInput)
        -> ValidationOutcome;

    /// Describe the performer's motion in the reference video.
    async fn analyze_motion(&self, reference_video: &MediaInput) -> GenAiResult<MotionDescriptor>;

    /// Start synthesis, wait for the long-running operation and fetch the
    /// first generated video.
    ///
    /// Cancelling `cancel` stops the wait at its next suspension point.
    async fn synthesize(
        &self,
        request: &SynthesisRequest,
        cancel: &CancellationToken,
    ) -> GenAiResult<ArtifactRef>;
}

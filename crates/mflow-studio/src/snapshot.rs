//! Read-only view of the orchestrator for presentation layers.

use serde::Serialize;

use mflow_models::{
    ArtifactRef, CinematicSettings, GenerationMode, InputError, MotionDescriptor, RunLog,
    StageProgress, WorkflowState, DISPLAY_STAGES,
};

/// Point-in-time copy of everything a presentation layer renders.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudioSnapshot {
    /// Identifier of the most recent run; bumped on every run start and reset
    pub run_id: u64,
    pub state: WorkflowState,
    pub mode: GenerationMode,
    pub settings: CinematicSettings,
    pub logs: RunLog,
    pub motion: Option<MotionDescriptor>,
    pub result: Option<ArtifactRef>,
    pub failure_reason: Option<String>,
    pub has_identity_image: bool,
    pub has_reference_video: bool,
    pub prompt: String,
    /// Why a start would be rejected right now, if it would
    #[serde(skip)]
    pub missing_input: Option<InputError>,
}

impl StudioSnapshot {
    /// Progress of each display stage, in display order.
    pub fn stages(&self) -> [(WorkflowState, StageProgress); 4] {
        let mut stages = [(WorkflowState::Validating, StageProgress::Pending); 4];
        for (index, stage) in DISPLAY_STAGES.iter().enumerate() {
            stages[index] = (*stage, self.state.stage_progress(index));
        }
        stages
    }

    /// Whether a start intent would begin a run.
    pub fn is_ready(&self) -> bool {
        !self.state.is_busy() && self.missing_input.is_none()
    }
}

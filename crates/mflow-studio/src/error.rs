//! Orchestrator error types.

use thiserror::Error;

use mflow_genai::GenAiError;
use mflow_models::{InputError, WorkflowState};

pub type StudioResult<T> = Result<T, StudioError>;

/// Reasons a run ends without an artifact.
///
/// The `Display` text is what the user sees, both as the stored failure
/// reason and as the matching error log entry.
#[derive(Debug, Error)]
pub enum StudioError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("{reason}")]
    StageFailure { stage: WorkflowState, reason: String },

    #[error(transparent)]
    GenAi(#[from] GenAiError),

    /// The run was reset or replaced while a remote call was in flight.
    #[error("Run superseded")]
    Superseded,
}

impl StudioError {
    pub fn stage_failure(stage: WorkflowState, reason: impl Into<String>) -> Self {
        Self::StageFailure {
            stage,
            reason: reason.into(),
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, StudioError::Superseded)
    }
}

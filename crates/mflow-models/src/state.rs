//! Workflow state and stage progress.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// State of the generation workflow. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    /// Waiting for a start intent
    #[default]
    Idle,
    /// Start was requested without a usable credential
    AwaitingCredential,
    /// Checking subjects in the identity image and reference video
    Validating,
    /// Extracting a motion description from the reference video
    Analyzing,
    /// Synthesis request issued, polling for completion
    Generating,
    /// Artifact produced
    Completed,
    /// Run ended with a failure reason
    Failed,
}

/// Stages shown in the progress view, in order.
pub const DISPLAY_STAGES: [WorkflowState; 4] = [
    WorkflowState::Validating,
    WorkflowState::Analyzing,
    WorkflowState::Generating,
    WorkflowState::Completed,
];

/// Progress of one display stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StageProgress {
    Pending,
    Active,
    Done,
}

impl WorkflowState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "idle",
            WorkflowState::AwaitingCredential => "awaiting_credential",
            WorkflowState::Validating => "validating",
            WorkflowState::Analyzing => "analyzing",
            WorkflowState::Generating => "generating",
            WorkflowState::Completed => "completed",
            WorkflowState::Failed => "failed",
        }
    }

    /// Completed and Failed end a run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowState::Completed | WorkflowState::Failed)
    }

    /// A run is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            WorkflowState::Validating | WorkflowState::Analyzing | WorkflowState::Generating
        )
    }

    pub fn allows_mode_switch(&self) -> bool {
        matches!(
            self,
            WorkflowState::Idle | WorkflowState::AwaitingCredential | WorkflowState::Failed
        )
    }

    /// Position within [`DISPLAY_STAGES`], if this state is shown there.
    pub fn stage_index(&self) -> Option<usize> {
        DISPLAY_STAGES.iter().position(|s| s == self)
    }

    /// Progress of the display stage at `index` given the current state.
    pub fn stage_progress(&self, index: usize) -> StageProgress {
        match self.stage_index() {
            Some(current) if current == index => StageProgress::Active,
            Some(current) if index < current => StageProgress::Done,
            _ => StageProgress::Pending,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "Idle",
            WorkflowState::AwaitingCredential => "API Key Required",
            WorkflowState::Validating => "Validation",
            WorkflowState::Analyzing => "Analysis",
            WorkflowState::Generating => "Synthesis",
            WorkflowState::Completed => "Final Output",
            WorkflowState::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_and_busy() {
        assert!(WorkflowState::Completed.is_terminal());
        assert!(WorkflowState::Failed.is_terminal());
        assert!(!WorkflowState::Generating.is_terminal());

        assert!(WorkflowState::Validating.is_busy());
        assert!(WorkflowState::Analyzing.is_busy());
        assert!(!WorkflowState::AwaitingCredential.is_busy());
    }

    #[test]
    fn test_mode_switch_allowed() {
        assert!(WorkflowState::Idle.allows_mode_switch());
        assert!(WorkflowState::Failed.allows_mode_switch());
        assert!(!WorkflowState::Generating.allows_mode_switch());
        assert!(!WorkflowState::Completed.allows_mode_switch());
    }

    #[test]
    fn test_stage_progress() {
        let state = WorkflowState::Generating;
        assert_eq!(state.stage_progress(0), StageProgress::Done);
        assert_eq!(state.stage_progress(1), StageProgress::Done);
        assert_eq!(state.stage_progress(2), StageProgress::Active);
        assert_eq!(state.stage_progress(3), StageProgress::Pending);

        let done = WorkflowState::Completed;
        assert_eq!(done.stage_progress(2), StageProgress::Done);
        assert_eq!(done.stage_progress(3), StageProgress::Active);

        assert_eq!(WorkflowState::Idle.stage_progress(0), StageProgress::Pending);
    }
}

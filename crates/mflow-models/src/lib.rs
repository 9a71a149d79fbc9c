//! Shared data models for the MotionFlow generation workflow.
//!
//! This crate provides Serde-serializable types for:
//! - Cinematic settings (aspect ratio, color grade, atmospheric FX, resolution)
//! - Generation requests and media inputs
//! - Run log entries
//! - Workflow state and stage progress
//! - Intermediate and final artifacts (motion descriptors, validation verdicts, videos)

pub mod artifact;
pub mod log;
pub mod request;
pub mod settings;
pub mod state;

// Re-export common types
pub use artifact::{ArtifactRef, MotionDescriptor, ValidationOutcome, VALID_VERDICT};
pub use log::{LogEntry, LogSeverity, RunLog};
pub use request::{
    GenerationMode, GenerationRequest, InputError, MediaInput, ModeParseError, DEFAULT_IMAGE_MIME,
    DEFAULT_VIDEO_MIME,
};
pub use settings::{
    AspectRatio, AtmosphericFx, CinematicSettings, ColorGrade, Resolution, SettingParseError,
};
pub use state::{StageProgress, WorkflowState, DISPLAY_STAGES};

//! Workflow metrics.

use metrics::counter;

use mflow_models::{GenerationMode, WorkflowState};

pub mod names {
    /// Runs by mode and terminal outcome.
    pub const RUNS_TOTAL: &str = "mflow_runs_total";

    /// Failed runs by the stage that was active.
    pub const STAGE_FAILURES_TOTAL: &str = "mflow_stage_failures_total";

    /// Results discarded because their run was reset or replaced.
    pub const STALE_RESULTS_TOTAL: &str = "mflow_stale_results_total";
}

pub fn record_run(mode: GenerationMode, outcome: &'static str) {
    counter!(names::RUNS_TOTAL, "mode" => mode.as_str(), "outcome" => outcome).increment(1);
}

pub fn record_stage_failure(stage: WorkflowState) {
    counter!(names::STAGE_FAILURES_TOTAL, "stage" => stage.as_str()).increment(1);
}

pub fn record_stale_result() {
    counter!(names::STALE_RESULTS_TOTAL).increment(1);
}

//! Workflow orchestrator.
//!
//! A [`Studio`] owns the workflow state, the user's inputs and the run log.
//! Starting a run sequences the remote calls for the selected mode:
//!
//! - Transfer: validate -> analyze motion -> synthesize
//! - Dream: synthesize
//!
//! Each run carries an identifier and a cancellation token. A reset or a new
//! run bumps the identifier and cancels the token; results that arrive for an
//! older run are discarded rather than applied.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use mflow_genai::{GenerationService, SynthesisPayload, SynthesisRequest};
use mflow_models::{
    ArtifactRef, CinematicSettings, GenerationMode, GenerationRequest, InputError, LogEntry,
    LogSeverity, MediaInput, MotionDescriptor, RunLog, WorkflowState,
};

use crate::credential::CredentialGate;
use crate::error::{StudioError, StudioResult};
use crate::metrics::{record_run, record_stage_failure, record_stale_result};
use crate::snapshot::StudioSnapshot;

/// Failure reason when motion extraction errors.
pub const MOTION_FAILURE_MESSAGE: &str = "Failed to extract motion data.";

/// Success log appended when a run completes.
pub const COMPLETION_MESSAGE: &str = "Neural Synthesis Complete.";

/// How a start intent ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The run produced an artifact
    Completed(ArtifactRef),
    /// The run failed with the given reason
    Failed(String),
    /// Required input was missing; no run started
    Rejected(InputError),
    /// No credential is configured; state moved to AwaitingCredential
    AwaitingCredential,
    /// A run is already in flight; the intent was ignored
    Busy,
    /// The run was reset or replaced before it finished
    Superseded,
    /// Nothing to resume
    Ignored,
}

/// Identity of one run.
#[derive(Debug, Clone)]
struct RunTicket {
    id: u64,
    cancel: CancellationToken,
}

#[derive(Debug, Default)]
struct Session {
    state: WorkflowState,
    mode: GenerationMode,
    settings: CinematicSettings,
    identity_image: Option<MediaInput>,
    reference_video: Option<MediaInput>,
    prompt: String,
    logs: RunLog,
    motion: Option<MotionDescriptor>,
    result: Option<ArtifactRef>,
    failure_reason: Option<String>,
    run_id: u64,
    cancel: CancellationToken,
}

impl Session {
    fn request(&self) -> Result<GenerationRequest, InputError> {
        GenerationRequest::from_inputs(
            self.mode,
            self.identity_image.as_ref(),
            self.reference_video.as_ref(),
            &self.prompt,
        )
    }

    fn push_log(&mut self, entry: LogEntry) {
        match entry.severity {
            LogSeverity::Error => error!(run_id = self.run_id, "{}", entry.message),
            LogSeverity::Warning => warn!(run_id = self.run_id, "{}", entry.message),
            LogSeverity::Info | LogSeverity::Success => {
                info!(run_id = self.run_id, "{}", entry.message)
            }
        }
        self.logs.push(entry);
    }

    fn transition(&mut self, state: WorkflowState) {
        debug!(run_id = self.run_id, "State {} -> {}", self.state, state);
        self.state = state;
    }

    fn snapshot(&self) -> StudioSnapshot {
        StudioSnapshot {
            run_id: self.run_id,
            state: self.state,
            mode: self.mode,
            settings: self.settings,
            logs: self.logs.clone(),
            motion: self.motion.clone(),
            result: self.result.clone(),
            failure_reason: self.failure_reason.clone(),
            has_identity_image: self.identity_image.as_ref().is_some_and(|m| !m.is_empty()),
            has_reference_video: self.reference_video.as_ref().is_some_and(|m| !m.is_empty()),
            prompt: self.prompt.clone(),
            missing_input: self.request().err(),
        }
    }
}

/// The generation workflow orchestrator.
///
/// Methods take `&self`; share a studio across tasks with `Arc<Studio<..>>`.
/// The session lock is never held across a remote call.
pub struct Studio<S, G> {
    service: Arc<S>,
    gate: G,
    session: Mutex<Session>,
    snapshots: watch::Sender<StudioSnapshot>,
}

impl<S, G> Studio<S, G>
where
    S: GenerationService,
    G: CredentialGate,
{
    pub fn new(service: Arc<S>, gate: G) -> Self {
        Self::with_settings(service, gate, CinematicSettings::default())
    }

    pub fn with_settings(service: Arc<S>, gate: G, settings: CinematicSettings) -> Self {
        let session = Session {
            settings,
            ..Default::default()
        };
        let (snapshots, _) = watch::channel(session.snapshot());

        Self {
            service,
            gate,
            session: Mutex::new(session),
            snapshots,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mutate the session and publish the resulting snapshot.
    fn update<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut session = self.lock();
        let out = f(&mut session);
        self.snapshots.send_replace(session.snapshot());
        out
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn state(&self) -> WorkflowState {
        self.lock().state
    }

    pub fn snapshot(&self) -> StudioSnapshot {
        self.lock().snapshot()
    }

    /// Receive a fresh snapshot after every change.
    pub fn subscribe(&self) -> watch::Receiver<StudioSnapshot> {
        self.snapshots.subscribe()
    }

    /// Whether a start intent would begin a run with the current inputs.
    pub fn is_ready(&self) -> bool {
        let session = self.lock();
        !session.state.is_busy() && session.request().is_ok()
    }

    // =========================================================================
    // Inputs
    // =========================================================================

    /// Switch modes. Only allowed while idle, awaiting a credential or failed;
    /// inputs entered for the other mode are kept.
    pub fn set_mode(&self, mode: GenerationMode) -> bool {
        self.update(|session| {
            if !session.state.allows_mode_switch() {
                debug!("Ignoring mode switch to {} while {}", mode, session.state);
                return false;
            }
            session.mode = mode;
            true
        })
    }

    /// Replace the cinematic settings. A run already in flight keeps the
    /// settings it started with.
    pub fn update_settings(&self, settings: CinematicSettings) {
        self.update(|session| session.settings = settings);
    }

    pub fn set_identity_image(&self, image: Option<MediaInput>) {
        self.update(|session| session.identity_image = image);
    }

    pub fn set_reference_video(&self, video: Option<MediaInput>) {
        self.update(|session| session.reference_video = video);
    }

    pub fn set_prompt(&self, prompt: impl Into<String>) {
        let prompt = prompt.into();
        self.update(|session| session.prompt = prompt);
    }

    // =========================================================================
    // Run lifecycle
    // =========================================================================

    /// Return to Idle, abandoning any run in flight.
    ///
    /// Clears the run log, intermediate and final results, the failure reason,
    /// both media inputs and the prompt. Settings and mode are kept.
    pub fn reset(&self) {
        self.update(|session| {
            session.cancel.cancel();
            session.run_id += 1;
            info!(run_id = session.run_id, "Studio reset from {}", session.state);

            session.state = WorkflowState::Idle;
            session.logs.clear();
            session.motion = None;
            session.result = None;
            session.failure_reason = None;
            session.identity_image = None;
            session.reference_video = None;
            session.prompt.clear();
        });
    }

    /// Re-enter a run that stopped for a missing credential.
    pub async fn resume_after_credential(&self) -> RunOutcome {
        if self.state() != WorkflowState::AwaitingCredential {
            debug!("No run awaiting a credential");
            return RunOutcome::Ignored;
        }
        self.start().await
    }

    /// Start a run with the current mode, inputs and settings.
    ///
    /// Ignored while another run is in flight. Missing inputs are reported
    /// in the log without changing state; a missing credential moves to
    /// AwaitingCredential. Otherwise the stages run to Completed or Failed.
    pub async fn start(&self) -> RunOutcome {
        let (ticket, request, settings) = match self.begin_run() {
            Ok(run) => run,
            Err(outcome) => return outcome,
        };
        let mode = request.mode();

        let result = self.execute(&ticket, request, settings).await;
        self.finish(&ticket, mode, result)
    }

    fn begin_run(
        &self,
    ) -> Result<(RunTicket, GenerationRequest, CinematicSettings), RunOutcome> {
        self.update(|session| {
            if session.state.is_busy() {
                debug!(run_id = session.run_id, "Start ignored while {}", session.state);
                return Err(RunOutcome::Busy);
            }

            let request = match session.request() {
                Ok(request) => request,
                Err(e) => {
                    session.push_log(LogEntry::error(e.to_string()));
                    return Err(RunOutcome::Rejected(e));
                }
            };

            if !self.gate.has_credential() {
                info!("No API credential configured, waiting for one");
                session.transition(WorkflowState::AwaitingCredential);
                return Err(RunOutcome::AwaitingCredential);
            }

            session.run_id += 1;
            session.cancel = CancellationToken::new();
            session.logs.clear();
            session.motion = None;
            session.result = None;
            session.failure_reason = None;

            let settings = session.settings;
            info!(
                run_id = session.run_id,
                "Starting {} run ({})",
                request.mode(),
                settings.aspect_ratio
            );

            match request.mode() {
                GenerationMode::Transfer => {
                    session.transition(WorkflowState::Validating);
                    session.push_log(LogEntry::info("Validating human subjects..."));
                }
                GenerationMode::Dream => {
                    session.transition(WorkflowState::Generating);
                    session.push_log(LogEntry::info(format!(
                        "Dreaming cinematic sequence with {} effects at {}...",
                        settings.fx, settings.resolution
                    )));
                }
            }

            let ticket = RunTicket {
                id: session.run_id,
                cancel: session.cancel.clone(),
            };
            Ok((ticket, request, settings))
        })
    }

    async fn execute(
        &self,
        ticket: &RunTicket,
        request: GenerationRequest,
        settings: CinematicSettings,
    ) -> StudioResult<ArtifactRef> {
        let payload = match request {
            GenerationRequest::Transfer {
                identity_image,
                reference_video,
            } => {
                let verdict = self.service.validate(&identity_image, &reference_video).await;
                self.ensure_current(ticket)?;
                if !verdict.valid {
                    return Err(StudioError::stage_failure(
                        WorkflowState::Validating,
                        verdict.message,
                    ));
                }

                self.enter_stage(
                    ticket,
                    WorkflowState::Analyzing,
                    LogEntry::info("Extracting motion data from reference..."),
                )?;

                let motion = self.service.analyze_motion(&reference_video).await;
                self.ensure_current(ticket)?;
                let motion = motion.map_err(|e| {
                    warn!(run_id = ticket.id, "Motion extraction failed: {}", e);
                    StudioError::stage_failure(WorkflowState::Analyzing, MOTION_FAILURE_MESSAGE)
                })?;
                let motion_description = motion.description.clone();

                self.update(|session| session.motion = Some(motion));
                self.enter_stage(
                    ticket,
                    WorkflowState::Generating,
                    LogEntry::info(format!(
                        "Synthesizing motion onto character with {} grading at {}...",
                        settings.color_grade, settings.resolution
                    )),
                )?;

                SynthesisPayload::Transfer {
                    identity_image,
                    motion_description,
                }
            }
            GenerationRequest::Dream { prompt } => SynthesisPayload::Dream { prompt },
        };

        let request = SynthesisRequest::new(settings, payload);
        let artifact = self.service.synthesize(&request, &ticket.cancel).await;
        self.ensure_current(ticket)?;

        Ok(artifact?)
    }

    fn ensure_current(&self, ticket: &RunTicket) -> StudioResult<()> {
        if self.lock().run_id == ticket.id {
            Ok(())
        } else {
            Err(StudioError::Superseded)
        }
    }

    fn enter_stage(
        &self,
        ticket: &RunTicket,
        state: WorkflowState,
        entry: LogEntry,
    ) -> StudioResult<()> {
        self.update(|session| {
            if session.run_id != ticket.id {
                return Err(StudioError::Superseded);
            }
            session.transition(state);
            session.push_log(entry);
            Ok(())
        })
    }

    /// Apply a run's result, unless the run is no longer current.
    fn finish(
        &self,
        ticket: &RunTicket,
        mode: GenerationMode,
        result: StudioResult<ArtifactRef>,
    ) -> RunOutcome {
        self.update(|session| {
            let superseded = result.as_ref().is_err_and(StudioError::is_superseded);
            if session.run_id != ticket.id || superseded {
                info!(run_id = ticket.id, "Discarding result of superseded run");
                record_stale_result();
                return RunOutcome::Superseded;
            }

            session.motion = None;

            match result {
                Ok(artifact) => {
                    session.result = Some(artifact.clone());
                    session.transition(WorkflowState::Completed);
                    session.push_log(LogEntry::success(COMPLETION_MESSAGE));
                    record_run(mode, "completed");
                    RunOutcome::Completed(artifact)
                }
                Err(e) => {
                    let reason = e.to_string();
                    record_stage_failure(session.state);
                    record_run(mode, "failed");

                    session.failure_reason = Some(reason.clone());
                    session.transition(WorkflowState::Failed);
                    session.push_log(LogEntry::error(reason.clone()));
                    RunOutcome::Failed(reason)
                }
            }
        })
    }
}

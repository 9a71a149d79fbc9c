//! Generation workflow orchestrator.
//!
//! This crate provides:
//! - The [`Studio`] state machine driving validate, analyze and synthesize
//! - The [`CredentialGate`] seam and a key-store backed implementation
//! - Observable snapshots for presentation layers
//! - Run identity so abandoned runs never overwrite newer state

pub mod credential;
pub mod error;
pub mod metrics;
pub mod snapshot;
pub mod studio;


pub use credential::{CredentialGate, KeyStoreGate};
pub use error::{StudioError, StudioResult};
pub use snapshot::StudioSnapshot;
pub use studio::{RunOutcome, Studio, COMPLETION_MESSAGE, MOTION_FAILURE_MESSAGE};

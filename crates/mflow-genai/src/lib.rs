//! Generative media API client.
//!
//! This crate provides:
//! - The [`GenerationService`] seam used by the orchestrator
//! - A Gemini/Veo REST client implementing it
//! - Prompt composition from cinematic settings
//! - A shared, late-bindable API credential store

pub mod client;
pub mod config;
pub mod credential;
pub mod error;
pub mod metrics;
pub mod prompt;
pub mod service;
pub mod types;


pub use client::{GeminiClient, FALLBACK_MOTION_DESCRIPTION, VALIDATION_ERROR_MESSAGE};
pub use config::GenAiConfig;
pub use credential::ApiKeyStore;
pub use error::{GenAiError, GenAiResult};
pub use prompt::compose_prompt;
pub use service::{GenerationService, SynthesisPayload, SynthesisRequest};

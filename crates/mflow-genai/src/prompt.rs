//! Instruction text sent to the models.
//!
//! Synthesis prompts are assembled from a mode-specific core instruction, an
//! optional grade clause, an optional FX clause and a fixed closing clause.
//! Composition is pure: the same settings and payload always yield the same
//! string.

use mflow_models::{AtmosphericFx, CinematicSettings, ColorGrade};

use crate::service::SynthesisPayload;

/// Instruction for subject validation. The model answers `VALID` or a reason.
pub const VALIDATION_PROMPT: &str = "Analyze these two inputs:
1. An image
2. A video (encoded in base64)
CRITICAL VALIDATION RULES:
- The IMAGE must contain exactly ONE realistic human character.
- The VIDEO must contain exactly ONE human performer.
- No anime, cartoon, illustration, CGI, or multiple people.
- No identity guessing or real-person naming.
If inputs are valid, return \"VALID\". If not, provide a polite reason why.";

/// Instruction for motion extraction.
pub const MOTION_PROMPT: &str = "Analyze the provided video for full-body motion and performance style.
IGNORE identity/clothing. EXTRACT ONLY:
- Movement rhythm/energy
- Specific actions/dance steps
- Hand/head coordination
Produce a detailed motion description for a cinematic transfer.";

/// Closing clause appended to every synthesis prompt.
pub const QUALITY_CLAUSE: &str = "Highest quality neural render, stabilized camera, sharp detail.";

/// Style description for a color grade; `None` for the flat grade.
pub fn grade_description(grade: ColorGrade) -> Option<&'static str> {
    match grade {
        ColorGrade::None => None,
        ColorGrade::TealOrange => {
            Some("high-contrast teal and orange cinematic color grading, professional Hollywood look")
        }
        ColorGrade::Noir => Some("moody black and white cinematic noir, dramatic shadows and lighting"),
        ColorGrade::Cyber => {
            Some("vibrant neon cyberpunk aesthetic, pink and blue accents, high saturation")
        }
        ColorGrade::Golden => {
            Some("warm golden hour lighting, soft sun-drenched atmosphere, amber tones")
        }
    }
}

/// Atmosphere description for an effect; `None` for no effect.
pub fn fx_description(fx: AtmosphericFx) -> Option<&'static str> {
    match fx {
        AtmosphericFx::None => None,
        AtmosphericFx::Particles => Some("subtle floating dust particles and micro-embers in the air"),
        AtmosphericFx::Mist => Some("ethereal low-lying mist and soft atmospheric fog"),
        AtmosphericFx::Flares => Some("cinematic anamorphic lens flares and subtle light leaks"),
    }
}

/// Grade clause as it appears in the prompt, empty for the flat grade.
pub fn grade_clause(grade: ColorGrade) -> String {
    grade_description(grade)
        .map(|d| format!(" Style with {}.", d))
        .unwrap_or_default()
}

/// FX clause as it appears in the prompt, empty for no effect.
pub fn fx_clause(fx: AtmosphericFx) -> String {
    fx_description(fx)
        .map(|d| format!(" Include {}.", d))
        .unwrap_or_default()
}

/// Mode-specific core instruction.
pub fn core_instruction(payload: &SynthesisPayload) -> String {
    match payload {
        SynthesisPayload::Transfer {
            motion_description, ..
        } => format!(
            "Perform a cinematic motion transfer. Target Identity: Provided image. Action: {}. \
             Preserve skin texture, clothing, and facial structure perfectly.",
            motion_description
        ),
        SynthesisPayload::Dream { prompt } => format!(
            "Generate a high-fidelity cinematic video of: {}. Focus on realistic textures and physics.",
            prompt
        ),
    }
}

/// Assemble the full synthesis instruction.
pub fn compose_prompt(settings: &CinematicSettings, payload: &SynthesisPayload) -> String {
    format!(
        "{}{}{} {}",
        core_instruction(payload),
        grade_clause(settings.color_grade),
        fx_clause(settings.fx),
        QUALITY_CLAUSE
    )
}

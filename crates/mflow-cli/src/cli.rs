use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use mflow_genai::{GeminiClient, GenAiConfig};
use mflow_models::{
    ArtifactRef, AspectRatio, AtmosphericFx, CinematicSettings, ColorGrade, GenerationMode,
    LogSeverity, Resolution,
};
use mflow_studio::{KeyStoreGate, RunOutcome, Studio, StudioSnapshot};

use crate::media::{load_media, MediaKind};

#[derive(Debug, Parser)]
#[command(name = "mflow", about = "MotionFlow cinematic video generation", version)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Transfer the motion of a reference video onto the person in an image
    Transfer(TransferArgs),
    /// Generate a video from a text prompt
    Dream(DreamArgs),
    /// List the available cinematic settings
    Settings,
}

#[derive(Debug, Args, Clone)]
struct TransferArgs {
    /// Identity image (png, jpg, webp)
    #[arg(long)]
    image: PathBuf,
    /// Reference performance video (mp4, mov, webm)
    #[arg(long)]
    video: PathBuf,
    #[command(flatten)]
    settings: SettingsArgs,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Args, Clone)]
struct DreamArgs {
    #[arg(long)]
    prompt: String,
    #[command(flatten)]
    settings: SettingsArgs,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Args, Clone)]
struct SettingsArgs {
    #[arg(long, default_value_t = AspectRatio::default())]
    aspect_ratio: AspectRatio,
    #[arg(long, default_value_t = ColorGrade::default())]
    grade: ColorGrade,
    #[arg(long, default_value_t = AtmosphericFx::default())]
    fx: AtmosphericFx,
    #[arg(long, default_value_t = Resolution::default())]
    resolution: Resolution,
}

impl From<SettingsArgs> for CinematicSettings {
    fn from(args: SettingsArgs) -> Self {
        CinematicSettings::new(args.aspect_ratio, args.grade, args.fx, args.resolution)
    }
}

#[derive(Debug, Args, Clone)]
struct OutputArgs {
    /// Copy the generated video to this path
    #[arg(long)]
    out: Option<PathBuf>,
    /// Directory for downloaded videos (overrides MFLOW_OUTPUT_DIR)
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Fail instead of asking for an API key when none is configured
    #[arg(long)]
    no_input: bool,
}

/// Inputs for one run.
struct RunPlan {
    mode: GenerationMode,
    settings: CinematicSettings,
    output: OutputArgs,
    image: Option<PathBuf>,
    video: Option<PathBuf>,
    prompt: String,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Transfer(args) => {
                run_workflow(RunPlan {
                    mode: GenerationMode::Transfer,
                    settings: args.settings.into(),
                    output: args.output,
                    image: Some(args.image),
                    video: Some(args.video),
                    prompt: String::new(),
                })
                .await
            }
            Command::Dream(args) => {
                run_workflow(RunPlan {
                    mode: GenerationMode::Dream,
                    settings: args.settings.into(),
                    output: args.output,
                    image: None,
                    video: None,
                    prompt: args.prompt,
                })
                .await
            }
            Command::Settings => {
                print_settings();
                Ok(())
            }
        }
    }
}

async fn run_workflow(plan: RunPlan) -> anyhow::Result<()> {
    let mut config = GenAiConfig::from_env();
    if let Some(dir) = plan.output.output_dir.clone() {
        config.output_dir = dir;
    }
    debug!("Generation config: {:?}", config);

    let client = GeminiClient::new(config).context("Failed to create generation client")?;
    let credentials = client.credentials();
    let gate = KeyStoreGate::new(credentials.clone());
    let studio = Studio::with_settings(Arc::new(client), gate, plan.settings);

    studio.set_mode(plan.mode);
    if let Some(path) = &plan.image {
        studio.set_identity_image(Some(load_media(path, MediaKind::Image).await?));
    }
    if let Some(path) = &plan.video {
        studio.set_reference_video(Some(load_media(path, MediaKind::Video).await?));
    }
    studio.set_prompt(plan.prompt);

    info!("Running {} with {:?}", plan.mode.label(), plan.settings);

    let stop_logs = CancellationToken::new();
    let log_task = tokio::spawn(print_logs(studio.subscribe(), stop_logs.clone()));

    let outcome = tokio::select! {
        outcome = drive(&studio, &credentials, plan.output.no_input) => outcome,
        _ = tokio::signal::ctrl_c() => {
            studio.reset();
            Err(anyhow::anyhow!("Interrupted"))
        }
    };

    stop_logs.cancel();
    log_task.await.ok();

    match outcome? {
        RunOutcome::Completed(artifact) => export(&artifact, plan.output.out.as_deref()).await,
        RunOutcome::Failed(reason) => anyhow::bail!(reason),
        RunOutcome::Rejected(e) => anyhow::bail!(e),
        RunOutcome::AwaitingCredential => anyhow::bail!("An API key is required"),
        other => anyhow::bail!("Run did not complete: {:?}", other),
    }
}

/// Start the run, acquiring a credential interactively if the gate asks for one.
async fn drive(
    studio: &Studio<GeminiClient, KeyStoreGate>,
    credentials: &mflow_genai::ApiKeyStore,
    no_input: bool,
) -> anyhow::Result<RunOutcome> {
    let outcome = studio.start().await;
    if outcome != RunOutcome::AwaitingCredential || no_input {
        return Ok(outcome);
    }

    let key = tokio::task::spawn_blocking(prompt_for_key)
        .await
        .context("Credential prompt panicked")??;
    credentials.set(key);

    Ok(studio.resume_after_credential().await)
}

fn prompt_for_key() -> anyhow::Result<String> {
    eprintln!("No API key configured. Set GEMINI_API_KEY or enter one now.");
    eprint!("API key: ");
    std::io::stderr().flush()?;

    let key = rpassword::read_password().context("Failed to read API key")?;
    if key.trim().is_empty() {
        anyhow::bail!("No API key entered");
    }
    Ok(key)
}

/// Print run log entries as they appear, oldest first.
async fn print_logs(mut rx: watch::Receiver<StudioSnapshot>, stop: CancellationToken) {
    let mut seen = HashSet::new();

    loop {
        let snapshot = rx.borrow_and_update().clone();
        print_new_entries(&snapshot, &mut seen);

        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = stop.cancelled() => break,
        }
    }

    let snapshot = rx.borrow().clone();
    print_new_entries(&snapshot, &mut seen);
}

fn print_new_entries(snapshot: &StudioSnapshot, seen: &mut HashSet<String>) {
    let mut fresh: Vec<_> = snapshot
        .logs
        .entries()
        .filter(|entry| !seen.contains(&entry.id))
        .collect();
    fresh.reverse();

    for entry in fresh {
        let marker = match entry.severity {
            LogSeverity::Info => "..",
            LogSeverity::Success => "ok",
            LogSeverity::Warning => "!!",
            LogSeverity::Error => "xx",
        };
        println!(
            "[{}] {} {}",
            entry.timestamp.format("%H:%M:%S"),
            marker,
            entry.message
        );
        seen.insert(entry.id.clone());
    }
}

async fn export(artifact: &ArtifactRef, out: Option<&std::path::Path>) -> anyhow::Result<()> {
    let path = match out {
        Some(out) => {
            tokio::fs::copy(&artifact.path, out)
                .await
                .with_context(|| format!("Failed to copy video to {}", out.display()))?;
            out.to_path_buf()
        }
        None => artifact.path.clone(),
    };

    println!("Video saved to {} ({} bytes)", path.display(), artifact.size_bytes);
    Ok(())
}

fn print_settings() {
    println!("Aspect ratio (--aspect-ratio):");
    for value in AspectRatio::ALL {
        println!("  {:<12} {}", value.as_str(), value.label());
    }
    println!("Color grade (--grade):");
    for value in ColorGrade::ALL {
        println!("  {:<12} {}", value.as_str(), value.label());
    }
    println!("Atmospheric FX (--fx):");
    for value in AtmosphericFx::ALL {
        println!("  {:<12} {}", value.as_str(), value.label());
    }
    println!("Resolution (--resolution):");
    for value in Resolution::ALL {
        println!("  {:<12} {}", value.as_str(), value.label());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dream_with_settings() {
        let cli = Cli::try_parse_from([
            "mflow",
            "dream",
            "--prompt",
            "a cat on a skateboard",
            "--aspect-ratio",
            "16:9",
            "--grade",
            "noir",
            "--resolution",
            "720p",
        ])
        .unwrap();

        match cli.command {
            Command::Dream(args) => {
                assert_eq!(args.prompt, "a cat on a skateboard");
                let settings: CinematicSettings = args.settings.into();
                assert_eq!(settings.aspect_ratio, AspectRatio::Landscape);
                assert_eq!(settings.color_grade, ColorGrade::Noir);
                assert_eq!(settings.fx, AtmosphericFx::None);
                assert_eq!(settings.resolution, Resolution::Hd720);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_transfer_defaults() {
        let cli = Cli::try_parse_from([
            "mflow", "transfer", "--image", "me.png", "--video", "dance.mp4", "--out", "out.mp4",
        ])
        .unwrap();

        match cli.command {
            Command::Transfer(args) => {
                assert_eq!(args.image, PathBuf::from("me.png"));
                assert_eq!(args.output.out, Some(PathBuf::from("out.mp4")));
                let settings: CinematicSettings = args.settings.into();
                assert_eq!(settings, CinematicSettings::default());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_setting() {
        assert!(
            Cli::try_parse_from(["mflow", "dream", "--prompt", "x", "--grade", "sepia"]).is_err()
        );
        assert!(Cli::try_parse_from(["mflow", "transfer", "--image", "me.png"]).is_err());
    }

    #[tokio::test]
    async fn test_export_copies_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("generated.mp4");
        std::fs::write(&source, b"video").unwrap();
        let artifact = ArtifactRef {
            source_uri: "https://files.example/v.mp4".to_string(),
            path: source,
            size_bytes: 5,
            mime_type: "video/mp4".to_string(),
        };

        let out = dir.path().join("final.mp4");
        export(&artifact, Some(&out)).await.unwrap();
        assert_eq!(std::fs::read(&out).unwrap(), b"video");
    }
}

//! Generative API HTTP client.

use std::path::PathBuf;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use mflow_models::{ArtifactRef, MediaInput, MotionDescriptor, ValidationOutcome};

use crate::config::GenAiConfig;
use crate::credential::ApiKeyStore;
use crate::error::{GenAiError, GenAiResult};
use crate::metrics::{record_poll, record_request};
use crate::prompt::{MOTION_PROMPT, VALIDATION_PROMPT};
use crate::service::{GenerationService, SynthesisRequest};
use crate::types::{
    Content, GenerateContentRequest, GenerationConfig, ImageInput, Operation, Part,
    PredictVideoRequest, VideoInstance, VideoParameters,
};

/// Rejection message used when the validation call itself fails.
pub const VALIDATION_ERROR_MESSAGE: &str = "Error communicating with validation engine.";

/// Description used when the analysis model returns no text.
pub const FALLBACK_MOTION_DESCRIPTION: &str = "Graceful rhythmic motion";

const DEFAULT_ARTIFACT_MIME: &str = "video/mp4";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client for the Gemini/Veo generative API.
pub struct GeminiClient {
    http: Client,
    config: GenAiConfig,
    credentials: ApiKeyStore,
}

impl GeminiClient {
    /// Create a new client. The configured key, if any, seeds the credential store.
    pub fn new(config: GenAiConfig) -> GenAiResult<Self> {
        let credentials = ApiKeyStore::new(config.api_key.clone());
        Self::with_credentials(config, credentials)
    }

    /// Create a client that reads its key from a shared store.
    pub fn with_credentials(config: GenAiConfig, credentials: ApiKeyStore) -> GenAiResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(GenAiError::from)?;

        Ok(Self {
            http,
            config,
            credentials,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> GenAiResult<Self> {
        Self::new(GenAiConfig::from_env())
    }

    /// Handle to the credential store used by this client.
    pub fn credentials(&self) -> ApiKeyStore {
        self.credentials.clone()
    }

    pub fn config(&self) -> &GenAiConfig {
        &self.config
    }

    fn api_key(&self) -> GenAiResult<String> {
        self.credentials.get().ok_or(GenAiError::MissingCredential)
    }

    /// Send a request, record metrics and turn non-success statuses into errors.
    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> GenAiResult<Response> {
        let started = Instant::now();
        let result = request.send().await;
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                record_request(operation, 0, latency_ms);
                return Err(e.into());
            }
        };

        let status = response.status();
        record_request(operation, status.as_u16(), latency_ms);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenAiError::from_http_status(status.as_u16(), &body));
        }

        Ok(response)
    }

    /// Call `generateContent` on the text model and return the response text.
    async fn generate_text(
        &self,
        operation: &'static str,
        parts: Vec<Part>,
        generation_config: Option<GenerationConfig>,
    ) -> GenAiResult<Option<String>> {
        let key = self.api_key()?;
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.text_model
        );

        let request = GenerateContentRequest {
            contents: vec![Content { parts }],
            generation_config,
        };

        debug!("Sending {} request to {}", operation, url);

        let response = self
            .send(
                operation,
                self.http
                    .post(&url)
                    .header(API_KEY_HEADER, key.as_str())
                    .json(&request),
            )
            .await?;

        let body: crate::types::GenerateContentResponse = response.json().await?;
        Ok(body.text())
    }

    /// Ask the text model to validate the subjects. Errors propagate.
    pub async fn validate_inputs(
        &self,
        identity_image: &MediaInput,
        reference_video: &MediaInput,
    ) -> GenAiResult<ValidationOutcome> {
        info!(
            "Validating subjects (image {} bytes, video {} bytes)",
            identity_image.len(),
            reference_video.len()
        );

        let parts = vec![
            Part::text(VALIDATION_PROMPT),
            Part::inline(identity_image.mime_type(), identity_image.to_base64()),
            Part::inline(reference_video.mime_type(), reference_video.to_base64()),
        ];

        let text = self
            .generate_text("validate", parts, Some(GenerationConfig { temperature: 0.1 }))
            .await?;

        Ok(ValidationOutcome::from_verdict(text.as_deref().unwrap_or_default()))
    }

    /// Ask the text model for a motion description of the reference video.
    pub async fn extract_motion(
        &self,
        reference_video: &MediaInput,
    ) -> GenAiResult<MotionDescriptor> {
        info!(
            "Extracting motion from reference video ({} bytes)",
            reference_video.len()
        );

        let parts = vec![
            Part::text(MOTION_PROMPT),
            Part::inline(reference_video.mime_type(), reference_video.to_base64()),
        ];

        let text = self.generate_text("analyze_motion", parts, None).await?;
        let description = text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| FALLBACK_MOTION_DESCRIPTION.to_string());

        Ok(MotionDescriptor::new(description))
    }

    /// Issue the initial video generation request.
    pub async fn start_generation(&self, request: &SynthesisRequest) -> GenAiResult<Operation> {
        let key = self.api_key()?;
        let url = format!(
            "{}/models/{}:predictLongRunning",
            self.config.base_url, self.config.video_model
        );

        let image = request.payload.identity_image().map(|img| ImageInput {
            bytes_base64_encoded: img.to_base64(),
            mime_type: img.mime_type().to_string(),
        });

        let body = PredictVideoRequest {
            instances: vec![VideoInstance {
                prompt: request.prompt(),
                image,
            }],
            parameters: VideoParameters {
                aspect_ratio: request.settings.aspect_ratio.as_str().to_string(),
                resolution: request.settings.resolution.as_str().to_string(),
                sample_count: 1,
            },
        };

        info!(
            "Starting {} synthesis ({} {}, grade={}, fx={})",
            request.mode(),
            request.settings.aspect_ratio,
            request.settings.resolution,
            request.settings.color_grade,
            request.settings.fx
        );

        let response = self
            .send(
                "synthesize",
                self.http
                    .post(&url)
                    .header(API_KEY_HEADER, key.as_str())
                    .json(&body),
            )
            .await?;

        let operation: Operation = response.json().await?;
        if operation.name.is_empty() && !operation.done {
            return Err(GenAiError::invalid_response(
                "Synthesis started without an operation name",
            ));
        }
        debug!("Synthesis operation started: {}", operation.name);
        Ok(operation)
    }

    /// Fetch the current status of a long-running operation.
    pub async fn poll_operation(&self, name: &str) -> GenAiResult<Operation> {
        let key = self.api_key()?;
        let url = format!("{}/{}", self.config.base_url, name.trim_start_matches('/'));

        let response = self
            .send(
                "poll_operation",
                self.http.get(&url).header(API_KEY_HEADER, key.as_str()),
            )
            .await?;

        Ok(response.json().await?)
    }

    /// Poll on a fixed interval until the operation reports completion.
    ///
    /// Each iteration is one sleep and one status request; cancellation is
    /// observed during the sleep.
    pub async fn wait_for_operation(
        &self,
        mut operation: Operation,
        cancel: &CancellationToken,
    ) -> GenAiResult<Operation> {
        let mut attempts: u32 = 0;

        while !operation.done {
            if let Some(max) = self.config.max_poll_attempts {
                if attempts >= max {
                    warn!(
                        "Operation {} still running after {} status checks",
                        operation.name, attempts
                    );
                    return Err(GenAiError::PollLimitExceeded(max));
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Stopped waiting for operation {}", operation.name);
                    return Err(GenAiError::Cancelled);
                }
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }

            attempts += 1;
            record_poll();
            debug!("Checking operation {} (attempt {})", operation.name, attempts);
            operation = self.poll_operation(&operation.name).await?;
        }

        if let Some(error) = &operation.error {
            return Err(GenAiError::OperationFailed(error.message.clone()));
        }

        info!("Operation {} finished after {} status checks", operation.name, attempts);
        Ok(operation)
    }

    /// Download a generated video and write it under the output directory.
    ///
    /// The credential is appended to the locator as a `key` query parameter.
    pub async fn download_artifact(&self, uri: &str) -> GenAiResult<ArtifactRef> {
        let key = self.api_key()?;

        let response = self
            .send("download", self.http.get(uri).query(&[("key", key.as_str())]))
            .await?;

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(|v| v.trim().to_string())
            .filter(|v| v.starts_with("video/"))
            .unwrap_or_else(|| DEFAULT_ARTIFACT_MIME.to_string());

        let bytes = response.bytes().await?;

        tokio::fs::create_dir_all(&self.config.output_dir).await?;
        let path: PathBuf = self
            .config
            .output_dir
            .join(format!("{}.{}", Uuid::new_v4(), extension_for(&mime_type)));
        tokio::fs::write(&path, &bytes).await?;

        info!("Saved generated video to {} ({} bytes)", path.display(), bytes.len());

        Ok(ArtifactRef {
            source_uri: uri.to_string(),
            path,
            size_bytes: bytes.len() as u64,
            mime_type,
        })
    }
}

fn extension_for(mime_type: &str) -> &'static str {
    match mime_type {
        "video/webm" => "webm",
        "video/quicktime" => "mov",
        _ => "mp4",
    }
}

#[async_trait]
impl GenerationService for GeminiClient {
    async fn validate(
        &self,
        identity_image: &MediaInput,
        reference_video: &MediaInput,
    ) -> ValidationOutcome {
        match self.validate_inputs(identity_image, reference_video).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Validation request failed: {}", e);
                ValidationOutcome::rejected(VALIDATION_ERROR_MESSAGE)
            }
        }
    }

    async fn analyze_motion(&self, reference_video: &MediaInput) -> GenAiResult<MotionDescriptor> {
        self.extract_motion(reference_video).await
    }

    async fn synthesize(
        &self,
        request: &SynthesisRequest,
        cancel: &CancellationToken,
    ) -> GenAiResult<ArtifactRef> {
        if cancel.is_cancelled() {
            return Err(GenAiError::Cancelled);
        }

        let operation = self.start_generation(request).await?;
        let operation = self.wait_for_operation(operation, cancel).await?;

        let uri = operation.first_video_uri().ok_or(GenAiError::NoOutput)?;
        self.download_artifact(uri).await
    }
}

//! End-to-end workflow tests: studio and HTTP client against a mock API.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mflow_genai::{ApiKeyStore, GeminiClient, GenAiConfig, VALIDATION_ERROR_MESSAGE};
use mflow_models::{GenerationMode, MediaInput, WorkflowState};
use mflow_studio::{KeyStoreGate, RunOutcome, Studio};

const GENERATE_PATH: &str = "/models/text-model:generateContent";
const PREDICT_PATH: &str = "/models/video-model:predictLongRunning";
const OPERATION_PATH: &str = "/operations/op-7";

fn config(server: &MockServer, output_dir: &Path, api_key: Option<&str>) -> GenAiConfig {
    GenAiConfig {
        base_url: server.uri(),
        api_key: api_key.map(str::to_string),
        text_model: "text-model".to_string(),
        video_model: "video-model".to_string(),
        poll_interval: Duration::from_millis(10),
        max_poll_attempts: Some(50),
        request_timeout: Duration::from_secs(5),
        output_dir: output_dir.to_path_buf(),
    }
}

fn build(config: GenAiConfig) -> (ApiKeyStore, Studio<GeminiClient, KeyStoreGate>) {
    let client = GeminiClient::new(config).unwrap();
    let store = client.credentials();
    let studio = Studio::new(Arc::new(client), KeyStoreGate::new(store.clone()));
    (store, studio)
}

fn text_response(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{ "content": { "parts": [{ "text": text }] } }]
    }))
}

async fn mount_synthesis(server: &MockServer) {
    let video_uri = format!("{}/files/out-7", server.uri());

    Mock::given(method("POST"))
        .and(path(PREDICT_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "name": "operations/op-7" })),
        )
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(OPERATION_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "operations/op-7",
            "done": true,
            "response": {
                "generateVideoResponse": {
                    "generatedSamples": [{ "video": { "uri": video_uri } }]
                }
            }
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/files/out-7"))
        .and(query_param("key", "test-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "video/mp4")
                .set_body_bytes(b"rendered".to_vec()),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_transfer_end_to_end() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains("CRITICAL VALIDATION RULES"))
        .respond_with(text_response("VALID"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains("EXTRACT ONLY"))
        .respond_with(text_response("Moonwalk backwards, then a sharp spin."))
        .expect(1)
        .mount(&server)
        .await;

    mount_synthesis(&server).await;

    let (_store, studio) = build(config(&server, dir.path(), Some("test-key")));
    studio.set_identity_image(Some(MediaInput::new(vec![1, 2, 3], "image/png")));
    studio.set_reference_video(Some(MediaInput::new(vec![4, 5, 6], "video/mp4")));

    let outcome = studio.start().await;

    let artifact = match outcome {
        RunOutcome::Completed(artifact) => artifact,
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert_eq!(std::fs::read(&artifact.path).unwrap(), b"rendered");
    assert_eq!(studio.state(), WorkflowState::Completed);

    let requests = server.received_requests().await.unwrap();
    let predict = requests
        .iter()
        .find(|r| r.url.path() == PREDICT_PATH)
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&predict.body).unwrap();
    assert!(body["instances"][0]["prompt"]
        .as_str()
        .unwrap()
        .contains("Moonwalk backwards, then a sharp spin."));
    assert_eq!(body["parameters"]["aspectRatio"], "9:16");
}

#[tokio::test]
async fn test_validation_outage_fails_closed() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(PREDICT_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (_store, studio) = build(config(&server, dir.path(), Some("test-key")));
    studio.set_identity_image(Some(MediaInput::new(vec![1], "image/png")));
    studio.set_reference_video(Some(MediaInput::new(vec![2], "video/mp4")));

    let outcome = studio.start().await;

    assert_eq!(outcome, RunOutcome::Failed(VALIDATION_ERROR_MESSAGE.to_string()));
    assert_eq!(
        studio.snapshot().failure_reason.as_deref(),
        Some(VALIDATION_ERROR_MESSAGE)
    );
}

#[tokio::test]
async fn test_dream_waits_for_credential() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_synthesis(&server).await;

    let (store, studio) = build(config(&server, dir.path(), None));
    assert!(studio.set_mode(GenerationMode::Dream));
    studio.set_prompt("paper cranes taking flight");

    assert_eq!(studio.start().await, RunOutcome::AwaitingCredential);
    assert!(server.received_requests().await.unwrap().is_empty());

    store.set("test-key");
    let outcome = studio.resume_after_credential().await;

    assert!(matches!(outcome, RunOutcome::Completed(_)));
    assert_eq!(studio.state(), WorkflowState::Completed);
}

#[tokio::test]
async fn test_transport_failure_keeps_key_out_of_reason_and_log() {
    let dir = tempfile::tempdir().unwrap();
    let config = GenAiConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        api_key: Some("SUPERSECRETKEY".to_string()),
        text_model: "text-model".to_string(),
        video_model: "video-model".to_string(),
        poll_interval: Duration::from_millis(10),
        max_poll_attempts: Some(1),
        request_timeout: Duration::from_secs(5),
        output_dir: dir.path().to_path_buf(),
    };

    let (_store, studio) = build(config);
    assert!(studio.set_mode(GenerationMode::Dream));
    studio.set_prompt("neon koi circling a fountain");

    let outcome = studio.start().await;

    let reason = match outcome {
        RunOutcome::Failed(reason) => reason,
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert!(!reason.contains("SUPERSECRETKEY"));

    let snapshot = studio.snapshot();
    assert_eq!(snapshot.state, WorkflowState::Failed);
    assert_eq!(snapshot.failure_reason.as_deref(), Some(reason.as_str()));
    assert!(snapshot
        .logs
        .entries()
        .all(|entry| !entry.message.contains("SUPERSECRETKEY")));
}

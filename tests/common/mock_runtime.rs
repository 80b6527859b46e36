//! Mock diffusion runtime for testing the remote pipeline client.

use base64::Engine;
use serde_json::json;
use wiremock::{
    matchers::{body_partial_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

use pixelsmith::models::GenerationConfig;
use pixelsmith::rendering::encode_png;
use retro_palette::Image;

pub const PIPELINE_ID: &str = "pl-test-1";

/// Wrapper around wiremock MockServer speaking the runtime protocol
pub struct MockRuntime {
    pub server: MockServer,
}

impl MockRuntime {
    /// Start a new mock runtime
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Get the base URL of the mock runtime
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Generation config pointing at this runtime
    pub fn config(&self) -> GenerationConfig {
        GenerationConfig {
            runtime_url: self.url(),
            render_size: 64,
            timeout_secs: 5,
            ..Default::default()
        }
    }

    /// Accept pipeline loads, answering with [`PIPELINE_ID`]
    pub async fn mock_load(&self) {
        Mock::given(method("POST"))
            .and(path("/v1/pipelines"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "pipeline_id": PIPELINE_ID
            })))
            .mount(&self.server)
            .await;
    }

    /// Accept pipeline loads whose body contains `expected`
    pub async fn mock_load_expecting(&self, expected: serde_json::Value, times: u64) {
        Mock::given(method("POST"))
            .and(path("/v1/pipelines"))
            .and(body_partial_json(expected))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "pipeline_id": PIPELINE_ID
            })))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Reject pipeline loads with `status`
    pub async fn mock_load_error(&self, status: u16, body: &str) {
        Mock::given(method("POST"))
            .and(path("/v1/pipelines"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Answer inference with `image` as a base64 PNG
    pub async fn mock_generate(&self, image: &Image) {
        let encoded =
            base64::engine::general_purpose::STANDARD.encode(encode_png(image).unwrap());
        self.mock_generate_body(json!({ "images": [encoded] })).await;
    }

    /// Answer inference with an arbitrary JSON body
    pub async fn mock_generate_body(&self, body: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path(format!("/v1/pipelines/{PIPELINE_ID}/generate")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Fail inference with `status`
    pub async fn mock_generate_error(&self, status: u16, body: &str) {
        Mock::given(method("POST"))
            .and(path(format!("/v1/pipelines/{PIPELINE_ID}/generate")))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Accept pipeline release, expecting `times` calls
    pub async fn mock_release(&self, times: u64) {
        Mock::given(method("DELETE"))
            .and(path(format!("/v1/pipelines/{PIPELINE_ID}")))
            .respond_with(ResponseTemplate::new(204))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Requests the runtime has seen so far
    pub async fn received(&self) -> Vec<wiremock::Request> {
        self.server.received_requests().await.unwrap_or_default()
    }
}

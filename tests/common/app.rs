//! Test application factory for integration tests.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

use pixelsmith::models::{AppConfig, Device, GenerationConfig};
use pixelsmith::server::{build_router, create_app_state_with_loader, AppState};
use pixelsmith::services::Pixelsmith;

use super::fixtures::FakeLoader;

/// Test application with router and direct access to services
pub struct TestApp {
    router: axum::Router,
    pub pixelsmith: Arc<Pixelsmith>,
    pub loader: Arc<FakeLoader>,
}

impl TestApp {
    /// Create a test application backed by a fake pipeline
    pub fn new() -> Self {
        Self::with_config(Self::test_config())
    }

    /// Create a test application with a custom configuration
    pub fn with_config(config: AppConfig) -> Self {
        Self::with_loader(config, Arc::new(FakeLoader::new()))
    }

    /// Create a test application around a specific loader
    pub fn with_loader(config: AppConfig, loader: Arc<FakeLoader>) -> Self {
        let state = create_app_state_with_loader(config, loader.clone(), Device::Cpu);
        let pixelsmith = state.pixelsmith.clone();

        // Build router using shared server module (same as production)
        let router = build_router(state);

        Self {
            router,
            pixelsmith,
            loader,
        }
    }

    /// Configuration with a small render size so tests stay fast
    pub fn test_config() -> AppConfig {
        AppConfig {
            generation: GenerationConfig {
                render_size: 128,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Create state for custom router configuration
    pub fn create_state() -> AppState {
        create_app_state_with_loader(
            Self::test_config(),
            Arc::new(FakeLoader::new()),
            Device::Cpu,
        )
    }

    /// Make a GET request to the given path
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Request::get(path).body(Body::empty()).unwrap())
            .await
    }

    /// Make a POST request with JSON body
    pub async fn post_json(&self, path: &str, body: &serde_json::Value) -> TestResponse {
        let request = Request::post(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.request(request).await
    }

    /// Make a POST request without a body
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request(Request::post(path).body(Body::empty()).unwrap())
            .await
    }

    /// Send a request to the router
    async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Test response with convenience methods
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Parse body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }

    /// Get body as string
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Get raw body bytes
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Check if response is a PNG image
    pub fn is_png(&self) -> bool {
        self.body.len() >= 8 && &self.body[0..8] == b"\x89PNG\r\n\x1a\n"
    }

    /// Decode the PNG body
    pub fn image(&self) -> retro_palette::Image {
        pixelsmith::rendering::decode_png(&self.body).expect("Failed to decode PNG response")
    }
}

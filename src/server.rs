//! HTTP server setup and configuration.
//!
//! This module provides the router and application state used by both
//! the production server and integration tests.

use axum::{
    extract::State,
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::error::ApiError;
use crate::models::{accelerator, AppConfig, Device};
use crate::services::{ModelLoader, Pixelsmith, RemoteRuntimeLoader};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub pixelsmith: Arc<Pixelsmith>,
    pub config: Arc<AppConfig>,
}

/// Create application state talking to the configured runtime.
pub fn create_app_state(config: AppConfig) -> AppState {
    create_app_state_with_loader(
        config,
        Arc::new(RemoteRuntimeLoader::new()),
        accelerator::probe(),
    )
}

/// Create application state with an explicit pipeline loader.
pub fn create_app_state_with_loader(
    config: AppConfig,
    loader: Arc<dyn ModelLoader>,
    accelerator: Device,
) -> AppState {
    tracing::info!(
        %accelerator,
        runtime = %config.generation.runtime_url,
        "Pipeline backend configured"
    );
    let pixelsmith = Arc::new(Pixelsmith::new(
        loader,
        accelerator,
        config.generation.clone(),
    ));
    AppState {
        pixelsmith,
        config: Arc::new(config),
    }
}

/// Build the API router with all endpoints and middleware.
///
/// This is the core router used by both production and tests.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/generate", post(handle_generate))
        .route("/api/quantize", post(handle_quantize))
        .route("/api/palettes", get(api::handle_palettes))
        .route("/api/unload", post(handle_unload))
        .route("/api/status", get(handle_status))
        // Health check
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

// Wrapper handlers to extract state components for the underlying API handlers

async fn handle_generate(
    State(state): State<AppState>,
    request: Json<api::GenerateRequest>,
) -> Result<Response, ApiError> {
    api::handle_generate(State(state.pixelsmith), State(state.config), request).await
}

async fn handle_quantize(
    State(state): State<AppState>,
    request: Json<api::QuantizeRequest>,
) -> Result<Response, ApiError> {
    api::handle_quantize(State(state.config), request).await
}

async fn handle_unload(
    State(state): State<AppState>,
) -> Result<Json<api::UnloadResponse>, ApiError> {
    api::handle_unload(State(state.pixelsmith)).await
}

async fn handle_status(State(state): State<AppState>) -> Json<api::StatusResponse> {
    api::handle_status(State(state.pixelsmith)).await
}

use axum::{extract::State, response::Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::join_error;
use crate::error::ApiError;
use crate::models::Device;
use crate::services::Pixelsmith;

/// Response from the /api/unload endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct UnloadResponse {
    /// Status code (200 = success)
    pub status: u16,
    pub message: String,
}

/// Response from the /api/status endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    /// A pipeline load is in progress
    pub loading: bool,
    /// Whether a pipeline is currently loaded
    pub loaded: bool,
    /// Device the loaded pipeline runs on
    pub device: Option<Device>,
    #[schema(value_type = Option<String>)]
    pub loaded_at: Option<DateTime<Utc>>,
    /// Best device found on this host
    pub accelerator: Device,
}

/// Release the loaded pipeline
///
/// Frees the model memory on the runtime. The next generate request loads it
/// again.
#[utoipa::path(
    post,
    path = "/api/unload",
    responses(
        (status = 200, description = "Pipeline released (or none was loaded)", body = UnloadResponse),
    ),
    tag = "Pipeline"
)]
pub async fn handle_unload(
    State(pixelsmith): State<Arc<Pixelsmith>>,
) -> Result<Json<UnloadResponse>, ApiError> {
    let unloaded = tokio::task::spawn_blocking(move || pixelsmith.unload())
        .await
        .map_err(join_error)?;

    let message = if unloaded {
        "Pipeline unloaded"
    } else {
        "No pipeline loaded"
    };
    Ok(Json(UnloadResponse {
        status: 200,
        message: message.to_string(),
    }))
}

/// Report pipeline cache state
///
/// Answers immediately while a load is running, with `loading` set.
#[utoipa::path(
    get,
    path = "/api/status",
    responses(
        (status = 200, description = "Pipeline status", body = StatusResponse),
    ),
    tag = "Pipeline"
)]
pub async fn handle_status(State(pixelsmith): State<Arc<Pixelsmith>>) -> Json<StatusResponse> {
    let status = pixelsmith.status();
    Json(StatusResponse {
        loading: status.loading,
        loaded: status.loaded,
        device: status.device,
        loaded_at: status.loaded_at,
        accelerator: pixelsmith.accelerator(),
    })
}

use axum::{
    extract::State,
    response::{Json, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::palettes::PaletteParam;
use super::{join_error, png_response};
use crate::error::ApiError;
use crate::models::AppConfig;
use crate::rendering::encode_png;
use crate::services::{validate_size, GenerateOptions, PaletteChoice, Pixelsmith};

/// Request body for image generation
#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateRequest {
    /// What to draw
    pub prompt: String,
    /// Output edge length in pixels (default: `default_size` from the config)
    #[serde(default)]
    pub size: Option<u32>,
    /// Palette name or list of `#rrggbb` colors (default: `default_palette`)
    #[serde(default)]
    pub palette: Option<PaletteParam>,
    /// Fixed seed for reproducible output
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub negative_prompt: Option<String>,
}

/// Generate pixel art from a prompt
///
/// Renders at full resolution on the runtime, downscales to `size x size` and
/// snaps every pixel to the palette when one is given. The first request
/// loads the pipeline, which can take minutes.
#[utoipa::path(
    post,
    path = "/api/generate",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Generated PNG", content_type = "image/png"),
        (status = 400, description = "Unknown palette, empty prompt or invalid size"),
        (status = 502, description = "Runtime failed during inference"),
        (status = 503, description = "Pipeline could not be loaded"),
    ),
    tag = "Generation"
)]
pub async fn handle_generate(
    State(pixelsmith): State<Arc<Pixelsmith>>,
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<GenerateRequest>,
) -> Result<Response, ApiError> {
    let palette = match request.palette {
        Some(param) => Some(param.into_choice()?),
        None => config.default_palette.clone().map(PaletteChoice::Named),
    };
    let size = request.size.unwrap_or(config.default_size);
    validate_size(size)?;

    let mut options = GenerateOptions::new(request.prompt)
        .size(size)
        .palette(palette)
        .seed(request.seed);
    if let Some(negative_prompt) = request.negative_prompt {
        options = options.negative_prompt(negative_prompt);
    }

    tracing::info!(size, seed = ?options.seed, "Generate request received");

    // Inference blocks on the runtime
    let png_bytes = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, ApiError> {
        let image = pixelsmith.generate(&options)?;
        Ok(encode_png(&image)?)
    })
    .await
    .map_err(join_error)??;

    Ok(png_response(png_bytes))
}

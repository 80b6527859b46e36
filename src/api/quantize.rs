use axum::{
    extract::State,
    response::{Json, Response},
};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use utoipa::ToSchema;

use super::palettes::PaletteParam;
use super::{join_error, png_response};
use crate::error::ApiError;
use crate::models::AppConfig;
use crate::rendering::{encode_indexed_png, read_image};
use crate::services::{downscale, quantize_palette_indexed, validate_size, PaletteChoice};

/// Request body for quantizing an existing image
#[derive(Debug, Deserialize, ToSchema)]
pub struct QuantizeRequest {
    /// Path of a PNG file readable by the server
    #[schema(value_type = String)]
    pub image_path: PathBuf,
    /// Palette name or list of `#rrggbb` colors (default: `default_palette`)
    #[serde(default)]
    pub palette: Option<PaletteParam>,
    /// Downscale to `size x size` first
    #[serde(default)]
    pub size: Option<u32>,
}

/// Quantize an image file to a palette
///
/// Reads a PNG from disk, optionally downscales it and returns an indexed PNG
/// whose colors all come from the palette.
#[utoipa::path(
    post,
    path = "/api/quantize",
    request_body = QuantizeRequest,
    responses(
        (status = 200, description = "Indexed PNG", content_type = "image/png"),
        (status = 400, description = "Missing or unknown palette, undecodable image or invalid size"),
        (status = 404, description = "Image file not found"),
    ),
    tag = "Generation"
)]
pub async fn handle_quantize(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<QuantizeRequest>,
) -> Result<Response, ApiError> {
    let palette = match request.palette {
        Some(param) => Some(param.into_choice()?),
        None => config.default_palette.clone().map(PaletteChoice::Named),
    };
    if let Some(size) = request.size {
        validate_size(size)?;
    }

    tracing::info!(
        path = %request.image_path.display(),
        size = ?request.size,
        "Quantize request received"
    );

    let png_bytes = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, ApiError> {
        let mut image = read_image(&request.image_path)?;
        if let Some(size) = request.size {
            image = downscale(&image, size)?;
        }
        let indexed =
            quantize_palette_indexed(&image, palette.as_ref().map(PaletteChoice::as_spec))?;
        Ok(encode_indexed_png(&indexed)?)
    })
    .await
    .map_err(join_error)??;

    Ok(png_response(png_bytes))
}

pub mod generate;
pub mod palettes;
pub mod pipeline;
pub mod quantize;

use axum::{
    body::Bytes,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::error::ApiError;

pub use generate::{handle_generate, GenerateRequest, __path_handle_generate};
pub use palettes::{
    handle_palettes, PaletteInfo, PaletteParam, PalettesResponse, __path_handle_palettes,
};
pub use pipeline::{
    handle_status, handle_unload, StatusResponse, UnloadResponse, __path_handle_status,
    __path_handle_unload,
};
pub use quantize::{handle_quantize, QuantizeRequest, __path_handle_quantize};

/// Binary PNG response.
fn png_response(png_bytes: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CONTENT_LENGTH, &png_bytes.len().to_string()),
        ],
        Bytes::from(png_bytes),
    )
        .into_response()
}

fn join_error(e: tokio::task::JoinError) -> ApiError {
    ApiError::Internal(format!("Worker task failed: {e}"))
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use retro_palette::{ImageError, PaletteError, ResizeError};
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from the HTTP surface, rendered as `{status, error}` JSON.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Pixelsmith(#[from] PixelsmithError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<PaletteError> for ApiError {
    fn from(e: PaletteError) -> Self {
        ApiError::Pixelsmith(PixelsmithError::Palette(e))
    }
}

/// Errors from the generation workflow.
#[derive(Debug, Error)]
pub enum PixelsmithError {
    #[error("Palette error: {0}")]
    Palette(#[from] PaletteError),

    #[error(transparent)]
    ModelLoad(#[from] ModelLoadError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Invalid size: {0}")]
    Resize(#[from] ResizeError),
}

/// The runtime could not load the pipeline.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("Failed to load pipeline: runtime unreachable at {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to load pipeline: runtime returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Failed to load pipeline: malformed runtime response: {0}")]
    InvalidResponse(String),

    #[error("Failed to load pipeline: {0}")]
    Unavailable(String),
}

/// An inference call failed.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Prompt must not be empty")]
    EmptyPrompt,

    #[error("Generation failed: runtime request error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Generation failed: runtime returned {status}: {body}")]
    Runtime { status: u16, body: String },

    #[error("Generation failed: malformed runtime response: {0}")]
    InvalidResponse(String),

    #[error("Generation failed: invalid base64 image: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Generation failed: {0}")]
    Decode(#[from] CodecError),

    #[error("Generation failed: runtime returned no image")]
    NoImage,
}

/// PNG encoding, decoding and file access errors.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("PNG decode error: {0}")]
    Decode(#[from] png::DecodingError),

    #[error("PNG encode error: {0}")]
    Encode(#[from] png::EncodingError),

    #[error("Unsupported PNG layout: {0}")]
    Unsupported(String),

    #[error("Invalid image: {0}")]
    Image(#[from] ImageError),

    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CodecError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CodecError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Pixelsmith(e) => match e {
                PixelsmithError::Palette(_) | PixelsmithError::Resize(_) => {
                    StatusCode::BAD_REQUEST
                }
                PixelsmithError::Generation(GenerationError::EmptyPrompt) => {
                    StatusCode::BAD_REQUEST
                }
                PixelsmithError::ModelLoad(_) => StatusCode::SERVICE_UNAVAILABLE,
                PixelsmithError::Generation(_) => StatusCode::BAD_GATEWAY,
            },
            ApiError::Codec(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            ApiError::Codec(CodecError::Decode(_) | CodecError::Unsupported(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Codec(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "status": status.as_u16(),
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

//! Pixelsmith - retro pixel art from text prompts
//!
//! Drives a diffusion runtime to render an image, then downscales it and
//! snaps it to a retro palette. The palette and resize work lives in the
//! `retro-palette` crate; this crate adds the runtime client, the pipeline
//! cache, PNG I/O and the HTTP and CLI surfaces.

pub mod api;
pub mod error;
pub mod models;
pub mod rendering;
pub mod server;
pub mod services;

pub use error::{ApiError, CodecError, GenerationError, ModelLoadError, PixelsmithError};
pub use services::{
    downscale, quantize_palette, GenerateOptions, ImageGenerator, ModelLoader, PaletteChoice,
    Pixelsmith,
};

//! Seam between the workflow and the diffusion runtime.
//!
//! [`ModelLoader`] turns a [`GenerationConfig`] into a loaded pipeline and
//! [`ImageGenerator`] runs inference on it. Both are blocking; async callers
//! run them on the blocking pool.

use serde::Serialize;
use std::sync::Arc;

use retro_palette::Image;

use crate::error::{GenerationError, ModelLoadError};
use crate::models::{Device, GenerationConfig};

/// One inference call against a loaded pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub negative_prompt: String,
    /// Absent means the runtime picks its own, so output is not reproducible
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub num_inference_steps: u32,
    pub guidance_scale: f32,
    pub width: u32,
    pub height: u32,
}

impl GenerationRequest {
    /// Build a request rendering at the config's square render size.
    pub fn new(
        prompt: impl Into<String>,
        negative_prompt: impl Into<String>,
        seed: Option<u64>,
        config: &GenerationConfig,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            negative_prompt: negative_prompt.into(),
            seed,
            num_inference_steps: config.num_inference_steps,
            guidance_scale: config.guidance_scale,
            width: config.render_size,
            height: config.render_size,
        }
    }
}

/// A loaded text-to-image pipeline.
pub trait ImageGenerator: Send + Sync {
    /// Render the raw, full-resolution image for `request`.
    fn generate(&self, request: &GenerationRequest) -> Result<Image, GenerationError>;

    /// Free resources held by the runtime for this pipeline.
    fn release(&self) {}
}

/// Loads pipelines for a configuration.
pub trait ModelLoader: Send + Sync {
    fn load(
        &self,
        config: &GenerationConfig,
        device: Device,
    ) -> Result<Arc<dyn ImageGenerator>, ModelLoadError>;
}

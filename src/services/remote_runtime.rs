//! HTTP client for the external diffusion runtime.
//!
//! The runtime hosts the base model and the style adapter. It speaks JSON:
//!
//! - `POST /v1/pipelines` loads a pipeline and returns `{"pipeline_id": ...}`
//! - `POST /v1/pipelines/{id}/generate` returns `{"images": [<base64 PNG>, ...]}`
//! - `DELETE /v1/pipelines/{id}` releases it

use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use retro_palette::Image;

use super::generator::{GenerationRequest, ImageGenerator, ModelLoader};
use crate::error::{GenerationError, ModelLoadError};
use crate::models::{DType, Device, GenerationConfig};
use crate::rendering::decode_png;

/// Pipeline load request body.
#[derive(Debug, Serialize)]
struct LoadPipelineRequest<'a> {
    base_model: &'a str,
    lora_repo: &'a str,
    lora_weight: f32,
    device: Device,
    dtype: DType,
    enable_cpu_offload: bool,
    cache_dir: &'a PathBuf,
}

#[derive(Debug, Deserialize)]
struct LoadPipelineResponse {
    pipeline_id: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    images: Vec<String>,
}

/// Loads pipelines on the runtime named by `GenerationConfig::runtime_url`.
#[derive(Debug, Default, Clone)]
pub struct RemoteRuntimeLoader;

impl RemoteRuntimeLoader {
    pub fn new() -> Self {
        Self
    }
}

impl ModelLoader for RemoteRuntimeLoader {
    fn load(
        &self,
        config: &GenerationConfig,
        device: Device,
    ) -> Result<Arc<dyn ImageGenerator>, ModelLoadError> {
        let base_url = config.runtime_url.trim_end_matches('/').to_string();
        let url = format!("{base_url}/v1/pipelines");

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|source| ModelLoadError::Transport {
                url: url.clone(),
                source,
            })?;

        let body = LoadPipelineRequest {
            base_model: &config.base_model,
            lora_repo: &config.lora_repo,
            lora_weight: config.lora_weight,
            device,
            dtype: config.dtype,
            enable_cpu_offload: config.cpu_offload_for(device),
            cache_dir: &config.cache_dir,
        };

        tracing::info!(
            base_model = %config.base_model,
            lora = %config.lora_repo,
            %device,
            runtime = %base_url,
            "Loading pipeline"
        );

        let response = client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|source| ModelLoadError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ModelLoadError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let loaded: LoadPipelineResponse = response
            .json()
            .map_err(|e| ModelLoadError::InvalidResponse(e.to_string()))?;

        tracing::info!(pipeline_id = %loaded.pipeline_id, "Pipeline loaded");

        Ok(Arc::new(RemoteGenerator {
            client,
            base_url,
            pipeline_id: loaded.pipeline_id,
        }))
    }
}

/// A pipeline living on the runtime.
#[derive(Debug)]
pub struct RemoteGenerator {
    client: reqwest::blocking::Client,
    base_url: String,
    pipeline_id: String,
}

impl RemoteGenerator {
    pub fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    fn pipeline_url(&self) -> String {
        format!("{}/v1/pipelines/{}", self.base_url, self.pipeline_id)
    }
}

impl ImageGenerator for RemoteGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<Image, GenerationError> {
        let url = format!("{}/generate", self.pipeline_url());
        tracing::debug!(
            pipeline_id = %self.pipeline_id,
            steps = request.num_inference_steps,
            seed = ?request.seed,
            "Running inference"
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .map_err(GenerationError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GenerationError::Runtime {
                status: status.as_u16(),
                body,
            });
        }

        let generated: GenerateResponse = response
            .json()
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        let encoded = generated
            .images
            .into_iter()
            .next()
            .ok_or(GenerationError::NoImage)?;
        let bytes = base64::engine::general_purpose::STANDARD.decode(encoded.trim())?;
        Ok(decode_png(&bytes)?)
    }

    fn release(&self) {
        match self.client.delete(self.pipeline_url()).send() {
            Ok(response) if response.status().is_success() => {
                tracing::info!(pipeline_id = %self.pipeline_id, "Pipeline released");
            }
            Ok(response) => {
                tracing::warn!(
                    pipeline_id = %self.pipeline_id,
                    status = response.status().as_u16(),
                    "Runtime refused pipeline release"
                );
            }
            Err(e) => {
                tracing::warn!(pipeline_id = %self.pipeline_id, %e, "Failed to release pipeline");
            }
        }
    }
}

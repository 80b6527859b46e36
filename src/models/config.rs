use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::accelerator::Device;

pub const DEFAULT_BASE_MODEL: &str = "stabilityai/stable-diffusion-xl-base-1.0";
pub const DEFAULT_LORA_REPO: &str = "nerijs/pixel-art-xl";
pub const DEFAULT_RUNTIME_URL: &str = "http://127.0.0.1:7860";
pub const DEFAULT_SIZE: u32 = 64;

/// Requested device; `auto` defers to the accelerator probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DevicePreference {
    #[default]
    Auto,
    Cpu,
    Cuda,
    Mps,
}

/// Floating point precision the runtime loads the weights in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    #[default]
    Float16,
    Float32,
    Bfloat16,
}

/// Settings for the diffusion pipeline.
///
/// Two configs that compare equal share one loaded pipeline in the model cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(default)]
pub struct GenerationConfig {
    pub num_inference_steps: u32,
    pub guidance_scale: f32,
    /// Style adapter strength
    pub lora_weight: f32,
    /// Edge length of the raw square render
    pub render_size: u32,
    pub device: DevicePreference,
    pub dtype: DType,
    /// Only honored on cuda
    pub enable_cpu_offload: bool,
    #[schema(value_type = String)]
    pub cache_dir: PathBuf,
    pub runtime_url: String,
    pub base_model: String,
    pub lora_repo: String,
    /// Per-request timeout against the runtime
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            num_inference_steps: 30,
            guidance_scale: 7.5,
            lora_weight: 1.2,
            render_size: 1024,
            device: DevicePreference::Auto,
            dtype: DType::Float16,
            enable_cpu_offload: true,
            cache_dir: default_cache_dir(),
            runtime_url: DEFAULT_RUNTIME_URL.to_string(),
            base_model: DEFAULT_BASE_MODEL.to_string(),
            lora_repo: DEFAULT_LORA_REPO.to_string(),
            timeout_secs: 600,
        }
    }
}

impl GenerationConfig {
    /// Device to use, resolving `auto` against the probed accelerator.
    pub fn resolved_device(&self, probed: Device) -> Device {
        match self.device {
            DevicePreference::Auto => probed,
            DevicePreference::Cpu => Device::Cpu,
            DevicePreference::Cuda => Device::Cuda,
            DevicePreference::Mps => Device::Mps,
        }
    }

    /// CPU offload only applies to cuda placement.
    pub fn cpu_offload_for(&self, device: Device) -> bool {
        self.enable_cpu_offload && device == Device::Cuda
    }
}

/// Per-user cache directory for model weights.
fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("pixelsmith")
}

/// Application configuration loaded from config.yaml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Pipeline settings used when a request does not bring its own
    pub generation: GenerationConfig,

    /// Output edge length when a request does not specify one
    pub default_size: u32,

    /// Palette applied when a request does not name one
    pub default_palette: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            generation: GenerationConfig::default(),
            default_size: DEFAULT_SIZE,
            default_palette: None,
        }
    }
}

impl AppConfig {
    /// Parse configuration from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Load configuration from a file, falling back to defaults on any error.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            tracing::debug!("No config file configured, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_yaml_str(&content) {
                Ok(config) => {
                    tracing::info!(
                        path = %path.display(),
                        runtime = %config.generation.runtime_url,
                        default_size = config.default_size,
                        "Loaded configuration"
                    );
                    config
                }
                Err(e) => {
                    tracing::warn!(%e, path = %path.display(), "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, path = %path.display(), "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    /// Load from the file named by the `CONFIG_FILE` environment variable.
    pub fn from_env() -> Self {
        let path = std::env::var("CONFIG_FILE").ok().map(PathBuf::from);
        Self::load(path.as_deref())
    }
}

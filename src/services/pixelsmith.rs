//! Generation workflow: prompt -> raw render -> downscale -> quantize.

use std::sync::Arc;
use std::time::Instant;

use retro_palette::palette::{self, PaletteSpec};
use retro_palette::{Image, IndexedImage, Palette, PaletteError};

use super::generator::{GenerationRequest, ImageGenerator, ModelLoader};
use super::model_cache::{CacheStatus, ModelCache};
use super::remote_runtime::RemoteRuntimeLoader;
use crate::error::{GenerationError, PixelsmithError};
use crate::models::{accelerator, Device, GenerationConfig, DEFAULT_SIZE};

/// Steers the model away from the smooth, photographic look.
pub const DEFAULT_NEGATIVE_PROMPT: &str =
    "3d render, realistic, blurry, photograph, smooth shading";

/// Owned palette selector, for requests that outlive the caller's borrows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteChoice {
    /// Built-in palette name
    Named(String),
    /// Caller-defined palette
    Custom(Palette),
}

impl PaletteChoice {
    pub fn as_spec(&self) -> PaletteSpec<'_> {
        match self {
            PaletteChoice::Named(name) => PaletteSpec::Named(name),
            PaletteChoice::Custom(palette) => PaletteSpec::Custom(palette),
        }
    }
}

impl From<&str> for PaletteChoice {
    fn from(name: &str) -> Self {
        PaletteChoice::Named(name.to_string())
    }
}

impl From<String> for PaletteChoice {
    fn from(name: String) -> Self {
        PaletteChoice::Named(name)
    }
}

impl From<Palette> for PaletteChoice {
    fn from(palette: Palette) -> Self {
        PaletteChoice::Custom(palette)
    }
}

/// Inputs to [`Pixelsmith::generate`].
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub prompt: String,
    /// Output edge length in pixels
    pub size: u32,
    pub negative_prompt: String,
    /// `None` keeps the downscaled colors
    pub palette: Option<PaletteChoice>,
    pub seed: Option<u64>,
    /// Overrides the default pipeline settings
    pub config: Option<GenerationConfig>,
}

impl GenerateOptions {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            size: DEFAULT_SIZE,
            negative_prompt: DEFAULT_NEGATIVE_PROMPT.to_string(),
            palette: None,
            seed: None,
            config: None,
        }
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        self.negative_prompt = negative_prompt.into();
        self
    }

    pub fn palette(mut self, palette: Option<PaletteChoice>) -> Self {
        self.palette = palette;
        self
    }

    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn config(mut self, config: Option<GenerationConfig>) -> Self {
        self.config = config;
        self
    }
}

/// Generates pixel art through a cached pipeline.
pub struct Pixelsmith {
    cache: ModelCache,
    accelerator: Device,
    default_config: GenerationConfig,
}

impl Pixelsmith {
    pub fn new(
        loader: Arc<dyn ModelLoader>,
        accelerator: Device,
        default_config: GenerationConfig,
    ) -> Self {
        Self {
            cache: ModelCache::new(loader),
            accelerator,
            default_config,
        }
    }

    /// Talk to the runtime at `default_config.runtime_url` on the probed device.
    pub fn with_remote_runtime(default_config: GenerationConfig) -> Self {
        Self::new(
            Arc::new(RemoteRuntimeLoader::new()),
            accelerator::probe(),
            default_config,
        )
    }

    pub fn accelerator(&self) -> Device {
        self.accelerator
    }

    pub fn default_config(&self) -> &GenerationConfig {
        &self.default_config
    }

    /// Generate a `size x size` image for a prompt.
    ///
    /// Inputs are validated before any model work: the palette first, then
    /// the prompt, then the size.
    pub fn generate(&self, options: &GenerateOptions) -> Result<Image, PixelsmithError> {
        let started = Instant::now();

        let palette = palette::resolve(options.palette.as_ref().map(PaletteChoice::as_spec))?;
        if options.prompt.trim().is_empty() {
            return Err(GenerationError::EmptyPrompt.into());
        }
        validate_size(options.size)?;

        let config = options.config.as_ref().unwrap_or(&self.default_config);
        let generator = self.pipeline(config)?;

        let request = GenerationRequest::new(
            options.prompt.as_str(),
            options.negative_prompt.as_str(),
            options.seed,
            config,
        );
        let raw = generator.generate(&request)?;

        let small = retro_palette::downscale(&raw, options.size)?;
        let image = match palette {
            Some(palette) => retro_palette::quantize(&small, palette),
            None => small,
        };

        tracing::info!(
            size = options.size,
            palette = palette.map(Palette::name),
            seed = ?options.seed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Generated image"
        );
        Ok(image)
    }

    fn pipeline(
        &self,
        config: &GenerationConfig,
    ) -> Result<Arc<dyn ImageGenerator>, PixelsmithError> {
        let device = config.resolved_device(self.accelerator);
        Ok(self.cache.get_or_load(config, device)?)
    }

    /// Release the cached pipeline. Returns whether one was loaded.
    pub fn unload(&self) -> bool {
        self.cache.unload()
    }

    pub fn status(&self) -> CacheStatus {
        self.cache.status()
    }
}

/// Reject edge lengths outside `1..=MAX_SIZE` before any work is done.
pub fn validate_size(size: u32) -> Result<(), PixelsmithError> {
    Ok(retro_palette::validate_size(size)?)
}

/// Nearest-neighbor resize to `size x size`.
pub fn downscale(image: &Image, size: u32) -> Result<Image, PixelsmithError> {
    Ok(retro_palette::downscale(image, size)?)
}

/// Quantize to a palette that must be given.
///
/// # Errors
///
/// `PaletteError::Missing` when `palette` is `None`, or the lookup error for
/// an unknown name.
pub fn quantize_palette(
    image: &Image,
    palette: Option<PaletteSpec<'_>>,
) -> Result<Image, PixelsmithError> {
    let palette = palette::resolve(palette)?.ok_or(PaletteError::Missing)?;
    Ok(retro_palette::quantize(image, palette))
}

/// Like [`quantize_palette`] but keeping palette indices, for indexed output.
pub fn quantize_palette_indexed(
    image: &Image,
    palette: Option<PaletteSpec<'_>>,
) -> Result<IndexedImage, PixelsmithError> {
    let palette = palette::resolve(palette)?.ok_or(PaletteError::Missing)?;
    Ok(retro_palette::quantize_indexed(image, palette))
}

pub mod generator;
pub mod model_cache;
pub mod pixelsmith;
pub mod remote_runtime;

pub use generator::{GenerationRequest, ImageGenerator, ModelLoader};
pub use model_cache::{CacheStatus, ModelCache};
pub use pixelsmith::{
    downscale, quantize_palette, quantize_palette_indexed, GenerateOptions, PaletteChoice,
    validate_size, Pixelsmith, DEFAULT_NEGATIVE_PROMPT,
};
pub use remote_runtime::{RemoteGenerator, RemoteRuntimeLoader};

//! Test fixtures: fake pipelines and PNG files.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pixelsmith::error::{GenerationError, ModelLoadError};
use pixelsmith::models::{Device, GenerationConfig};
use pixelsmith::rendering::encode_png;
use pixelsmith::services::{GenerationRequest, ImageGenerator, ModelLoader};
use retro_palette::{Image, Rgb};

/// Noise image; the same seed gives the same pixels
pub fn noise_image(width: u32, height: u32, seed: u64) -> Image {
    let mut rng = StdRng::seed_from_u64(seed);
    let raw: Vec<u8> = (0..width * height * 3).map(|_| rng.gen()).collect();
    Image::from_rgb8(width, height, raw).unwrap()
}

/// Horizontal red gradient over a constant green and blue
pub fn gradient_image(width: u32, height: u32) -> Image {
    let pixels: Vec<Rgb> = (0..height)
        .flat_map(|_| (0..width).map(move |x| Rgb::new((x * 255 / width.max(1)) as u8, 80, 160)))
        .collect();
    Image::from_pixels(width, height, &pixels).unwrap()
}

/// Write `image` as PNG into `dir` and return the path
pub fn write_png(dir: &Path, name: &str, image: &Image) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, encode_png(image).unwrap()).unwrap();
    path
}

/// Renders seeded noise at the requested size and records every request
#[derive(Default)]
pub struct FakeGenerator {
    pub requests: Mutex<Vec<GenerationRequest>>,
    pub releases: AtomicUsize,
    /// Fail inference with a runtime error
    pub fail: bool,
}

impl FakeGenerator {
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl ImageGenerator for FakeGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<Image, GenerationError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(GenerationError::Runtime {
                status: 500,
                body: "CUDA out of memory".to_string(),
            });
        }
        Ok(noise_image(
            request.width,
            request.height,
            request.seed.unwrap_or(0),
        ))
    }

    fn release(&self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

/// Hands out one shared [`FakeGenerator`] and counts loads
pub struct FakeLoader {
    pub generator: Arc<FakeGenerator>,
    pub loads: AtomicUsize,
    pub configs: Mutex<Vec<(GenerationConfig, Device)>>,
    /// Fail every load
    pub fail: bool,
    /// Simulated load time
    pub delay: Option<Duration>,
}

impl FakeLoader {
    pub fn new() -> Self {
        Self::with_generator(FakeGenerator::default())
    }

    pub fn with_generator(generator: FakeGenerator) -> Self {
        Self {
            generator: Arc::new(generator),
            loads: AtomicUsize::new(0),
            configs: Mutex::new(Vec::new()),
            fail: false,
            delay: None,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new()
        }
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl Default for FakeLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelLoader for FakeLoader {
    fn load(
        &self,
        config: &GenerationConfig,
        device: Device,
    ) -> Result<Arc<dyn ImageGenerator>, ModelLoadError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if self.fail {
            return Err(ModelLoadError::Unavailable(
                "weights not downloaded".to_string(),
            ));
        }
        self.configs.lock().unwrap().push((config.clone(), device));
        Ok(self.generator.clone())
    }
}

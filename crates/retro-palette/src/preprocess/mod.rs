//! Resampling before quantization.
//!
//! Diffusion models render at high resolution (typically 1024x1024); pixel
//! art needs a small grid. [`downscale`] shrinks an image to a square target
//! with nearest-neighbor sampling, which never blends colors. That matters
//! because the quantizer runs afterwards and should only see colors that were
//! actually rendered.
//!
//! ```
//! use retro_palette::preprocess::downscale;
//! use retro_palette::{Image, Rgb};
//!
//! let image = Image::filled(8, 8, Rgb::new(0, 0, 0)).unwrap();
//! assert_eq!(downscale(&image, 2).unwrap().dimensions(), (2, 2));
//! ```

mod resize;

pub use resize::{downscale, validate_size, ResizeError, MAX_SIZE};

#![allow(clippy::module_inception)]

//! retro-palette: palette quantization and nearest-neighbor resizing for
//! pixel art
//!
//! The crate turns high-resolution renders into small retro-looking images.
//! It has no dependencies and does no I/O: callers hand in an [`Image`] and get
//! an [`Image`] or [`IndexedImage`] back.
//!
//! # Quick Start
//!
//! ```
//! use retro_palette::{palette, Image, PixelArtProcessor, Rgb};
//!
//! let nes = palette::get("NES").unwrap();
//! let processor = PixelArtProcessor::new(32).palette(Some(nes.clone()));
//!
//! let render = Image::filled(512, 512, Rgb::new(0, 160, 10)).unwrap();
//! let art = processor.process(&render).unwrap();
//!
//! assert_eq!(art.dimensions(), (32, 32));
//! assert!(art.pixels().all(|px| nes.contains(px)));
//! ```
//!
//! # Building Blocks
//!
//! - [`palette`]: the [`Palette`] type, the built-ins [`NES`], [`GAMEBOY`],
//!   [`PICO8`] and [`C64`], and lookup by name
//! - [`preprocess::downscale`]: square nearest-neighbor resize
//! - [`quantize::quantize`]: map each pixel to its nearest palette color
//!
//! # Matching Rule
//!
//! Distance is squared Euclidean distance on the 8-bit RGB channels, computed
//! in `u32`. When several palette entries are equally close the entry with the
//! lowest index wins. Palettes may contain duplicates; the first copy is the
//! one that gets used.

pub mod api;
pub mod color;
pub mod image;
pub mod output;
pub mod palette;
pub mod preprocess;
pub mod quantize;


pub use api::{PixelArtProcessor, PixelError};
pub use color::Rgb;
pub use image::{Image, ImageError, PixelFormat};
pub use output::IndexedImage;
pub use palette::{Palette, PaletteError, PaletteSpec, ParseColorError, C64, GAMEBOY, NES, PICO8};
pub use preprocess::{downscale, validate_size, ResizeError, MAX_SIZE};
pub use quantize::{quantize, quantize_indexed};

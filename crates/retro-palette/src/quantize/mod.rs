//! Palette quantization.
//!
//! Each pixel is replaced by the palette entry with the smallest squared
//! Euclidean distance in 8-bit RGB. There is no dithering: neighboring pixels
//! do not influence each other, so the mapping is a pure function of the
//! pixel color and the palette order.
//!
//! - [`quantize`] returns an RGB [`Image`](crate::Image)
//! - [`quantize_indexed`] returns an [`IndexedImage`](crate::IndexedImage)

mod nearest;

pub use nearest::{quantize, quantize_indexed};

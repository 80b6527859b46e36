//! Output types for the quantization pipeline.
//!
//! [`IndexedImage`] keeps the palette index chosen for every pixel together
//! with the palette, so callers can either render RGB or write an indexed
//! file format without a second color lookup.

mod indexed_image;

pub use indexed_image::IndexedImage;

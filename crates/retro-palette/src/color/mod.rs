//! Color types
//!
//! All colors are 8-bit sRGB triples. Quantization distances are measured
//! directly on these bytes.

mod rgb;

pub use rgb::Rgb;

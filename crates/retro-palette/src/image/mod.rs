//! In-memory image type
//!
//! [`Image`] is the crate's interchange format: a dense 8-bit RGB or RGBA
//! buffer with explicit dimensions. Decoding and encoding of files is left to
//! the caller.

mod buffer;
mod error;

pub use buffer::{Image, PixelFormat};
pub use error::ImageError;

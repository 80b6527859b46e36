//! Public API for the retro-palette crate.
//!
//! This module provides the high-level API: [`PixelArtProcessor`] builder and
//! [`PixelError`] unified error type.

mod builder;
mod error;

pub use builder::PixelArtProcessor;
pub use error::PixelError;

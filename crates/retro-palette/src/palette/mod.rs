//! Palette types, built-in retro palettes and lookup
//!
//! This module provides the [`Palette`] value type, the four built-in
//! palettes ([`NES`], [`GAMEBOY`], [`PICO8`], [`C64`]) and name-based
//! resolution via [`get`] and [`resolve`].

mod error;
mod palette;
mod registry;

pub use error::{PaletteError, ParseColorError};
pub use palette::{Palette, MAX_COLORS};
pub use registry::{builtins, get, names, resolve, PaletteSpec, C64, GAMEBOY, NES, PICO8};

//! Built-in retro palettes and name-based lookup.
//!
//! The four built-ins reproduce the exact colors of the classic console and
//! home computer palettes; the values are part of the public contract.

use super::error::PaletteError;
use super::palette::Palette;
use crate::color::Rgb;

const fn rgb(r: u8, g: u8, b: u8) -> Rgb {
    Rgb::new(r, g, b)
}

#[rustfmt::skip]
static NES_COLORS: [Rgb; 40] = [
    rgb(0, 0, 0), rgb(252, 252, 252), rgb(188, 188, 188), rgb(124, 124, 124),
    rgb(168, 16, 0), rgb(228, 92, 16), rgb(248, 56, 0), rgb(228, 0, 88),
    rgb(104, 68, 0), rgb(172, 124, 0), rgb(248, 184, 0), rgb(248, 120, 88),
    rgb(0, 120, 0), rgb(0, 168, 0), rgb(0, 168, 68), rgb(88, 216, 84),
    rgb(0, 0, 168), rgb(0, 88, 248), rgb(104, 136, 252), rgb(0, 120, 248),
    rgb(148, 0, 132), rgb(216, 0, 204), rgb(248, 120, 248), rgb(120, 120, 248),
    rgb(0, 88, 0), rgb(0, 168, 0), rgb(184, 248, 24), rgb(172, 224, 0),
    rgb(0, 64, 88), rgb(0, 136, 136), rgb(0, 232, 216), rgb(88, 248, 152),
    rgb(248, 164, 0), rgb(232, 208, 124), rgb(248, 216, 168), rgb(248, 184, 108),
    rgb(44, 44, 44), rgb(116, 116, 116), rgb(188, 188, 188), rgb(252, 252, 252),
];

static GAMEBOY_COLORS: [Rgb; 4] = [
    rgb(15, 56, 15),
    rgb(48, 98, 48),
    rgb(139, 172, 15),
    rgb(155, 188, 15),
];

#[rustfmt::skip]
static PICO8_COLORS: [Rgb; 16] = [
    rgb(0, 0, 0), rgb(29, 43, 83), rgb(126, 37, 83), rgb(0, 135, 81),
    rgb(171, 82, 54), rgb(95, 87, 79), rgb(194, 195, 199), rgb(255, 241, 232),
    rgb(255, 0, 77), rgb(255, 163, 0), rgb(255, 236, 39), rgb(0, 228, 54),
    rgb(41, 173, 255), rgb(131, 118, 156), rgb(255, 119, 168), rgb(255, 204, 170),
];

#[rustfmt::skip]
static C64_COLORS: [Rgb; 16] = [
    rgb(0, 0, 0), rgb(255, 255, 255), rgb(136, 0, 0), rgb(170, 255, 238),
    rgb(204, 68, 204), rgb(0, 204, 85), rgb(0, 0, 170), rgb(238, 238, 119),
    rgb(221, 136, 85), rgb(102, 68, 0), rgb(255, 119, 119), rgb(51, 51, 51),
    rgb(119, 119, 119), rgb(170, 255, 102), rgb(0, 136, 255), rgb(187, 187, 187),
];

/// NES-style palette (40 colors, includes repeated entries).
pub static NES: Palette = Palette::from_static("nes", &NES_COLORS);

/// Original Game Boy green palette (4 colors, darkest first).
pub static GAMEBOY: Palette = Palette::from_static("gameboy", &GAMEBOY_COLORS);

/// PICO-8 fantasy console palette (16 colors).
pub static PICO8: Palette = Palette::from_static("pico8", &PICO8_COLORS);

/// Commodore 64 palette (16 colors).
pub static C64: Palette = Palette::from_static("c64", &C64_COLORS);

/// Lookup table keyed by normalized name, sorted by name.
static BUILTINS: [(&str, &Palette); 4] = [
    ("c64", &C64),
    ("gameboy", &GAMEBOY),
    ("nes", &NES),
    ("pico8", &PICO8),
];

/// A caller-supplied palette selector.
///
/// Either the name of a built-in palette or an already constructed
/// [`Palette`]. Use [`resolve`] to turn it into a concrete palette.
#[derive(Debug, Clone, Copy)]
pub enum PaletteSpec<'a> {
    /// Built-in palette name, matched by [`get`]
    Named(&'a str),
    /// A palette passed through unchanged
    Custom(&'a Palette),
}

impl<'a> From<&'a str> for PaletteSpec<'a> {
    fn from(name: &'a str) -> Self {
        PaletteSpec::Named(name)
    }
}

impl<'a> From<&'a String> for PaletteSpec<'a> {
    fn from(name: &'a String) -> Self {
        PaletteSpec::Named(name.as_str())
    }
}

impl<'a> From<&'a Palette> for PaletteSpec<'a> {
    fn from(palette: &'a Palette) -> Self {
        PaletteSpec::Custom(palette)
    }
}

/// Normalize a palette name: lower-case, without `-`, `_` or spaces.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Look up a built-in palette by name.
///
/// Matching is case-insensitive and ignores `-`, `_` and spaces, so
/// `"Game-Boy"`, `"game_boy"` and `"GAMEBOY"` all find [`GAMEBOY`].
///
/// # Errors
///
/// [`PaletteError::UnknownPalette`] listing every valid name, sorted.
///
/// ```
/// use retro_palette::palette;
///
/// assert_eq!(palette::get("Game Boy").unwrap().len(), 4);
/// assert!(palette::get("sega").is_err());
/// ```
pub fn get(name: &str) -> Result<&'static Palette, PaletteError> {
    let key = normalize(name);
    BUILTINS
        .iter()
        .find(|(builtin, _)| *builtin == key)
        .map(|&(_, palette)| palette)
        .ok_or_else(|| PaletteError::UnknownPalette {
            name: name.to_string(),
            available: names(),
        })
}

/// Resolve an optional palette selector.
///
/// `None` means "no quantization requested" and passes through as `None`.
/// A custom palette is returned as the very same reference; a name is looked
/// up with [`get`].
pub fn resolve<'a>(spec: Option<PaletteSpec<'a>>) -> Result<Option<&'a Palette>, PaletteError> {
    match spec {
        None => Ok(None),
        Some(PaletteSpec::Custom(palette)) => Ok(Some(palette)),
        Some(PaletteSpec::Named(name)) => get(name).map(Some),
    }
}

/// Sorted names of all built-in palettes.
pub fn names() -> Vec<&'static str> {
    BUILTINS.iter().map(|&(name, _)| name).collect()
}

/// All built-in palettes, sorted by name.
pub fn builtins() -> impl Iterator<Item = &'static Palette> {
    BUILTINS.iter().map(|&(_, palette)| palette)
}

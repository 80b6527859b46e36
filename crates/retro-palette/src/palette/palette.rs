//! Named palette type with nearest-color matching.

use std::borrow::Cow;

use super::error::PaletteError;
use crate::color::Rgb;

/// Largest palette an 8-bit index can address.
pub const MAX_COLORS: usize = 256;

/// A named, ordered, immutable set of colors used as quantization targets.
///
/// Built-in palettes borrow `'static` data; custom palettes own theirs.
/// Duplicate colors are allowed. Order matters: when two entries are equally
/// close to a pixel, the one with the lower index wins.
///
/// # Example
///
/// ```
/// use retro_palette::{Palette, Rgb};
///
/// let palette = Palette::new("bw", vec![Rgb::new(0, 0, 0), Rgb::new(255, 255, 255)]).unwrap();
/// assert_eq!(palette.len(), 2);
/// assert_eq!(palette.find_nearest(Rgb::new(40, 40, 40)).0, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Palette {
    name: Cow<'static, str>,
    colors: Cow<'static, [Rgb]>,
}

impl Palette {
    /// Create a palette from owned colors.
    ///
    /// # Errors
    ///
    /// - [`PaletteError::EmptyPalette`] if `colors` is empty
    /// - [`PaletteError::TooManyColors`] if there are more than 256 colors
    pub fn new(name: impl Into<String>, colors: impl Into<Vec<Rgb>>) -> Result<Self, PaletteError> {
        let colors = colors.into();
        if colors.is_empty() {
            return Err(PaletteError::EmptyPalette);
        }
        if colors.len() > MAX_COLORS {
            return Err(PaletteError::TooManyColors {
                count: colors.len(),
            });
        }
        Ok(Self {
            name: Cow::Owned(name.into()),
            colors: Cow::Owned(colors),
        })
    }

    /// Create a palette over `'static` data, usable in `static` items.
    ///
    /// # Panics
    ///
    /// Panics (at compile time when used in a `static`) if `colors` is empty
    /// or holds more than 256 entries.
    pub const fn from_static(name: &'static str, colors: &'static [Rgb]) -> Self {
        assert!(!colors.is_empty(), "palette cannot be empty");
        assert!(colors.len() <= MAX_COLORS, "palette has more than 256 colors");
        Self {
            name: Cow::Borrowed(name),
            colors: Cow::Borrowed(colors),
        }
    }

    /// Create a palette from hex color strings such as `"#0f380f"` or `"#fff"`.
    ///
    /// ```
    /// use retro_palette::Palette;
    ///
    /// let palette = Palette::from_hex("duo", &["#000", "#ffffff"]).unwrap();
    /// assert_eq!(palette.len(), 2);
    /// ```
    pub fn from_hex(name: impl Into<String>, colors: &[&str]) -> Result<Self, PaletteError> {
        let parsed = colors
            .iter()
            .map(|s| s.parse::<Rgb>().map_err(PaletteError::ParseColor))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(name, parsed)
    }

    /// The palette's name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The colors in palette order.
    #[inline]
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Returns the number of colors in the palette.
    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always `false`; empty palettes are rejected at construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color at `idx`, if any.
    #[inline]
    pub fn get(&self, idx: usize) -> Option<Rgb> {
        self.colors.get(idx).copied()
    }

    /// Whether `color` is one of the palette entries.
    pub fn contains(&self, color: Rgb) -> bool {
        self.colors.contains(&color)
    }

    /// Find the palette entry closest to `color` by squared RGB distance.
    ///
    /// Returns `(index, distance_squared)`. Ties resolve to the lowest index,
    /// so the result is deterministic for palettes with equidistant or
    /// duplicate entries.
    #[inline]
    pub fn find_nearest(&self, color: Rgb) -> (usize, u32) {
        let mut best_idx = 0;
        let mut best_dist = u32::MAX;

        for (i, &entry) in self.colors.iter().enumerate() {
            let dist = color.distance_squared(entry);
            // Strict comparison keeps the first minimum
            if dist < best_dist {
                best_dist = dist;
                best_idx = i;
                if dist == 0 {
                    break;
                }
            }
        }

        (best_idx, best_dist)
    }
}

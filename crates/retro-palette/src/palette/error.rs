//! Error types for palette operations
//!
//! This module provides error types for color parsing, palette validation
//! and palette lookup.

use std::fmt;
use std::num::ParseIntError;

/// Error type for parsing hex color strings.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseColorError {
    /// Hex string has invalid length (must be 3 or 6 characters after stripping '#')
    InvalidLength,
    /// Hex string contains non-ASCII characters
    NonAscii,
    /// Invalid hexadecimal character encountered
    InvalidHex(ParseIntError),
}

impl From<ParseIntError> for ParseColorError {
    fn from(err: ParseIntError) -> Self {
        ParseColorError::InvalidHex(err)
    }
}

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseColorError::InvalidLength => {
                write!(f, "invalid hex color length (expected 3 or 6 characters)")
            }
            ParseColorError::NonAscii => write!(f, "hex color contains non-ASCII characters"),
            ParseColorError::InvalidHex(err) => {
                write!(f, "invalid hex character: {}", err)
            }
        }
    }
}

impl std::error::Error for ParseColorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseColorError::InvalidHex(err) => Some(err),
            _ => None,
        }
    }
}

/// Error type for palette construction and lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum PaletteError {
    /// No colors provided in palette
    EmptyPalette,
    /// More colors than an 8-bit index can address
    TooManyColors {
        /// Number of colors supplied
        count: usize,
    },
    /// No built-in palette matches the requested name
    UnknownPalette {
        /// Name as supplied by the caller
        name: String,
        /// Sorted names of all built-in palettes
        available: Vec<&'static str>,
    },
    /// A palette was required but none was supplied
    Missing,
    /// Invalid hex color string
    ParseColor(ParseColorError),
}

impl From<ParseColorError> for PaletteError {
    fn from(err: ParseColorError) -> Self {
        PaletteError::ParseColor(err)
    }
}

impl fmt::Display for PaletteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaletteError::EmptyPalette => {
                write!(f, "palette cannot be empty")
            }
            PaletteError::TooManyColors { count } => {
                write!(f, "palette has {} colors (max 256)", count)
            }
            PaletteError::UnknownPalette { name, available } => {
                write!(
                    f,
                    "unknown palette '{}' (available: {})",
                    name,
                    available.join(", ")
                )
            }
            PaletteError::Missing => {
                write!(f, "a palette is required for quantization")
            }
            PaletteError::ParseColor(err) => {
                write!(f, "invalid color: {}", err)
            }
        }
    }
}

impl std::error::Error for PaletteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PaletteError::ParseColor(err) => Some(err),
            _ => None,
        }
    }
}

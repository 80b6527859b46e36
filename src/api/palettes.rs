use axum::response::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use retro_palette::{palette, Palette};

use crate::error::ApiError;
use crate::services::PaletteChoice;

/// Palette selector in request bodies
///
/// Either a built-in palette name (`"nes"`, `"Game Boy"`, ...) or a list of
/// `#rrggbb` colors forming a custom palette.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum PaletteParam {
    Name(String),
    Colors(Vec<String>),
}

impl PaletteParam {
    /// Parse custom colors; names are looked up later by the workflow.
    pub fn into_choice(self) -> Result<PaletteChoice, ApiError> {
        match self {
            PaletteParam::Name(name) => Ok(PaletteChoice::Named(name)),
            PaletteParam::Colors(colors) => {
                let colors: Vec<&str> = colors.iter().map(String::as_str).collect();
                Ok(PaletteChoice::Custom(Palette::from_hex("custom", &colors)?))
            }
        }
    }
}

/// A built-in palette
#[derive(Debug, Serialize, ToSchema)]
pub struct PaletteInfo {
    /// Canonical lookup name
    pub name: String,
    /// Colors as `#rrggbb`, in palette order
    pub colors: Vec<String>,
}

impl From<&Palette> for PaletteInfo {
    fn from(palette: &Palette) -> Self {
        Self {
            name: palette.name().to_string(),
            colors: palette.colors().iter().map(|c| c.to_hex()).collect(),
        }
    }
}

/// Response from the /api/palettes endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct PalettesResponse {
    pub palettes: Vec<PaletteInfo>,
}

/// List built-in palettes
#[utoipa::path(
    get,
    path = "/api/palettes",
    responses(
        (status = 200, description = "Built-in palettes, sorted by name", body = PalettesResponse),
    ),
    tag = "Palettes"
)]
pub async fn handle_palettes() -> Json<PalettesResponse> {
    Json(PalettesResponse {
        palettes: palette::builtins().map(PaletteInfo::from).collect(),
    })
}

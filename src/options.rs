use std::path::PathBuf;

use crate::error::Error;
use crate::geometry::{Orientation, PageFormat, PageGeometry};

/// Environment variable naming a TrueType/OpenType file used instead of Helvetica.
pub const FONT_ENV_VAR: &str = "PAGEFLOW_FONT";

/// Font sizes in points, per block kind. Applies to one render pass only.
#[derive(Clone, Debug, PartialEq)]
pub struct FontSizeOverrides {
    pub heading: [f32; 3], // levels 1..=3
    pub paragraph: f32,
    pub key_value: f32,
}

impl Default for FontSizeOverrides {
    fn default() -> Self {
        Self {
            heading: [18.0, 15.0, 13.0],
            paragraph: 11.0,
            key_value: 11.0,
        }
    }
}

impl FontSizeOverrides {
    pub fn heading(&self, level: u8) -> f32 {
        self.heading[heading_slot(level)]
    }
}

/// Line height multipliers (line pitch = font size * multiplier).
#[derive(Clone, Debug, PartialEq)]
pub struct LineHeightOverrides {
    pub heading: f32,
    pub paragraph: f32,
    pub key_value: f32,
}

impl Default for LineHeightOverrides {
    fn default() -> Self {
        Self {
            heading: 1.25,
            paragraph: 1.4,
            key_value: 1.35,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
pub enum FontChoice {
    /// Standard 14 Helvetica / Helvetica-Bold, nothing embedded.
    #[default]
    Helvetica,
    /// A font file; `bold` falls back to `regular` when absent.
    File {
        regular: PathBuf,
        bold: Option<PathBuf>,
    },
}

impl FontChoice {
    /// `File` when `PAGEFLOW_FONT` is set to a non-empty path, `Helvetica` otherwise.
    pub fn from_env() -> Self {
        match std::env::var(FONT_ENV_VAR) {
            Ok(val) if !val.trim().is_empty() => FontChoice::File {
                regular: PathBuf::from(val.trim()),
                bold: None,
            },
            _ => FontChoice::Helvetica,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderOptions {
    pub filename: String,
    pub page_format: PageFormat,
    pub orientation: Orientation,
    pub margin_mm: f32,
    /// Raster render scale, see [`PageGeometry::scale`].
    pub scale: f32,
    pub font_sizes: FontSizeOverrides,
    pub line_heights: LineHeightOverrides,
    /// Vertical gap after each block, in points.
    pub block_gap: f32,
    pub font: FontChoice,
    pub background: [u8; 3],
    pub title: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            filename: "document.pdf".to_string(),
            page_format: PageFormat::A4,
            orientation: Orientation::Portrait,
            margin_mm: 10.0,
            scale: 2.0,
            font_sizes: FontSizeOverrides::default(),
            line_heights: LineHeightOverrides::default(),
            block_gap: 6.0,
            font: FontChoice::Helvetica,
            background: [255, 255, 255],
            title: None,
        }
    }
}

impl RenderOptions {
    pub fn geometry(&self) -> Result<PageGeometry, Error> {
        PageGeometry::from_format(self.page_format, self.orientation, self.margin_mm, self.scale)
    }
}

pub(crate) fn heading_slot(level: u8) -> usize {
    level.clamp(1, 3) as usize - 1
}

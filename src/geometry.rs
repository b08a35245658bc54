use crate::error::Error;

pub const PT_PER_MM: f32 = 72.0 / 25.4;

pub fn mm_to_pt(mm: f32) -> f32 {
    mm * PT_PER_MM
}

pub fn pt_to_mm(pt: f32) -> f32 {
    pt / PT_PER_MM
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PageFormat {
    #[default]
    A4,
    Letter,
}

impl PageFormat {
    /// Portrait (width, height) in points.
    pub fn size_pt(self) -> (f32, f32) {
        match self {
            PageFormat::A4 => (595.28, 841.89),
            PageFormat::Letter => (612.0, 792.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Physical page description. Lengths are in points. `scale` is the raster
/// render scale: surface pixels per layout unit, and the resolution (pixels
/// per point) raster pages are resampled to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub scale: f32,
}

impl PageGeometry {
    pub fn new(page_width: f32, page_height: f32, margin: f32, scale: f32) -> Result<Self, Error> {
        if !(margin >= 0.0) {
            return Err(Error::InvalidGeometry(format!("negative margin {margin}")));
        }
        if !(scale > 0.0) || !scale.is_finite() {
            return Err(Error::InvalidGeometry(format!("scale must be positive, got {scale}")));
        }
        let geometry = Self {
            page_width,
            page_height,
            margin,
            scale,
        };
        if !(geometry.content_width() > 0.0) || !(geometry.content_height() > 0.0) {
            return Err(Error::InvalidGeometry(format!(
                "margin {margin:.1}pt leaves no printable area on a {page_width:.1}x{page_height:.1}pt page"
            )));
        }
        Ok(geometry)
    }

    pub fn from_format(
        format: PageFormat,
        orientation: Orientation,
        margin_mm: f32,
        scale: f32,
    ) -> Result<Self, Error> {
        let (w, h) = format.size_pt();
        let (w, h) = match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        };
        Self::new(w, h, mm_to_pt(margin_mm), scale)
    }

    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    pub fn content_height(&self) -> f32 {
        self.page_height - 2.0 * self.margin
    }

    /// Pixel width the printable area is resampled to in raster mode.
    pub fn content_width_px(&self) -> u32 {
        (self.content_width() * self.scale).round().max(1.0) as u32
    }
}


use image::{Rgba, RgbaImage, imageops};

use crate::annotate::{Bounds, ContentElement, ContentNode};
use crate::error::Error;
use crate::geometry::PageGeometry;
use crate::model::PageSlice;

/// Where raster-mode content comes from: a structural description of the
/// region, and the bitmap it renders to.
pub trait SurfaceSource {
    type Node: ContentNode;

    /// The region to export, `None` when it is not available.
    fn region(&self) -> Option<&Self::Node>;

    /// Render the region at `scale` surface pixels per layout unit.
    fn acquire_surface(&self, scale: f32) -> Result<RgbaImage, Error>;
}

/// A region that was rendered ahead of time, e.g. a screenshot plus the
/// layout tree exported next to it.
pub struct StaticSurface {
    image: RgbaImage,
    region: Option<ContentElement>,
}

impl StaticSurface {
    pub fn new(image: RgbaImage, region: ContentElement) -> Self {
        Self {
            image,
            region: Some(region),
        }
    }

    /// A surface whose structure is unknown: the whole image is one block.
    pub fn without_structure(image: RgbaImage) -> Self {
        let bounds = Bounds::new(0.0, 0.0, image.width() as f32, image.height() as f32);
        Self::new(image, ContentElement::new(Default::default(), bounds))
    }

    pub fn missing() -> Self {
        Self {
            image: RgbaImage::new(0, 0),
            region: None,
        }
    }
}

impl SurfaceSource for StaticSurface {
    type Node = ContentElement;

    fn region(&self) -> Option<&ContentElement> {
        self.region.as_ref()
    }

    fn acquire_surface(&self, _scale: f32) -> Result<RgbaImage, Error> {
        if self.image.width() == 0 || self.image.height() == 0 {
            return Err(Error::Render("surface is empty".into()));
        }
        Ok(self.image.clone())
    }
}

/// One output page cut from the surface.
pub struct RasterPage {
    pub image: RgbaImage,
    /// The surface rows this page was cut from.
    pub slice: PageSlice,
    /// Placed size on the page, in points.
    pub width_pt: f32,
    pub height_pt: f32,
}

/// Cut `surface` into one image per slice.
///
/// Each slice is copied onto a background-filled buffer, excluded regions are
/// blanked, and the result is resampled to the printable width of `geometry`
/// with its aspect ratio preserved.
pub fn compose_pages(
    surface: &RgbaImage,
    slices: &[PageSlice],
    geometry: &PageGeometry,
    background: [u8; 3],
    excluded: &[Bounds],
) -> Vec<RasterPage> {
    let width = surface.width();
    let px_per_pt = width as f32 / geometry.content_width();
    let target_w = geometry.content_width_px();
    let fill = Rgba([background[0], background[1], background[2], 255]);

    slices
        .iter()
        .map(|slice| {
            let top = (slice.start.round().max(0.0) as u32).min(surface.height());
            let bottom = (slice.end.round().max(0.0) as u32).min(surface.height());
            let height = bottom.saturating_sub(top).max(1);

            let mut page = RgbaImage::from_pixel(width, height, fill);
            if bottom > top {
                let part = imageops::crop_imm(surface, 0, top, width, bottom - top).to_image();
                imageops::overlay(&mut page, &part, 0, 0);
            }
            for region in excluded {
                blank(&mut page, region, top, fill);
            }

            let image = if target_w != width {
                let target_h = ((height as f32) * target_w as f32 / width as f32)
                    .round()
                    .max(1.0) as u32;
                imageops::resize(&page, target_w, target_h, imageops::FilterType::Triangle)
            } else {
                page
            };

            RasterPage {
                image,
                slice: *slice,
                width_pt: geometry.content_width(),
                height_pt: height as f32 / px_per_pt,
            }
        })
        .collect()
}

/// Paint the part of `region` (surface coordinates) that falls on `page`,
/// whose first row is surface row `page_top`.
fn blank(page: &mut RgbaImage, region: &Bounds, page_top: u32, fill: Rgba<u8>) {
    let y0 = region.y - page_top as f32;
    let y1 = region.bottom() - page_top as f32;
    let x0 = region.x.max(0.0).round() as u32;
    let x1 = ((region.x + region.width).round().max(0.0) as u32).min(page.width());
    let y0 = (y0.max(0.0).round() as u32).min(page.height());
    let y1 = (y1.max(0.0).round() as u32).min(page.height());
    for y in y0..y1 {
        for x in x0..x1 {
            page.put_pixel(x, y, fill);
        }
    }
}

pub mod annotate;
mod error;
pub mod filename;
pub mod flow;
pub mod fonts;
pub mod geometry;
#[cfg(feature = "serde")]
pub mod input;
pub mod model;
pub mod options;
pub mod paginate;
pub mod pdf;
pub mod raster;

pub use annotate::{Annotations, Bounds, ContentElement, ContentNode, Markers, NodeKind, annotate};
pub use error::Error;
pub use flow::{FlowDocument, FlowPage, PlacedLine};
pub use fonts::{FontSet, FontStyle};
pub use geometry::{Orientation, PageFormat, PageGeometry};
pub use model::{Block, Extent, KeepTogetherRange, PageSlice, RangeOrigin};
pub use options::{FontChoice, RenderOptions};
pub use paginate::{BreakContext, OrphanGuard, paginate, select_break};
pub use raster::{RasterPage, StaticSurface, SurfaceSource};

use std::path::{Path, PathBuf};
use std::time::Instant;

/// Lay out `blocks` and encode them as PDF bytes.
pub fn render_blocks(blocks: &[Block], options: &RenderOptions) -> Result<Vec<u8>, Error> {
    let t0 = Instant::now();
    let geometry = options.geometry()?;
    let fonts = FontSet::load(&options.font, &flow::used_chars(blocks))?;
    let t_fonts = t0.elapsed();

    let doc = flow::compose(blocks, &geometry, options, &fonts);
    let t_compose = t0.elapsed();

    let bytes = pdf::encode_flow(&doc, &geometry, options, &fonts)?;
    let t_encode = t0.elapsed();

    log::info!(
        "Timing: fonts={:.1}ms, compose={:.1}ms, encode={:.1}ms ({} blocks, {} pages, {} bytes)",
        t_fonts.as_secs_f64() * 1000.0,
        (t_compose - t_fonts).as_secs_f64() * 1000.0,
        (t_encode - t_compose).as_secs_f64() * 1000.0,
        blocks.len(),
        doc.page_count(),
        bytes.len(),
    );
    Ok(bytes)
}

/// Acquire, annotate, slice and encode a raster source as PDF bytes.
pub fn render_surface<S: SurfaceSource>(source: &S, options: &RenderOptions) -> Result<Vec<u8>, Error> {
    let t0 = Instant::now();
    let geometry = options.geometry()?;
    let region = source
        .region()
        .ok_or_else(|| Error::MissingSource("content region is not available".into()))?;

    let surface = source.acquire_surface(geometry.scale)?;
    if surface.width() == 0 || surface.height() == 0 {
        return Err(Error::Render("surface is empty".into()));
    }
    let t_acquire = t0.elapsed();

    let region_width = region.bounds().width;
    let px_per_unit = if region_width > 0.0 {
        surface.width() as f32 / region_width
    } else {
        geometry.scale
    };
    if (px_per_unit - geometry.scale).abs() > 0.01 {
        log::debug!(
            "surface rendered at {px_per_unit:.3}px per unit (requested {:.3})",
            geometry.scale
        );
    }
    let mut annotations = annotate(region, px_per_unit);
    annotations.clamp_to(surface.height() as f32);
    let t_annotate = t0.elapsed();

    let px_per_pt = surface.width() as f32 / geometry.content_width();
    let max_extent = geometry.content_height() * px_per_pt;
    let slices = paginate(&annotations, max_extent, OrphanGuard::for_pixels(px_per_pt));
    let t_paginate = t0.elapsed();

    let pages = raster::compose_pages(
        &surface,
        &slices,
        &geometry,
        options.background,
        &annotations.excluded,
    );
    let t_compose = t0.elapsed();

    let bytes = pdf::encode_raster(&pages, &geometry, options)?;
    let t_encode = t0.elapsed();

    log::info!(
        "Timing: acquire={:.1}ms, annotate={:.1}ms, paginate={:.1}ms, compose={:.1}ms, encode={:.1}ms ({} pages, {} bytes)",
        t_acquire.as_secs_f64() * 1000.0,
        (t_annotate - t_acquire).as_secs_f64() * 1000.0,
        (t_paginate - t_annotate).as_secs_f64() * 1000.0,
        (t_compose - t_paginate).as_secs_f64() * 1000.0,
        (t_encode - t_compose).as_secs_f64() * 1000.0,
        pages.len(),
        bytes.len(),
    );
    Ok(bytes)
}

/// Render `blocks` and write the PDF to `output`; see [`persist`].
pub fn export_blocks(blocks: &[Block], options: &RenderOptions, output: &Path) -> Result<PathBuf, Error> {
    let bytes = render_blocks(blocks, options)?;
    persist(output, &options.filename, &bytes)
}

/// Render `source` and write the PDF to `output`; see [`persist`].
pub fn export_surface<S: SurfaceSource>(
    source: &S,
    options: &RenderOptions,
    output: &Path,
) -> Result<PathBuf, Error> {
    let bytes = render_surface(source, options)?;
    persist(output, &options.filename, &bytes)
}

/// Write `bytes` to `output`, or to a sanitized `filename` inside it when
/// `output` is a directory. The data goes to a sibling temporary file first and
/// is renamed into place, so the target never holds a partial document.
pub fn persist(output: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf, Error> {
    let t0 = Instant::now();
    let target = if output.is_dir() {
        output.join(filename::sanitize_filename(filename))
    } else {
        output.to_path_buf()
    };

    let file_name = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{}: not a file path", target.display()),
        )))?;
    let tmp = target.with_file_name(format!(".{file_name}.part"));

    if let Err(e) = std::fs::write(&tmp, bytes) {
        let _ = std::fs::remove_file(&tmp);
        return Err(Error::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {e}", target.display()),
        )));
    }
    if let Err(e) = std::fs::rename(&tmp, &target) {
        let _ = std::fs::remove_file(&tmp);
        return Err(Error::Io(e));
    }

    log::info!(
        "wrote {} ({} bytes) in {:.1}ms",
        target.display(),
        bytes.len(),
        t0.elapsed().as_secs_f64() * 1000.0,
    );
    Ok(target)
}

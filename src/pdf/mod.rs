mod text;
mod xobject;

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, TextStr};

use crate::error::Error;
use crate::flow::FlowDocument;
use crate::fonts::{FontSet, FontStyle, embed_font};
use crate::geometry::PageGeometry;
use crate::options::RenderOptions;
use crate::raster::RasterPage;

use text::{PageFonts, render_lines};

const PRODUCER: &str = concat!("pageflow-pdf ", env!("CARGO_PKG_VERSION"));

struct PageOut {
    content: Content,
    xobjects: Vec<(String, Ref)>,
}

/// Serialize laid-out text pages. Fonts are embedded once and shared by all pages.
pub fn encode_flow(
    doc: &FlowDocument,
    geometry: &PageGeometry,
    options: &RenderOptions,
    fonts: &FontSet,
) -> Result<Vec<u8>, Error> {
    if doc.pages.is_empty() {
        return Err(Error::Encoding("document has no pages".into()));
    }
    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();

    let regular = embed_font(
        &mut pdf,
        &fonts.regular,
        "F1".to_string(),
        &doc.used_chars(FontStyle::Regular),
        &mut alloc,
    )?;
    let bold = embed_font(
        &mut pdf,
        &fonts.bold,
        "F2".to_string(),
        &doc.used_chars(FontStyle::Bold),
        &mut alloc,
    )?;
    let entries = PageFonts {
        regular: &regular,
        bold: &bold,
    };

    let pages: Vec<PageOut> = doc
        .pages
        .iter()
        .map(|page| {
            let mut content = Content::new();
            render_lines(&mut content, &page.lines, geometry, &entries, fonts);
            PageOut {
                content,
                xobjects: Vec::new(),
            }
        })
        .collect();

    let font_pairs = [
        (regular.pdf_name.clone(), regular.font_ref),
        (bold.pdf_name.clone(), bold.font_ref),
    ];
    write_pages(
        pdf,
        &mut alloc,
        catalog_id,
        pages_id,
        pages,
        &font_pairs,
        geometry,
        options,
    )
}

/// Serialize raster pages, one image per page placed at the top margin.
pub fn encode_raster(
    pages: &[RasterPage],
    geometry: &PageGeometry,
    options: &RenderOptions,
) -> Result<Vec<u8>, Error> {
    if pages.is_empty() {
        return Err(Error::Encoding("document has no pages".into()));
    }
    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();

    let mut out = Vec::with_capacity(pages.len());
    for (i, page) in pages.iter().enumerate() {
        let xobj_ref = alloc();
        xobject::embed_rgba(&mut pdf, xobj_ref, &page.image, &mut alloc)?;
        let pdf_name = format!("Im{}", i + 1);

        let y_bottom = geometry.page_height - geometry.margin - page.height_pt;
        let mut content = Content::new();
        content.save_state();
        content.transform([
            page.width_pt,
            0.0,
            0.0,
            page.height_pt,
            geometry.margin,
            y_bottom,
        ]);
        content.x_object(Name(pdf_name.as_bytes()));
        content.restore_state();

        out.push(PageOut {
            content,
            xobjects: vec![(pdf_name, xobj_ref)],
        });
    }

    write_pages(pdf, &mut alloc, catalog_id, pages_id, out, &[], geometry, options)
}

#[allow(clippy::too_many_arguments)]
fn write_pages(
    mut pdf: Pdf,
    alloc: &mut impl FnMut() -> Ref,
    catalog_id: Ref,
    pages_id: Ref,
    pages: Vec<PageOut>,
    font_pairs: &[(String, Ref)],
    geometry: &PageGeometry,
    options: &RenderOptions,
) -> Result<Vec<u8>, Error> {
    let n = pages.len();
    let count = i32::try_from(n).map_err(|_| Error::Encoding(format!("{n} pages is too many")))?;
    let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(count);

    for (i, page) in pages.into_iter().enumerate() {
        let raw = page.content.finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
        pdf.stream(content_ids[i], &compressed).filter(Filter::FlateDecode);

        let mut pdf_page = pdf.page(page_ids[i]);
        pdf_page
            .media_box(Rect::new(0.0, 0.0, geometry.page_width, geometry.page_height))
            .parent(pages_id)
            .contents(content_ids[i]);
        let mut resources = pdf_page.resources();
        if !font_pairs.is_empty() {
            let mut fonts = resources.fonts();
            for (name, font_ref) in font_pairs {
                fonts.pair(Name(name.as_bytes()), *font_ref);
            }
        }
        if !page.xobjects.is_empty() {
            let mut xobjects = resources.x_objects();
            for (name, xobj_ref) in &page.xobjects {
                xobjects.pair(Name(name.as_bytes()), *xobj_ref);
            }
        }
    }

    let info_id = alloc();
    let mut info = pdf.document_info(info_id);
    if let Some(title) = options.title.as_deref() {
        info.title(TextStr(title));
    }
    info.producer(TextStr(PRODUCER));
    drop(info);

    Ok(pdf.finish())
}

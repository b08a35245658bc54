use pdf_writer::{Content, Name, Str};

use crate::flow::PlacedLine;
use crate::fonts::{FontEntry, FontSet, FontStyle};
use crate::geometry::PageGeometry;

pub(super) struct PageFonts<'a> {
    pub(super) regular: &'a FontEntry,
    pub(super) bold: &'a FontEntry,
}

impl PageFonts<'_> {
    fn get(&self, style: FontStyle) -> &FontEntry {
        match style {
            FontStyle::Regular => self.regular,
            FontStyle::Bold => self.bold,
        }
    }
}

/// Write the lines of one page into `content`, converting content-area
/// coordinates (top-down) to PDF user space (bottom-up).
pub(super) fn render_lines(
    content: &mut Content,
    lines: &[PlacedLine],
    geometry: &PageGeometry,
    entries: &PageFonts<'_>,
    metrics: &FontSet,
) {
    if lines.iter().all(|l| l.text.is_empty()) {
        return;
    }
    let content_top = geometry.page_height - geometry.margin;

    let mut cur_font_name = String::new();
    let mut cur_font_size: f32 = -1.0;
    let mut td_x = 0.0_f32;
    let mut td_y = 0.0_f32;

    content.begin_text();
    content.set_fill_gray(0.0);
    for line in lines.iter().filter(|l| !l.text.is_empty()) {
        let entry = entries.get(line.style);
        let ascender = metrics.get(line.style).ascender();
        let leading = (line.height - line.font_size).max(0.0) / 2.0;
        let x = geometry.margin + line.x;
        let y = content_top - line.top - leading - line.font_size * ascender;

        if cur_font_name != entry.pdf_name || cur_font_size != line.font_size {
            content.set_font(Name(entry.pdf_name.as_bytes()), line.font_size);
            cur_font_name.clear();
            cur_font_name.push_str(&entry.pdf_name);
            cur_font_size = line.font_size;
        }

        content.next_line(x - td_x, y - td_y);
        td_x = x;
        td_y = y;
        content.show(Str(&entry.encode(&line.text)));
    }
    content.end_text();
}

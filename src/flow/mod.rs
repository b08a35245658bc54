//! Vector-mode layout: blocks are placed forward onto pages and never cut
//! after the fact.

mod wrap;

use std::collections::HashSet;

use crate::fonts::{FontSet, FontStyle};
use crate::geometry::PageGeometry;
use crate::model::Block;
use crate::options::RenderOptions;
use crate::paginate::OrphanGuard;

use wrap::{text_width, wrap_text};

/// Share of the content width given to the key in a one-line key/value row.
pub const KEY_COLUMN_SHARE: f32 = 0.4;

/// One line of text at its final position. `x` and `top` are relative to the
/// top-left corner of the page's content area, in points.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedLine {
    pub block_index: usize,
    pub text: String,
    pub x: f32,
    pub top: f32,
    pub height: f32,
    pub font_size: f32,
    pub style: FontStyle,
}

impl PlacedLine {
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlowPage {
    pub lines: Vec<PlacedLine>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlowDocument {
    pub pages: Vec<FlowPage>,
}

impl FlowDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Page indices holding at least one line of block `block_index`.
    pub fn pages_of_block(&self, block_index: usize) -> Vec<usize> {
        self.pages
            .iter()
            .enumerate()
            .filter(|(_, p)| p.lines.iter().any(|l| l.block_index == block_index))
            .map(|(i, _)| i)
            .collect()
    }

    pub(crate) fn used_chars(&self, style: FontStyle) -> HashSet<char> {
        let mut chars: HashSet<char> = self
            .pages
            .iter()
            .flat_map(|p| p.lines.iter())
            .filter(|l| l.style == style)
            .flat_map(|l| l.text.chars())
            .collect();
        chars.insert(' ');
        chars
    }
}

/// Every character the blocks can put on a page, for font loading.
pub fn used_chars(blocks: &[Block]) -> HashSet<char> {
    let mut chars: HashSet<char> = blocks
        .iter()
        .flat_map(|b| -> Box<dyn Iterator<Item = char> + '_> {
            match b {
                Block::Heading { text, .. } | Block::Paragraph { text } => Box::new(text.chars()),
                Block::KeyValue { key, value } => Box::new(key.chars().chain(value.chars())),
                Block::Spacer { .. } => Box::new(std::iter::empty()),
            }
        })
        .collect();
    chars.insert(' ');
    chars.insert(':');
    chars
}

struct Segment {
    text: String,
    x: f32,
    style: FontStyle,
    font_size: f32,
}

/// A horizontal band of one block: one line, or a key/value pair side by side.
struct Row {
    segments: Vec<Segment>,
    height: f32,
}

fn rows_for_lines(text: &str, style: FontStyle, size: f32, pitch: f32, fonts: &FontSet, width: f32) -> Vec<Row> {
    wrap_text(text, fonts.get(style), size, width)
        .into_iter()
        .map(|line| Row {
            segments: vec![Segment {
                text: line.text,
                x: 0.0,
                style,
                font_size: size,
            }],
            height: pitch,
        })
        .collect()
}

fn prepare(block: &Block, options: &RenderOptions, fonts: &FontSet, width: f32) -> Vec<Row> {
    let sizes = &options.font_sizes;
    let pitches = &options.line_heights;
    match block {
        Block::Heading { level, text } => {
            let size = sizes.heading(*level);
            let pitch = fonts.bold.line_pitch(size, pitches.heading);
            rows_for_lines(text, FontStyle::Bold, size, pitch, fonts, width)
        }
        Block::Paragraph { text } => {
            let size = sizes.paragraph;
            let pitch = fonts.regular.line_pitch(size, pitches.paragraph);
            rows_for_lines(text, FontStyle::Regular, size, pitch, fonts, width)
        }
        Block::KeyValue { key, value } => {
            let size = sizes.key_value;
            let pitch = fonts
                .regular
                .line_pitch(size, pitches.key_value)
                .max(fonts.bold.line_pitch(size, pitches.key_value));
            let label = format!("{}:", key.trim_end());
            let key_w = text_width(&label, &fonts.bold, size);
            let value_w = text_width(value, &fonts.regular, size);
            let key_budget = width * KEY_COLUMN_SHARE;
            let value_budget = width - key_budget;

            let single_line = !value.contains('\n')
                && !value.trim().is_empty()
                && key_w <= key_budget
                && value_w <= value_budget;
            if single_line {
                return vec![Row {
                    segments: vec![
                        Segment {
                            text: label,
                            x: 0.0,
                            style: FontStyle::Bold,
                            font_size: size,
                        },
                        Segment {
                            text: value.split_whitespace().collect::<Vec<_>>().join(" "),
                            x: key_budget,
                            style: FontStyle::Regular,
                            font_size: size,
                        },
                    ],
                    height: pitch,
                }];
            }

            let mut rows = rows_for_lines(&label, FontStyle::Bold, size, pitch, fonts, width);
            rows.extend(rows_for_lines(value, FontStyle::Regular, size, pitch, fonts, width));
            rows
        }
        Block::Spacer { .. } => Vec::new(),
    }
}

struct Cursor {
    content_height: f32,
    pages: Vec<FlowPage>,
    current: FlowPage,
    top: f32,
}

impl Cursor {
    fn remaining(&self) -> f32 {
        self.content_height - self.top
    }

    fn at_page_top(&self) -> bool {
        self.top <= 0.0
    }

    /// Close the current page. A page that received no lines is reused.
    fn break_page(&mut self) {
        if !self.current.lines.is_empty() {
            self.pages.push(std::mem::take(&mut self.current));
        }
        self.top = 0.0;
    }

    fn emit(&mut self, block_index: usize, row: Row) {
        for seg in row.segments {
            self.current.lines.push(PlacedLine {
                block_index,
                text: seg.text,
                x: seg.x,
                top: self.top,
                height: row.height,
                font_size: seg.font_size,
                style: seg.style,
            });
        }
        self.top += row.height;
    }

    fn finish(mut self) -> Vec<FlowPage> {
        if !self.current.lines.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

/// Space the heading at `i` (`extent` tall) must keep free below itself: the
/// spacers and headings that follow it, then the first block with content.
/// That block counts whole when the run fits on one page with it, otherwise
/// only its first line does. Trailing spacers with nothing after them are not
/// counted.
fn reserve_after(
    i: usize,
    extent: f32,
    blocks: &[Block],
    prepared: &[Option<Vec<Row>>],
    gap: f32,
    content_height: f32,
) -> f32 {
    let mut run = 0.0f32;
    let mut spacing = 0.0f32;
    for (block, rows) in blocks[i + 1..].iter().zip(&prepared[i + 1..]) {
        if let Block::Spacer { height } = block {
            spacing += height.max(0.0);
            continue;
        }
        let Some(rows) = rows.as_ref().filter(|r| !r.is_empty()) else {
            continue;
        };
        let whole: f32 = rows.iter().map(|r| r.height).sum();
        run += spacing + gap;
        spacing = 0.0;
        if block.is_heading() {
            run += whole;
            continue;
        }
        return if extent + run + whole <= content_height {
            run + whole
        } else {
            run + rows[0].height
        };
    }
    run
}

/// Lay out `blocks` onto pages of `geometry`'s content area.
///
/// A block moves to a new page whole when it does not fit; only a block
/// taller than a full page is allowed to continue line by line. Headings
/// need room for every heading and spacer that follows them plus the next
/// block with content (its first line when the run cannot share a page), and
/// never less than the orphan guard's minimum. Whatever comes right after a
/// heading is never moved away from it; a spacer there that does not fit is
/// collapsed.
pub fn compose(
    blocks: &[Block],
    geometry: &PageGeometry,
    options: &RenderOptions,
    fonts: &FontSet,
) -> FlowDocument {
    let width = geometry.content_width();
    let guard = OrphanGuard::for_points();
    let prepared: Vec<Vec<Row>> = blocks
        .iter()
        .map(|b| prepare(b, options, fonts, width))
        .collect();
    let mut prepared: Vec<Option<Vec<Row>>> = prepared.into_iter().map(Some).collect();

    let mut cursor = Cursor {
        content_height: geometry.content_height(),
        pages: Vec::new(),
        current: FlowPage::default(),
        top: 0.0,
    };

    for (i, block) in blocks.iter().enumerate() {
        // Anything placed right after a heading stays on the heading's page.
        let follows_heading = cursor
            .current
            .lines
            .last()
            .is_some_and(|l| blocks[l.block_index].is_heading());

        if let Block::Spacer { height } = block {
            if cursor.at_page_top() && !cursor.pages.is_empty() {
                continue;
            }
            if cursor.top + height >= cursor.content_height {
                if follows_heading {
                    log::debug!("spacer {i} ({height:.1}pt) collapsed after a heading");
                    continue;
                }
                cursor.break_page();
            } else {
                cursor.top += height.max(0.0);
            }
            continue;
        }

        let Some(rows) = prepared[i].take() else {
            continue;
        };
        if rows.is_empty() {
            continue;
        }

        let gap = if cursor.current.lines.is_empty() {
            0.0
        } else {
            options.block_gap
        };
        let extent: f32 = rows.iter().map(|r| r.height).sum();
        let available = cursor.remaining() - gap;

        let move_to_next_page = if follows_heading || cursor.at_page_top() {
            false
        } else if block.is_heading() {
            let follow = reserve_after(i, extent, blocks, &prepared, options.block_gap, cursor.content_height);
            guard.needs_fresh_page(available, false) || available < extent + follow
        } else {
            available < extent
        };

        if move_to_next_page {
            log::debug!(
                "block {i} ({extent:.1}pt) does not fit in {available:.1}pt; starting page {}",
                cursor.pages.len() + 2,
            );
            cursor.break_page();
        } else {
            cursor.top += gap;
        }

        for row in rows {
            if cursor.top + row.height > cursor.content_height && !cursor.at_page_top() {
                cursor.break_page();
            }
            cursor.emit(i, row);
        }
    }

    let pages = cursor.finish();
    log::debug!("flow: {} blocks on {} pages", blocks.len(), pages.len());
    FlowDocument { pages }
}

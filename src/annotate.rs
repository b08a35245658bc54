//! Structural analysis of a rendered region.
//!
//! The annotator walks a [`ContentNode`] tree describing what was rendered
//! into a surface and derives, before any cut is chosen, where cutting is
//! structurally legal and which regions must stay on one page.

use crate::model::{BreakPoint, HeadingPosition, KeepTogetherRange, RangeOrigin};

/// Nodes at most this tall (layout units) with no visible text are treated as
/// separators when pairing a heading with its following block.
pub const NEAR_ZERO_HEIGHT: f32 = 2.0;

/// Layout-space box, top-left origin, y growing downward.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NodeKind {
    #[default]
    Block,
    Inline,
    Heading(u8),
    /// Rules, dividers and other purely visual gaps.
    Separator,
}

/// Author markers attached to a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Markers {
    pub keep_together: bool,
    pub break_before: bool,
    pub break_after: bool,
    /// Interactive controls and anything else that must not be printed.
    pub exclude: bool,
}

/// The narrow view of a host content tree the annotator depends on.
pub trait ContentNode {
    fn bounds(&self) -> Bounds;
    fn kind(&self) -> NodeKind;
    fn markers(&self) -> Markers {
        Markers::default()
    }
    fn children(&self) -> &[Self]
    where
        Self: Sized;
    /// The node's own text, excluding descendants.
    fn text(&self) -> &str;
}

/// Owned content tree, the adapter used when the host hands over a plain
/// description of its layout (e.g. JSON exported next to a screenshot).
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ContentElement {
    pub bounds: Bounds,
    pub kind: NodeKind,
    pub markers: Markers,
    pub text: String,
    pub children: Vec<ContentElement>,
}

impl ContentElement {
    pub fn new(kind: NodeKind, bounds: Bounds) -> Self {
        Self {
            bounds,
            kind,
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_markers(mut self, markers: Markers) -> Self {
        self.markers = markers;
        self
    }

    pub fn with_children(mut self, children: Vec<ContentElement>) -> Self {
        self.children = children;
        self
    }
}

impl ContentNode for ContentElement {
    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn kind(&self) -> NodeKind {
        self.kind
    }

    fn markers(&self) -> Markers {
        self.markers
    }

    fn children(&self) -> &[Self] {
        &self.children
    }

    fn text(&self) -> &str {
        &self.text
    }
}

/// Everything the selector needs, in surface pixels with the region top at 0.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Annotations {
    pub content_end: f32,
    pub keep_together: Vec<KeepTogetherRange>,
    pub headings: Vec<HeadingPosition>,
    /// Ascending, deduplicated, always starting at 0 and ending at `content_end`.
    pub break_points: Vec<BreakPoint>,
    /// Ascending coordinates where a new page must start.
    pub forced_breaks: Vec<BreakPoint>,
    /// Regions blanked out of the output, as (x, y, width, height) in pixels.
    pub excluded: Vec<Bounds>,
}

impl Annotations {
    /// Re-end the annotated region at `end`, e.g. when the rendered surface is
    /// shorter or taller than the layout tree claims.
    pub fn clamp_to(&mut self, end: f32) {
        let end = end.max(0.0);
        self.content_end = end;
        self.break_points.retain(|&b| b < end);
        self.break_points.push(end);
        if self.break_points.first() != Some(&0.0) {
            self.break_points.insert(0, 0.0);
        }
        self.forced_breaks.retain(|&b| b > 0.0 && b < end);
        self.headings.retain(|&h| h < end);
        for range in &mut self.keep_together {
            range.extent.end = range.extent.end.min(end);
            range.extent.start = range.extent.start.min(end);
        }
        self.keep_together.retain(|r| !r.extent.is_empty());
    }
}

struct Walk {
    origin_x: f32,
    origin_y: f32,
    scale: f32,
    content_end: f32,
    out: Annotations,
}

impl Walk {
    fn to_px(&self, y: f32) -> f32 {
        ((y - self.origin_y) * self.scale).clamp(0.0, self.content_end)
    }

    fn visit<N: ContentNode>(&mut self, siblings: &[N], idx: usize) {
        let node = &siblings[idx];
        let markers = node.markers();
        let bounds = node.bounds();

        if markers.exclude {
            self.out.excluded.push(Bounds::new(
                (bounds.x - self.origin_x) * self.scale,
                self.to_px(bounds.y),
                bounds.width * self.scale,
                bounds.height * self.scale,
            ));
            return;
        }

        let top = self.to_px(bounds.y);
        let bottom = self.to_px(bounds.bottom());
        let kind = node.kind();

        if markers.keep_together {
            self.out
                .keep_together
                .push(KeepTogetherRange::new(top, bottom, RangeOrigin::Marker));
        }
        if markers.break_before && top > 0.0 {
            self.out.forced_breaks.push(top);
        }
        if markers.break_after && bottom < self.content_end {
            self.out.forced_breaks.push(bottom);
        }

        if is_block_level(node) {
            self.out.break_points.push(top);
            self.out.break_points.push(bottom);
        }

        if let NodeKind::Heading(_) = kind {
            self.out.headings.push(top);
            let end = siblings[idx + 1..]
                .iter()
                .filter(|s| !s.markers().exclude)
                .find(|s| is_meaningful_block(*s))
                .map(|s| self.to_px(s.bounds().bottom()))
                .unwrap_or(self.content_end);
            log::debug!("heading at {top:.1}px kept with following content up to {end:.1}px");
            self.out
                .keep_together
                .push(KeepTogetherRange::new(top, end.max(bottom), RangeOrigin::HeadingWithNext));
        }

        let children = node.children();
        for i in 0..children.len() {
            self.visit(children, i);
        }
    }
}

fn is_block_level<N: ContentNode>(node: &N) -> bool {
    matches!(node.kind(), NodeKind::Block | NodeKind::Heading(_)) || node.markers().keep_together
}

/// A block that can follow a heading: not a separator, not collapsed, and
/// carrying visible text somewhere inside.
fn is_meaningful_block<N: ContentNode>(node: &N) -> bool {
    is_block_level(node)
        && node.kind() != NodeKind::Separator
        && node.bounds().height > NEAR_ZERO_HEIGHT
        && has_visible_text(node)
}

fn has_visible_text<N: ContentNode>(node: &N) -> bool {
    !node.text().trim().is_empty()
        || node
            .children()
            .iter()
            .any(|c| !c.markers().exclude && has_visible_text(c))
}

/// Derive keep-together ranges, heading positions, break points and forced
/// breaks from `root`. Layout units are multiplied by `scale` to land in
/// surface pixels.
pub fn annotate<N: ContentNode>(root: &N, scale: f32) -> Annotations {
    let bounds = root.bounds();
    let content_end = (bounds.height * scale).max(0.0);
    let mut walk = Walk {
        origin_x: bounds.x,
        origin_y: bounds.y,
        scale,
        content_end,
        out: Annotations {
            content_end,
            ..Default::default()
        },
    };

    let children = root.children();
    for i in 0..children.len() {
        walk.visit(children, i);
    }

    let mut out = walk.out;
    out.break_points.push(0.0);
    out.break_points.push(content_end);
    sort_dedup(&mut out.break_points);
    if let Some(first) = out.break_points.first_mut() {
        *first = 0.0;
    }
    if let Some(last) = out.break_points.last_mut() {
        *last = content_end;
    }
    sort_dedup(&mut out.forced_breaks);
    out.headings.sort_by(f32::total_cmp);
    out.keep_together.retain(|r| !r.extent.is_empty());

    log::debug!(
        "annotate: {} break points, {} keep-together ranges, {} headings, {} forced breaks over {:.0}px",
        out.break_points.len(),
        out.keep_together.len(),
        out.headings.len(),
        out.forced_breaks.len(),
        content_end,
    );
    out
}

fn sort_dedup(v: &mut Vec<f32>) {
    v.sort_by(f32::total_cmp);
    v.dedup_by(|a, b| (*a - *b).abs() < 0.5);
}

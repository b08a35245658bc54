//! Choosing where pages end along a continuous content axis.

pub mod orphan;

use crate::annotate::Annotations;
use crate::model::{BreakPoint, Extent, HeadingPosition, KeepTogetherRange, PageSlice};

pub use orphan::{MIN_ORPHAN_SPACE_MM, OrphanGuard};

/// Smallest page extent the paginator accepts; anything smaller is raised to it.
pub const MIN_PROGRESS: f32 = 1.0;

/// Inputs of one selection, borrowed from the annotations of a single render.
pub struct BreakContext<'a> {
    /// Ascending candidate seams.
    pub break_points: &'a [BreakPoint],
    pub keep_together: &'a [KeepTogetherRange],
    pub headings: &'a [HeadingPosition],
    pub content_end: f32,
    pub max_extent: f32,
    pub guard: OrphanGuard,
}

impl<'a> BreakContext<'a> {
    pub fn from_annotations(annotations: &'a Annotations, max_extent: f32, guard: OrphanGuard) -> Self {
        Self {
            break_points: &annotations.break_points,
            keep_together: &annotations.keep_together,
            headings: &annotations.headings,
            content_end: annotations.content_end,
            max_extent,
            guard,
        }
    }

    /// True when cutting at `y` would split a keep-together range.
    pub fn splits_keep_range(&self, y: f32) -> bool {
        self.keep_together.iter().any(|r| r.extent.strictly_inside(y))
    }
}

/// Pick the end of the page that starts at `y`.
///
/// Always returns `c` with `y < c <= y + max_extent`, never past
/// `content_end` while `y` is inside the content.
pub fn select_break(ctx: &BreakContext<'_>, y: f32) -> f32 {
    let max_extent = ctx.max_extent.max(MIN_PROGRESS);
    let reach = y + max_extent;
    let limit = if y < ctx.content_end {
        reach.min(ctx.content_end)
    } else {
        reach
    };

    let candidates: Vec<f32> = ctx
        .break_points
        .iter()
        .copied()
        .filter(|&b| b > y && b <= limit)
        .collect();
    if candidates.is_empty() {
        log::debug!("no seam in ({y:.1}, {limit:.1}]; forcing cut at {limit:.1}");
        return limit;
    }

    let legal: Vec<f32> = candidates
        .iter()
        .copied()
        .filter(|&c| !ctx.splits_keep_range(c))
        .collect();
    let pool = if legal.is_empty() {
        log::debug!("every seam in ({y:.1}, {limit:.1}] splits a keep-together range; ignoring ranges");
        &candidates
    } else {
        &legal
    };

    let best = pool.iter().copied().fold(f32::MIN, f32::max);
    ctx.guard.correct_cut(ctx, y, best)
}

/// Cut `[0, content_end)` into consecutive page slices of at most `max_extent`.
///
/// Forced breaks within reach of the current page start take precedence over
/// the selector.
pub fn paginate(annotations: &Annotations, max_extent: f32, guard: OrphanGuard) -> Vec<PageSlice> {
    let max_extent = if max_extent.is_finite() {
        max_extent.max(MIN_PROGRESS)
    } else {
        annotations.content_end.max(MIN_PROGRESS)
    };
    let ctx = BreakContext::from_annotations(annotations, max_extent, guard);

    let mut slices = Vec::new();
    let mut y = 0.0f32;
    while y < annotations.content_end {
        let forced = annotations
            .forced_breaks
            .iter()
            .copied()
            .find(|&f| f > y && f <= y + max_extent);
        let cut = match forced {
            Some(f) => f,
            None => select_break(&ctx, y),
        };
        slices.push(Extent::new(y, cut));
        y = cut;
    }

    log::debug!(
        "paginate: {} slices over {:.0} units (page extent {:.1})",
        slices.len(),
        annotations.content_end,
        max_extent,
    );
    slices
}

use crate::geometry::mm_to_pt;

use super::BreakContext;

/// Space a heading needs below it before the page ends.
pub const MIN_ORPHAN_SPACE_MM: f32 = 12.0;

/// Keeps headings from being printed at the very bottom of a page.
///
/// `min_space` is expressed in whatever unit the caller paginates in:
/// points for text flow, surface pixels for raster slicing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrphanGuard {
    pub min_space: f32,
}

impl Default for OrphanGuard {
    fn default() -> Self {
        Self::for_points()
    }
}

impl OrphanGuard {
    pub fn new(min_space: f32) -> Self {
        Self {
            min_space: min_space.max(0.0),
        }
    }

    pub fn for_points() -> Self {
        Self::new(mm_to_pt(MIN_ORPHAN_SPACE_MM))
    }

    pub fn for_pixels(px_per_pt: f32) -> Self {
        Self::new(mm_to_pt(MIN_ORPHAN_SPACE_MM) * px_per_pt)
    }

    /// True when a heading starting at `heading` sits too close to a page
    /// ending at `page_end`.
    pub fn strands_heading(&self, heading: f32, page_end: f32) -> bool {
        heading < page_end && page_end - heading < self.min_space
    }

    /// Text flow: a heading may only be emitted with `remaining` space left
    /// when it is the first thing on a fresh page or enough room follows it.
    pub fn needs_fresh_page(&self, remaining: f32, at_page_top: bool) -> bool {
        !at_page_top && remaining < self.min_space
    }

    /// Raster slicing: pull a cut at `cut` back to the latest legal seam at or
    /// before the first stranded heading on the page starting at `y`.
    ///
    /// The substituted seam is not checked for a new orphan on the next page.
    pub fn correct_cut(&self, ctx: &BreakContext<'_>, y: f32, cut: f32) -> f32 {
        if cut >= ctx.content_end {
            return cut;
        }
        let stranded = ctx
            .headings
            .iter()
            .copied()
            .filter(|&h| h > y && self.strands_heading(h, cut))
            .min_by(f32::total_cmp);
        let Some(heading) = stranded else {
            return cut;
        };

        let seam = ctx
            .break_points
            .iter()
            .copied()
            .filter(|&b| b > y && b <= heading && !ctx.splits_keep_range(b))
            .max_by(f32::total_cmp);
        match seam {
            Some(b) => {
                log::debug!(
                    "orphan heading at {heading:.1} near page end {cut:.1}; cutting at {b:.1} instead"
                );
                b
            }
            None => {
                log::debug!("orphan heading at {heading:.1} has no earlier legal seam; keeping {cut:.1}");
                cut
            }
        }
    }
}

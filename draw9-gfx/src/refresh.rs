//! Refresh-rectangle accumulation.
//!
//! Grounded on the teacher's `gfx::damage::DamageTracker`, which keeps an
//! array of disjoint regions and merges the smallest pair when it's full.
//! spec.md §1's Non-goals rule that out ("no incremental region repainting
//! beyond a merged bounding box"), so this is the degenerate single-region
//! case of that tracker: one running union, nothing more.

use draw9_proto::Rect;

/// Accumulates a single bounding rectangle across drawing opcodes, drained
/// by `flush` (spec.md §4.3).
#[derive(Clone, Copy, Debug, Default)]
pub struct RefreshTracker {
    bounds: Option<Rect>,
}

impl RefreshTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges `rect` into the running bounding box. Empty rectangles are
    /// ignored (spec.md §8, "Empty rectangles are no-ops and produce no
    /// refresh").
    pub fn add(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        self.bounds = Some(match self.bounds {
            Some(b) => b.union(&rect),
            None => rect,
        });
    }

    /// Returns and clears the accumulated rectangle. `None` if nothing was
    /// drawn since the last drain (spec.md §8, "two flushes without an
    /// intervening drawing opcode emit the empty rectangle the second
    /// time").
    pub fn take(&mut self) -> Option<Rect> {
        self.bounds.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_union_of_rects() {
        let mut t = RefreshTracker::new();
        t.add(Rect::from_xyxy(0, 0, 2, 2));
        t.add(Rect::from_xyxy(5, 5, 7, 7));
        assert_eq!(t.take(), Some(Rect::from_xyxy(0, 0, 7, 7)));
    }

    #[test]
    fn second_flush_without_drawing_is_empty() {
        let mut t = RefreshTracker::new();
        t.add(Rect::from_xyxy(0, 0, 2, 2));
        assert!(t.take().is_some());
        assert_eq!(t.take(), None);
    }

    #[test]
    fn empty_rect_is_ignored() {
        let mut t = RefreshTracker::new();
        t.add(Rect::from_xyxy(3, 3, 3, 5));
        assert_eq!(t.take(), None);
    }
}

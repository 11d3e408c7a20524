//! Pointer drags: header reorder, column resize and freeze divider.

use std::collections::BTreeSet;

use crate::hit_test::{column_at_screen_x, row_at_screen_y};
use crate::layout::{GridLayout, Viewport};
use crate::types::Rect;

/// Movement (px) before a header press turns into a reorder drag.
pub const DRAG_THRESHOLD: f32 = 5.0;

/// What a reorder drag moves. Indices are columns or display rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderTarget {
    Columns(Vec<u32>),
    Rows(Vec<u32>),
}

/// Pointer drag in progress.
#[derive(Debug, Clone, PartialEq)]
pub enum DragState {
    /// Pressed on a draggable header but not yet past the threshold.
    Pending {
        target: ReorderTarget,
        origin_x: f32,
        origin_y: f32,
    },
    /// Reordering; `drop` is an insertion index in pre-removal order, or
    /// `None` while the pointer is outside any valid drop position.
    Reorder {
        target: ReorderTarget,
        drop: Option<u32>,
    },
    Resize {
        col: u32,
        origin_x: f32,
        start_width: f32,
        width: f32,
    },
    Freeze { original: u32, count: u32 },
}

impl DragState {
    /// True once the press has turned into a visible drag.
    pub fn is_active(&self) -> bool {
        !matches!(self, DragState::Pending { .. })
    }

    /// Whether a move to (x, y) leaves the threshold of a pending press.
    pub fn passes_threshold(&self, x: f32, y: f32) -> bool {
        match self {
            DragState::Pending {
                origin_x, origin_y, ..
            } => (x - origin_x).hypot(y - origin_y) > DRAG_THRESHOLD,
            _ => false,
        }
    }
}

/// Move the items at `drag` to insertion index `drop`, keeping their
/// relative order.
///
/// `drop` counts positions in the original sequence (0..=len). Indices out
/// of range are ignored and duplicates count once.
pub fn reorder<T: Clone>(items: &[T], drag: &[u32], drop: u32) -> Vec<T> {
    let len = u32::try_from(items.len()).unwrap_or(u32::MAX);
    let dragged: BTreeSet<u32> = drag.iter().copied().filter(|&i| i < len).collect();
    let drop = drop.min(len);

    let mut moved = Vec::with_capacity(dragged.len());
    let mut rest = Vec::with_capacity(items.len());
    for (item, index) in items.iter().zip(0u32..) {
        if dragged.contains(&index) {
            moved.push(item.clone());
        } else {
            rest.push(item.clone());
        }
    }
    let before_drop = dragged.range(..drop).count();
    let at = usize::try_from(drop)
        .unwrap_or(usize::MAX)
        .saturating_sub(before_drop)
        .min(rest.len());
    rest.splice(at..at, moved);
    rest
}

/// True when moving `drag` to `drop` leaves the order unchanged.
pub fn is_noop_reorder(len: u32, drag: &[u32], drop: u32) -> bool {
    let identity: Vec<u32> = (0..len).collect();
    reorder(&identity, drag, drop) == identity
}

/// Insertion index for a column drop at (x, y): before the column under
/// the pointer, or after it past its midpoint. `None` once the pointer
/// leaves the column header band.
pub fn column_drop_index(layout: &GridLayout, viewport: &Viewport, x: f32, y: f32) -> Option<u32> {
    let band = Rect::new(0.0, 0.0, viewport.width, layout.header_height);
    if !band.contains(x, y) {
        return None;
    }
    if x < layout.row_header_width {
        return Some(0);
    }
    let drop = match column_at_screen_x(layout, viewport, x) {
        Some(col) => {
            let left = layout.column_screen_x(col, viewport.scroll_left);
            if x - left > layout.column_width(col) / 2.0 {
                col + 1
            } else {
                col
            }
        }
        None => layout.column_count(),
    };
    Some(drop)
}

/// Insertion index (display rows) for a row drop at (x, y). `None` once
/// the pointer leaves the rows between the header and statistics band.
pub fn row_drop_index(layout: &GridLayout, viewport: &Viewport, x: f32, y: f32) -> Option<u32> {
    let body = layout.body_rect(viewport);
    let band = Rect::new(0.0, body.y, viewport.width, body.height);
    if !band.contains(x, y) {
        return None;
    }
    let drop = match row_at_screen_y(layout, viewport, y) {
        Some(row) => {
            let top = layout.row_screen_y(row, viewport.scroll_top);
            if y - top > layout.row_height(row) / 2.0 {
                row + 1
            } else {
                row
            }
        }
        None => layout.row_count(),
    };
    Some(drop)
}

/// Screen x of the insertion line for column insertion index `drop`.
pub fn column_drop_x(layout: &GridLayout, viewport: &Viewport, drop: u32) -> f32 {
    match drop.checked_sub(1) {
        Some(prev) => layout.column_screen_x(prev, viewport.scroll_left) + layout.column_width(prev),
        None => layout.column_screen_x(0, viewport.scroll_left),
    }
}

/// Screen y of the insertion line for display-row insertion index `drop`.
pub fn row_drop_y(layout: &GridLayout, viewport: &Viewport, drop: u32) -> f32 {
    match drop.checked_sub(1) {
        Some(prev) => layout.row_screen_y(prev, viewport.scroll_top) + layout.row_height(prev),
        None => layout.row_screen_y(0, viewport.scroll_top),
    }
}

/// Frozen column count for a divider dragged to screen x: every leading
/// column whose midpoint lies left of the pointer.
pub fn freeze_count_at(layout: &GridLayout, viewport: &Viewport, x: f32) -> u32 {
    (0..layout.column_count())
        .find(|&col| {
            let mid = layout.column_screen_x(col, viewport.scroll_left) + layout.column_width(col) / 2.0;
            mid >= x
        })
        .unwrap_or_else(|| layout.column_count())
}

/// Screen x of the divider for a prospective frozen count.
pub fn freeze_guide_x(layout: &GridLayout, viewport: &Viewport, count: u32) -> f32 {
    match count.checked_sub(1) {
        Some(last) => layout.column_screen_x(last, viewport.scroll_left) + layout.column_width(last),
        None => layout.row_header_width,
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::layout::LinearRows;
    use crate::types::{ColumnDescriptor, GridConfig};
    use test_case::test_case;

    fn layout() -> GridLayout {
        let columns: Vec<_> = (0..5)
            .map(|i| ColumnDescriptor::new(format!("c{i}"), format!("C{i}"), 100.0))
            .collect();
        GridLayout::new(&columns, LinearRows::ungrouped(20), &GridConfig::default())
    }

    #[test]
    fn non_adjacent_block_keeps_relative_order() {
        let items = ["a", "b", "c", "d", "e"];
        assert_eq!(reorder(&items, &[0, 2], 4), vec!["b", "d", "a", "c", "e"]);
        assert_eq!(reorder(&items, &[2, 0], 4), vec!["b", "d", "a", "c", "e"]);
    }

    #[test_case(&[1], 0, &["b", "a", "c"] ; "to front")]
    #[test_case(&[0], 3, &["b", "c", "a"] ; "to end")]
    #[test_case(&[0, 1], 3, &["c", "a", "b"] ; "block to end")]
    #[test_case(&[2, 9], 0, &["c", "a", "b"] ; "out of range ignored")]
    fn reorder_cases(drag: &[u32], drop: u32, expected: &[&str]) {
        assert_eq!(reorder(&["a", "b", "c"], drag, drop), expected);
    }

    #[test]
    fn dropping_inside_block_is_noop() {
        assert!(is_noop_reorder(5, &[1, 2], 2));
        assert!(is_noop_reorder(5, &[1, 2], 3));
        assert!(is_noop_reorder(5, &[1], 1));
        assert!(!is_noop_reorder(5, &[1, 2], 4));
    }

    #[test]
    fn column_drop_uses_midpoint() {
        let layout = layout();
        let viewport = Viewport::new(800.0, 400.0);
        assert_eq!(column_drop_index(&layout, &viewport, 20.0, 20.0), Some(0));
        assert_eq!(column_drop_index(&layout, &viewport, 120.0, 20.0), Some(1));
        assert_eq!(column_drop_index(&layout, &viewport, 160.0, 20.0), Some(2));
        assert_eq!(column_drop_index(&layout, &viewport, 700.0, 20.0), Some(5));
        assert_eq!(column_drop_x(&layout, &viewport, 2), 200.0);
    }

    #[test]
    fn row_drop_uses_midpoint() {
        let layout = layout();
        let viewport = Viewport::new(800.0, 400.0);
        // Row 1 spans y 72..104 on screen.
        assert_eq!(row_drop_index(&layout, &viewport, 20.0, 80.0), Some(1));
        assert_eq!(row_drop_index(&layout, &viewport, 20.0, 100.0), Some(2));
        assert_eq!(row_drop_y(&layout, &viewport, 2), 104.0);
    }

    #[test_case(120.0, 60.0 ; "below header")]
    #[test_case(120.0, -1.0 ; "above header")]
    #[test_case(900.0, 20.0 ; "right of viewport")]
    #[test_case(2000.0, 5000.0 ; "far away")]
    fn column_drop_outside_header_band_is_none(x: f32, y: f32) {
        let layout = layout();
        let viewport = Viewport::new(800.0, 400.0);
        assert_eq!(column_drop_index(&layout, &viewport, x, y), None);
    }

    #[test_case(20.0, 20.0 ; "in column header")]
    #[test_case(20.0, 400.0 ; "below viewport")]
    #[test_case(-5.0, 80.0 ; "left of viewport")]
    fn row_drop_outside_body_is_none(x: f32, y: f32) {
        let layout = layout();
        let viewport = Viewport::new(800.0, 400.0);
        assert_eq!(row_drop_index(&layout, &viewport, x, y), None);
    }

    #[test]
    fn freeze_count_follows_pointer() {
        let layout = layout();
        let viewport = Viewport::new(800.0, 400.0);
        assert_eq!(freeze_count_at(&layout, &viewport, 10.0), 0);
        assert_eq!(freeze_count_at(&layout, &viewport, 160.0), 2);
        assert_eq!(freeze_guide_x(&layout, &viewport, 2), 200.0);
    }

    #[test]
    fn threshold_applies_only_to_pending() {
        let pending = DragState::Pending {
            target: ReorderTarget::Columns(vec![0]),
            origin_x: 10.0,
            origin_y: 10.0,
        };
        assert!(!pending.passes_threshold(13.0, 13.0));
        assert!(pending.passes_threshold(16.0, 10.0));
        assert!(!pending.is_active());
    }
}

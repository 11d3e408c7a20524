//! Viewport state management for scrolling.

use super::GridLayout;
use crate::types::{CellAddress, IndexRange};

/// Viewport state - the visible window onto the grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Horizontal scroll offset in content pixels
    pub scroll_left: f32,
    /// Vertical scroll offset in content pixels
    pub scroll_top: f32,
    /// Viewport width in CSS pixels
    pub width: f32,
    /// Viewport height in CSS pixels
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            scroll_left: 0.0,
            scroll_top: 0.0,
            width,
            height,
        }
    }

    /// Largest valid `(scroll_left, scroll_top)` for this layout.
    pub fn max_scroll(&self, layout: &GridLayout) -> (f32, f32) {
        (
            (layout.content_width() - self.width).max(0.0),
            (layout.content_height() - self.height).max(0.0),
        )
    }

    /// Clamp scroll position to `[0, content - viewport]`.
    pub fn clamp_scroll(&mut self, layout: &GridLayout) {
        let (max_x, max_y) = self.max_scroll(layout);
        self.scroll_left = finite_or_zero(self.scroll_left).clamp(0.0, max_x);
        self.scroll_top = finite_or_zero(self.scroll_top).clamp(0.0, max_y);
    }

    /// Scroll by delta amounts; returns true if the position moved.
    pub fn scroll_by(&mut self, delta_x: f32, delta_y: f32, layout: &GridLayout) -> bool {
        self.set_scroll(
            self.scroll_left + delta_x,
            self.scroll_top + delta_y,
            layout,
        )
    }

    /// Set absolute scroll position; returns true if the position moved.
    pub fn set_scroll(&mut self, x: f32, y: f32, layout: &GridLayout) -> bool {
        let before = (self.scroll_left, self.scroll_top);
        self.scroll_left = x;
        self.scroll_top = y;
        self.clamp_scroll(layout);
        moved(before, (self.scroll_left, self.scroll_top))
    }

    /// Resize the viewport and re-clamp scroll.
    pub fn resize(&mut self, width: f32, height: f32, layout: &GridLayout) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.clamp_scroll(layout);
    }

    /// Display rows intersecting the body area, widened by `overscan`.
    pub fn visible_rows(&self, layout: &GridLayout, overscan: u32) -> Option<IndexRange> {
        let last = layout.row_count().checked_sub(1)?;
        let body_height = layout.body_rect(self).height;
        let start = layout.row_at_y(self.scroll_top).unwrap_or(last);
        let end = layout
            .row_at_y(self.scroll_top + body_height)
            .unwrap_or(last);
        Some(IndexRange::new(
            start.saturating_sub(overscan),
            end.saturating_add(overscan).min(last),
        ))
    }

    /// Scrollable (non-frozen) columns intersecting the viewport, widened by `overscan`.
    pub fn visible_cols(&self, layout: &GridLayout, overscan: u32) -> Option<IndexRange> {
        let last = layout.column_count().checked_sub(1)?;
        if layout.frozen_cols > last {
            return None;
        }
        let start_x = self.scroll_left + layout.frozen_width();
        let end_x = self.scroll_left + self.width - layout.row_header_width;
        let start = layout
            .column_at_x(start_x)
            .unwrap_or(last)
            .max(layout.frozen_cols);
        let end = layout.column_at_x(end_x).unwrap_or(last);
        Some(IndexRange::new(
            start.saturating_sub(overscan).max(layout.frozen_cols),
            end.saturating_add(overscan).min(last),
        ))
    }

    /// Adjust scroll so the cell is fully visible, moving as little as possible.
    ///
    /// Frozen columns never scroll horizontally. Returns false (and leaves
    /// scroll untouched) for out-of-range addresses.
    pub fn scroll_to_item(&mut self, address: CellAddress, layout: &GridLayout) -> bool {
        if address.col >= layout.column_count() || address.row >= layout.row_count() {
            return false;
        }
        let mut x = self.scroll_left;
        if !layout.is_frozen(address.col) {
            let offset = layout.column_offset(address.col);
            let width = layout.column_width(address.col);
            let left_limit = offset - layout.frozen_width();
            let right_limit = layout.row_header_width + offset + width - self.width;
            if x > left_limit {
                x = left_limit;
            } else if x < right_limit {
                x = right_limit.min(left_limit);
            }
        }

        let mut y = self.scroll_top;
        let offset = layout.row_offset(address.row);
        let height = layout.row_height(address.row);
        let bottom_limit =
            layout.header_height + offset + height + layout.statistics_height - self.height;
        if y > offset {
            y = offset;
        } else if y < bottom_limit {
            y = bottom_limit.min(offset);
        }

        self.set_scroll(x, y, layout);
        true
    }
}

fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

fn moved(a: (f32, f32), b: (f32, f32)) -> bool {
    (a.0 - b.0).abs() > f32::EPSILON || (a.1 - b.1).abs() > f32::EPSILON
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

    fn layout(cols: usize, rows: u32) -> GridLayout {
        let columns: Vec<_> = (0..cols)
            .map(|i| ColumnDescriptor::new(format!("c{i}"), format!("C{i}"), 100.0))
            .collect();
        GridLayout::new(&columns, LinearRows::ungrouped(rows), &GridConfig::default())
    }

    #[test]
    fn test_clamp_scroll() {
        let l = layout(10, 100);
        let mut vp = Viewport::new(400.0, 300.0);
        vp.set_scroll(-20.0, 1e9, &l);
        assert_eq!(vp.scroll_left, 0.0);
        // header 40 + 100 rows * 32 - 300
        assert_eq!(vp.scroll_top, 40.0 + 3200.0 - 300.0);
        assert!(!vp.set_scroll(0.0, vp.scroll_top, &l));
    }

    #[test]
    fn test_content_smaller_than_viewport_pins_to_origin() {
        let l = layout(2, 2);
        let mut vp = Viewport::new(800.0, 600.0);
        vp.set_scroll(50.0, 50.0, &l);
        assert_eq!((vp.scroll_left, vp.scroll_top), (0.0, 0.0));
    }

    #[test]
    fn test_visible_rows_with_overscan() {
        let l = layout(3, 1000);
        let mut vp = Viewport::new(300.0, 40.0 + 320.0);
        vp.set_scroll(0.0, 32.0 * 100.0, &l);
        let rows = vp.visible_rows(&l, 0).unwrap();
        assert_eq!(rows.start, 100);
        assert_eq!(rows.end, 110);
        let rows = vp.visible_rows(&l, 2).unwrap();
        assert_eq!((rows.start, rows.end), (98, 112));
    }

    #[test]
    fn test_visible_rows_empty_grid() {
        let l = layout(3, 0);
        let vp = Viewport::new(300.0, 300.0);
        assert_eq!(vp.visible_rows(&l, 1), None);
    }

    #[test]
    fn test_scroll_to_item_minimal_move() {
        let l = layout(20, 500);
        let mut vp = Viewport::new(400.0, 340.0);
        assert!(vp.scroll_to_item(CellAddress::new(5, 20), &l));
        // Right edge of column 5 lands on the viewport's right edge.
        assert_eq!(vp.scroll_left, 600.0 - 400.0);
        // Bottom of row 20 lands on the viewport's bottom edge.
        assert_eq!(vp.scroll_top, 40.0 + 21.0 * 32.0 - 340.0);
        assert!(!vp.scroll_to_item(CellAddress::new(99, 0), &l));
    }
}

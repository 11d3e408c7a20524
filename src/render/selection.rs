//! Selection overlay helpers.
//!
//! Pure geometry, so it is tested natively without a canvas.

use crate::layout::{GridLayout, Viewport};
use crate::types::{CellRange, IndexRange, Rect, SelectionRegion};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRect {
    pub rect: Rect,
    pub draw_top: bool,
    pub draw_bottom: bool,
    pub draw_left: bool,
    pub draw_right: bool,
}

/// Cell blocks covered by a region; rows and columns span the full other axis.
pub fn region_cell_ranges(region: &SelectionRegion, layout: &GridLayout) -> Vec<CellRange> {
    let (Some(last_col), Some(last_row)) = (
        layout.column_count().checked_sub(1),
        layout.row_count().checked_sub(1),
    ) else {
        return Vec::new();
    };
    match region {
        SelectionRegion::None => Vec::new(),
        SelectionRegion::Cells(ranges) => ranges.clone(),
        SelectionRegion::Rows(ranges) => ranges
            .iter()
            .map(|rows| CellRange {
                cols: IndexRange::new(0, last_col),
                rows: *rows,
            })
            .collect(),
        SelectionRegion::Columns(ranges) => ranges
            .iter()
            .map(|cols| CellRange {
                cols: *cols,
                rows: IndexRange::new(0, last_row),
            })
            .collect(),
    }
}

/// Screen rectangles for one cell block, split at the frozen boundary and
/// clipped to the band each part is drawn in.
pub fn selection_rects(
    range: &CellRange,
    layout: &GridLayout,
    viewport: &Viewport,
) -> Vec<SelectionRect> {
    let min_col = range.cols.start;
    let max_col = range.cols.end.min(layout.column_count().saturating_sub(1));
    let min_row = range.rows.start;
    let max_row = range.rows.end.min(layout.row_count().saturating_sub(1));
    if layout.column_count() == 0 || layout.row_count() == 0 || min_col > max_col || min_row > max_row {
        return Vec::new();
    }
    let frozen_cols = layout.frozen_cols;

    let frozen_col_range = if frozen_cols > 0 {
        let end = max_col.min(frozen_cols.saturating_sub(1));
        (min_col <= end).then_some((min_col, end))
    } else {
        None
    };
    let scroll_col_range = if max_col >= frozen_cols {
        let start = min_col.max(frozen_cols);
        (start <= max_col).then_some((start, max_col))
    } else {
        None
    };

    let body = layout.body_rect(viewport);
    let divider = layout.frozen_divider_x();
    let y1 = layout.row_screen_y(min_row, viewport.scroll_top);
    let y2 = layout.row_screen_y(max_row + 1, viewport.scroll_top);

    let mut rects = Vec::new();
    let mut push_rect = |(col_start, col_end): (u32, u32), frozen: bool| {
        let x1 = layout.column_screen_x(col_start, viewport.scroll_left);
        let x2 = layout.column_screen_x(col_end, viewport.scroll_left) + layout.column_width(col_end);
        let band = if frozen {
            Rect::new(body.x, body.y, divider - body.x, body.height)
        } else {
            Rect::new(divider, body.y, (body.right() - divider).max(0.0), body.height)
        };
        let Some(rect) = Rect::new(x1, y1, x2 - x1, y2 - y1).intersection(&band) else {
            return;
        };
        rects.push(SelectionRect {
            rect,
            draw_top: true,
            draw_bottom: true,
            draw_left: col_start == min_col,
            draw_right: col_end == max_col,
        });
    };

    if let Some(cols) = frozen_col_range {
        push_rect(cols, true);
    }
    if let Some(cols) = scroll_col_range {
        push_rect(cols, false);
    }
    rects
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
    use crate::types::{CellAddress, ColumnDescriptor, GridConfig};

    fn layout_with_frozen(frozen: u32) -> GridLayout {
        let columns: Vec<_> = (0..6)
            .map(|i| ColumnDescriptor::new(format!("c{i}"), format!("C{i}"), 100.0))
            .collect();
        let config = GridConfig {
            frozen_column_count: frozen,
            ..GridConfig::default()
        };
        GridLayout::new(&columns, LinearRows::ungrouped(20), &config)
    }

    #[test]
    fn selection_rects_split_frozen_cols() {
        let layout = layout_with_frozen(1);
        let mut viewport = Viewport::new(400.0, 400.0);
        viewport.scroll_left = 50.0;
        let range = CellRange::new(CellAddress::new(0, 0), CellAddress::new(2, 1));
        let rects = selection_rects(&range, &layout, &viewport);
        assert_eq!(rects.len(), 2);

        let frozen = rects.iter().find(|r| r.draw_left).unwrap();
        let scroll = rects.iter().find(|r| r.draw_right).unwrap();
        assert_eq!(frozen.rect.x, 0.0);
        assert_eq!(frozen.rect.width, 100.0);
        // Column 1 is half under the frozen band.
        assert_eq!(scroll.rect.x, 100.0);
        assert_eq!(scroll.rect.width, 150.0);
        assert_eq!(scroll.rect.y, 40.0);
        assert_eq!(scroll.rect.height, 64.0);
    }

    #[test]
    fn fully_scrolled_away_part_is_dropped() {
        let layout = layout_with_frozen(1);
        let mut viewport = Viewport::new(400.0, 400.0);
        viewport.scroll_left = 200.0;
        let range = CellRange::new(CellAddress::new(1, 0), CellAddress::new(1, 0));
        assert!(selection_rects(&range, &layout, &viewport).is_empty());
    }

    #[test]
    fn row_region_spans_all_columns() {
        let layout = layout_with_frozen(0);
        let region = SelectionRegion::Rows(vec![IndexRange::new(2, 3)]);
        let ranges = region_cell_ranges(&region, &layout);
        assert_eq!(ranges[0].cols, IndexRange::new(0, 5));
    }
}

//! Resolve a pointer position to the interactive zone under it.
//!
//! Zones are checked in priority order: column resize handle, drag handle,
//! freeze handle, header menu icon, then plain headers/cells/bands. Only
//! one zone is reported per point.

use serde::Serialize;

use crate::layout::{GridLayout, LinearRow, Viewport};
use crate::types::{CellAddress, ColumnDescriptor};

/// Width of the resize zone centered on a column's right edge.
pub const RESIZE_HANDLE_SIZE: f32 = 8.0;
/// Width of the freeze zone centered on the frozen divider.
pub const FREEZE_HANDLE_SIZE: f32 = 6.0;
/// Height of the drag strip along the top of a column header.
pub const COLUMN_DRAG_HANDLE_HEIGHT: f32 = 6.0;
/// Width of the drag strip at the left of the row header band.
pub const ROW_DRAG_HANDLE_WIDTH: f32 = 20.0;
/// Size of the menu icon box in a column header.
pub const MENU_ICON_SIZE: f32 = 16.0;
/// Gap between the menu icon and the column's right edge.
pub const MENU_ICON_PADDING: f32 = 8.0;

/// Target of a hit test. Row indices are display rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "index", rename_all = "camelCase")]
pub enum HitTarget {
    ColumnResizeHandle(u32),
    RowDragHandle(u32),
    ColumnDragHandle(u32),
    FreezeHandle,
    ColumnHeaderMenu(u32),
    ColumnHeader(u32),
    RowHeader(u32),
    /// The top-left corner (select all)
    CornerHeader,
    Cell(CellAddress),
    GroupHeader(u32),
    AppendRow,
    AppendColumn,
    StatisticCell(u32),
    /// Outside any interactive region
    None,
}

impl HitTarget {
    /// CSS cursor shown while hovering this target.
    pub fn cursor(&self) -> &'static str {
        match self {
            HitTarget::ColumnResizeHandle(_) | HitTarget::FreezeHandle => "col-resize",
            HitTarget::RowDragHandle(_) | HitTarget::ColumnDragHandle(_) => "grab",
            HitTarget::ColumnHeaderMenu(_)
            | HitTarget::GroupHeader(_)
            | HitTarget::AppendRow
            | HitTarget::AppendColumn
            | HitTarget::CornerHeader => "pointer",
            _ => "default",
        }
    }
}

/// Column under screen x, honoring the frozen band.
pub fn column_at_screen_x(layout: &GridLayout, viewport: &Viewport, x: f32) -> Option<u32> {
    let content_x = x - layout.row_header_width;
    if content_x < 0.0 {
        return None;
    }
    if content_x < layout.frozen_width() {
        return layout.column_at_x(content_x);
    }
    layout
        .column_at_x(content_x + viewport.scroll_left)
        .filter(|&c| !layout.is_frozen(c))
}

/// Display row under screen y in the body band.
pub fn row_at_screen_y(layout: &GridLayout, viewport: &Viewport, y: f32) -> Option<u32> {
    let body = layout.body_rect(viewport);
    if y < body.y || y >= body.bottom() {
        return None;
    }
    layout.row_at_y(y - layout.header_height + viewport.scroll_top)
}

fn column_right_edge(layout: &GridLayout, viewport: &Viewport, col: u32) -> f32 {
    layout.column_screen_x(col, viewport.scroll_left) + layout.column_width(col)
}

fn resize_handle_at(layout: &GridLayout, viewport: &Viewport, x: f32) -> Option<u32> {
    let half = RESIZE_HANDLE_SIZE / 2.0;
    [x - half, x]
        .into_iter()
        .filter_map(|sample| column_at_screen_x(layout, viewport, sample))
        .find(|&col| (x - column_right_edge(layout, viewport, col)).abs() <= half)
}

fn menu_icon_contains(layout: &GridLayout, viewport: &Viewport, col: u32, x: f32, y: f32) -> bool {
    let right = column_right_edge(layout, viewport, col) - MENU_ICON_PADDING;
    let top = (layout.header_height - MENU_ICON_SIZE) / 2.0;
    x >= right - MENU_ICON_SIZE && x < right && y >= top && y < top + MENU_ICON_SIZE
}

/// Content-x span of the append-column button, in screen coordinates.
fn append_column_contains(layout: &GridLayout, viewport: &Viewport, x: f32) -> bool {
    if layout.append_column_width <= 0.0 {
        return false;
    }
    let left = match layout.column_count().checked_sub(1) {
        Some(last) => column_right_edge(layout, viewport, last),
        None => layout.row_header_width,
    };
    x >= left && x < left + layout.append_column_width
}

/// Resolve screen point `(x, y)` to a [`HitTarget`].
pub fn hit_test(
    layout: &GridLayout,
    viewport: &Viewport,
    columns: &[ColumnDescriptor],
    x: f32,
    y: f32,
) -> HitTarget {
    if x < 0.0 || y < 0.0 || x >= viewport.width || y >= viewport.height {
        return HitTarget::None;
    }
    let header_width = layout.row_header_width;
    let header_height = layout.header_height;
    let body = layout.body_rect(viewport);

    // Column header band
    if y < header_height {
        if x < header_width {
            return HitTarget::CornerHeader;
        }
        if let Some(col) = resize_handle_at(layout, viewport, x) {
            return HitTarget::ColumnResizeHandle(col);
        }
        let Some(col) = column_at_screen_x(layout, viewport, x) else {
            if append_column_contains(layout, viewport, x) {
                return HitTarget::AppendColumn;
            }
            return HitTarget::None;
        };
        if y < COLUMN_DRAG_HANDLE_HEIGHT {
            return HitTarget::ColumnDragHandle(col);
        }
        let has_menu = columns.get(col as usize).is_some_and(|c| c.has_menu);
        if has_menu && menu_icon_contains(layout, viewport, col, x, y) {
            return HitTarget::ColumnHeaderMenu(col);
        }
        return HitTarget::ColumnHeader(col);
    }

    // Statistics band
    if y >= body.bottom() {
        if layout.statistics_height <= 0.0 {
            return HitTarget::None;
        }
        return column_at_screen_x(layout, viewport, x)
            .map_or(HitTarget::None, HitTarget::StatisticCell);
    }

    let row = row_at_screen_y(layout, viewport, y);
    let group_row = row.filter(|&r| matches!(layout.rows.get(r), Some(LinearRow::Group(_))));

    // Row header band
    if x < header_width {
        let Some(row) = row else {
            return if is_append_row(layout, viewport, y) {
                HitTarget::AppendRow
            } else {
                HitTarget::None
            };
        };
        if let Some(group) = group_row {
            return HitTarget::GroupHeader(group);
        }
        if x < ROW_DRAG_HANDLE_WIDTH.min(header_width) {
            return HitTarget::RowDragHandle(row);
        }
        return HitTarget::RowHeader(row);
    }

    if layout.column_count() > 0 && (x - layout.frozen_divider_x()).abs() <= FREEZE_HANDLE_SIZE / 2.0
    {
        return HitTarget::FreezeHandle;
    }

    if let Some(group) = group_row {
        return HitTarget::GroupHeader(group);
    }

    let Some(row) = row else {
        return if is_append_row(layout, viewport, y) {
            HitTarget::AppendRow
        } else {
            HitTarget::None
        };
    };
    match column_at_screen_x(layout, viewport, x) {
        Some(col) => HitTarget::Cell(CellAddress::new(col, row)),
        None => HitTarget::None,
    }
}

fn is_append_row(layout: &GridLayout, viewport: &Viewport, y: f32) -> bool {
    if layout.append_row_height <= 0.0 {
        return false;
    }
    let top = layout.row_screen_y(layout.row_count(), viewport.scroll_top);
    y >= top && y < top + layout.append_row_height
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
    use crate::types::GridConfig;
    use test_case::test_case;

    fn grid() -> (GridLayout, Viewport, Vec<ColumnDescriptor>) {
        let columns = vec![
            ColumnDescriptor::new("a", "A", 100.0).with_menu(),
            ColumnDescriptor::new("b", "B", 100.0),
            ColumnDescriptor::new("c", "C", 100.0),
        ];
        let config = GridConfig {
            row_header_width: 60.0,
            frozen_column_count: 1,
            show_append_row: true,
            show_append_column: true,
            ..GridConfig::default()
        };
        let layout = GridLayout::new(&columns, LinearRows::ungrouped(5), &config);
        (layout, Viewport::new(600.0, 400.0), columns)
    }

    #[test_case(10.0, 10.0 => HitTarget::CornerHeader; "corner")]
    #[test_case(161.0, 20.0 => HitTarget::ColumnResizeHandle(0); "resize wins near boundary")]
    #[test_case(200.0, 2.0 => HitTarget::ColumnDragHandle(1); "drag strip")]
    #[test_case(140.0, 20.0 => HitTarget::ColumnHeaderMenu(0); "menu icon")]
    #[test_case(140.0, 20.0 + 30.0 => HitTarget::Cell(CellAddress::new(0, 0)); "cell under menu column")]
    #[test_case(200.0, 20.0 => HitTarget::ColumnHeader(1); "plain header")]
    #[test_case(10.0, 50.0 => HitTarget::RowDragHandle(0); "row drag handle")]
    #[test_case(40.0, 80.0 => HitTarget::RowHeader(1); "row header")]
    #[test_case(161.0, 100.0 => HitTarget::FreezeHandle; "freeze divider")]
    #[test_case(250.0, 100.0 => HitTarget::Cell(CellAddress::new(1, 1)); "body cell")]
    #[test_case(370.0, 20.0 => HitTarget::AppendColumn; "append column")]
    #[test_case(250.0, 40.0 + 5.0 * 32.0 + 4.0 => HitTarget::AppendRow; "append row")]
    #[test_case(250.0, 399.0 => HitTarget::None; "empty space below")]
    #[test_case(-1.0, 10.0 => HitTarget::None; "outside")]
    fn test_hit_priority(x: f32, y: f32) -> HitTarget {
        let (layout, viewport, columns) = grid();
        hit_test(&layout, &viewport, &columns, x, y)
    }

    #[test]
    fn test_scrolled_column_hidden_under_frozen_band() {
        let (layout, mut viewport, columns) = grid();
        viewport.width = 300.0;
        viewport.set_scroll(80.0, 0.0, &layout);
        // Column 1 starts at screen 160 - 80 = 80, under the frozen column.
        assert_eq!(
            hit_test(&layout, &viewport, &columns, 120.0, 100.0),
            HitTarget::Cell(CellAddress::new(0, 1))
        );
        assert_eq!(
            hit_test(&layout, &viewport, &columns, 170.0, 100.0),
            HitTarget::Cell(CellAddress::new(1, 1))
        );
    }

    #[test]
    fn test_group_header_rows() {
        use crate::types::GroupPoint;
        use std::collections::BTreeSet;
        let (mut layout, viewport, columns) = grid();
        layout.set_rows(LinearRows::grouped(
            &[GroupPoint::group("g", 0, "G"), GroupPoint::rows(3)],
            &BTreeSet::new(),
        ));
        assert_eq!(
            hit_test(&layout, &viewport, &columns, 250.0, 50.0),
            HitTarget::GroupHeader(0)
        );
        assert_eq!(
            hit_test(&layout, &viewport, &columns, 10.0, 50.0),
            HitTarget::GroupHeader(0)
        );
    }
}

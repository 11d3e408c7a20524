//! Frame builder: grid state in, display list out.
//!
//! Only the visible rows and columns (plus overscan) are visited, so the
//! cost of a frame is proportional to what is on screen. Draw order is:
//! cell bodies and grid lines (scrollable band, then frozen band), group
//! and append rows, frozen divider, active cell, selection, collaborators,
//! search hits, then the pinned header and statistics bands on top.

use crate::host::GridHost;
use crate::layout::{GridLayout, LinearRow, Viewport};
use crate::render::backend::{DrawCommand, Frame};
use crate::render::cells::{draw_cell, CellPaint};
use crate::render::{headers, overlays, Decorations};
use crate::types::{CellAddress, ColumnDescriptor, GridConfig, IndexRange, Rect, SelectionRegion};

/// Transient feedback drawn while a pointer gesture is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragFeedback {
    #[default]
    None,
    /// Insertion line for a column drop, at screen x.
    ColumnDrop { x: f32 },
    /// Insertion line for a row drop, at screen y.
    RowDrop { y: f32 },
    /// Prospective right edge of a column being resized.
    ResizeGuide { x: f32 },
    /// Prospective frozen divider.
    FreezeGuide { x: f32 },
}

/// Everything a frame is built from. Row indices are display rows.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    pub layout: &'a GridLayout,
    pub viewport: &'a Viewport,
    pub columns: &'a [ColumnDescriptor],
    pub config: &'a GridConfig,
    pub selection: &'a SelectionRegion,
    pub active_cell: Option<CellAddress>,
    pub decorations: &'a Decorations,
    pub drag: DragFeedback,
}

impl FrameInput<'_> {
    pub(crate) fn font(&self) -> String {
        format!(
            "{}px {}",
            self.config.theme.font_size, self.config.theme.font_family
        )
    }

    pub(crate) fn header_font(&self) -> String {
        format!(
            "600 {}px {}",
            self.config.theme.font_size, self.config.theme.font_family
        )
    }

    /// Band right of the frozen divider, between header and statistics.
    pub(crate) fn scroll_band(&self) -> Rect {
        let body = self.layout.body_rect(self.viewport);
        let divider = self.layout.frozen_divider_x();
        Rect::new(divider, body.y, (body.right() - divider).max(0.0), body.height)
    }

    /// Band holding the frozen columns.
    pub(crate) fn frozen_band(&self) -> Rect {
        let body = self.layout.body_rect(self.viewport);
        Rect::new(body.x, body.y, self.layout.frozen_width(), body.height)
    }

    /// Columns to draw in the frozen band.
    pub(crate) fn frozen_cols(&self) -> Option<IndexRange> {
        self.layout
            .frozen_cols
            .checked_sub(1)
            .map(|last| IndexRange::new(0, last))
    }
}

/// Build the display list for one frame.
pub fn build_frame(input: &FrameInput<'_>, host: &dyn GridHost) -> Frame {
    let layout = input.layout;
    let viewport = input.viewport;
    let theme = &input.config.theme;
    let mut frame = Frame::new(viewport.width, viewport.height);
    frame.visible_rows = viewport.visible_rows(layout, input.config.overscan);
    frame.visible_cols = viewport.visible_cols(layout, input.config.overscan);

    frame.push(DrawCommand::FillRect {
        rect: Rect::new(0.0, 0.0, viewport.width, viewport.height),
        color: theme.cell_background.clone(),
    });

    if let Some(rows) = frame.visible_rows {
        if let Some(cols) = frame.visible_cols {
            frame.clipped(input.scroll_band(), |f| draw_cells(f, input, host, rows, cols));
        }
        if let Some(cols) = input.frozen_cols() {
            frame.clipped(input.frozen_band(), |f| draw_cells(f, input, host, rows, cols));
        }
    }

    let body = layout.body_rect(viewport);
    frame.clipped(body, |f| {
        if let Some(rows) = f.visible_rows {
            headers::draw_group_rows(f, input, rows);
        }
        headers::draw_append_row(f, input);
    });

    overlays::draw_frozen_divider(&mut frame, input);
    frame.clipped(body, |f| {
        overlays::draw_active_cell(f, input);
        overlays::draw_selection(f, input);
        overlays::draw_collaborators(f, input);
        overlays::draw_search_hits(f, input);
    });

    headers::draw_column_headers(&mut frame, input);
    if let Some(rows) = frame.visible_rows {
        headers::draw_row_headers(&mut frame, input, rows);
    }
    headers::draw_statistics(&mut frame, input);
    overlays::draw_drag_feedback(&mut frame, input);

    tracing::trace!(
        rows = ?frame.visible_rows,
        cols = ?frame.visible_cols,
        cells = frame.cells_drawn,
        fallbacks = frame.fallback_cells,
        commands = frame.commands.len(),
        "frame built"
    );
    frame
}

fn draw_cells(
    frame: &mut Frame,
    input: &FrameInput<'_>,
    host: &dyn GridHost,
    rows: IndexRange,
    cols: IndexRange,
) {
    let layout = input.layout;
    let viewport = input.viewport;
    let theme = &input.config.theme;
    let font = input.font();

    for row in rows.iter() {
        let Some(LinearRow::Record(record)) = layout.rows.get(row) else {
            continue;
        };
        for col in cols.iter() {
            let Some(rect) = layout.cell_rect(CellAddress::new(col, row), viewport) else {
                continue;
            };
            let column_theme = input
                .columns
                .get(col as usize)
                .and_then(|c| c.custom_theme.as_ref());
            if let Some(bg) = column_theme.and_then(|t| t.cell_background.as_ref()) {
                frame.push(DrawCommand::FillRect {
                    rect,
                    color: bg.clone(),
                });
            }
            let text_color = column_theme
                .and_then(|t| t.cell_text_color.as_deref())
                .unwrap_or(&theme.cell_text_color);
            let content = host.cell_content(CellAddress::new(col, record));
            let paint = CellPaint {
                rect,
                theme,
                text_color,
                font: &font,
            };
            frame.cells_drawn += 1;
            if !draw_cell(&content, &paint, &mut frame.commands) {
                frame.fallback_cells += 1;
            }
        }
    }

    // Grid lines
    let first_x = layout.column_screen_x(cols.start, viewport.scroll_left);
    let last_x = layout.column_screen_x(cols.end, viewport.scroll_left) + layout.column_width(cols.end);
    for row in rows.iter() {
        let y = layout.row_screen_y(row, viewport.scroll_top) + layout.row_height(row);
        frame.push(DrawCommand::Line {
            x1: first_x,
            y1: y,
            x2: last_x,
            y2: y,
            color: theme.grid_line_color.clone(),
            line_width: 1.0,
        });
    }
    let top = layout.row_screen_y(rows.start, viewport.scroll_top);
    let bottom = layout.row_screen_y(rows.end, viewport.scroll_top) + layout.row_height(rows.end);
    for col in cols.iter() {
        let x = layout.column_screen_x(col, viewport.scroll_left) + layout.column_width(col);
        frame.push(DrawCommand::Line {
            x1: x,
            y1: top,
            x2: x,
            y2: bottom,
            color: theme.grid_line_color.clone(),
            line_width: 1.0,
        });
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
    use crate::types::CellContent;

    struct LabelHost;

    impl GridHost for LabelHost {
        fn cell_content(&self, address: CellAddress) -> CellContent {
            CellContent::text(format!("r{}c{}", address.row, address.col))
        }
    }

    #[test]
    fn only_visible_cells_are_requested() {
        let columns: Vec<_> = (0..50)
            .map(|i| ColumnDescriptor::new(format!("c{i}"), format!("C{i}"), 100.0))
            .collect();
        let config = GridConfig {
            overscan: 0,
            ..GridConfig::default()
        };
        let layout = GridLayout::new(&columns, LinearRows::ungrouped(100_000), &config);
        let viewport = Viewport::new(300.0, 40.0 + 32.0 * 5.0);
        let decorations = Decorations::default();
        let input = FrameInput {
            layout: &layout,
            viewport: &viewport,
            columns: &columns,
            config: &config,
            selection: &SelectionRegion::None,
            active_cell: None,
            decorations: &decorations,
            drag: DragFeedback::None,
        };
        let frame = build_frame(&input, &LabelHost);
        // Rows 0..=5 (the row starting on the bottom edge is included), columns 0..=3.
        assert_eq!(frame.visible_rows, Some(IndexRange::new(0, 5)));
        assert_eq!(frame.visible_cols, Some(IndexRange::new(0, 3)));
        assert_eq!(frame.cells_drawn, 6 * 4);
        assert!(frame.texts().any(|t| t == "r5c3"));
        assert!(!frame.texts().any(|t| t == "r6c0"));
    }
}

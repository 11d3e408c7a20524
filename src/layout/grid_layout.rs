//! Pre-computed geometry for the grid.
//!
//! Column and row edges are kept as prefix sums so offsets are O(1) and
//! point lookups are a binary search. Anything that changes a width, the
//! row count, or the group structure must go through a setter here so the
//! prefix sums never go stale.

use std::cmp::Ordering;
use std::collections::HashMap;

use super::{LinearRow, LinearRows, Viewport};
use crate::types::{CellAddress, ColumnDescriptor, GridConfig, Rect, DEFAULT_APPEND_COLUMN_WIDTH};

/// Narrowest width a column may be resized to.
pub const MIN_COLUMN_WIDTH: f32 = 40.0;

/// Pre-computed layout data for the grid
#[derive(Debug, Clone)]
pub struct GridLayout {
    /// Cumulative column positions (`col_positions[i]` = content x of column i's left edge)
    pub col_positions: Vec<f32>,
    pub col_widths: Vec<f32>,
    /// Cumulative display-row positions (`row_positions[i]` = content y of row i's top edge)
    pub row_positions: Vec<f32>,
    pub row_heights: Vec<f32>,
    pub rows: LinearRows,
    pub frozen_cols: u32,
    pub row_header_width: f32,
    pub header_height: f32,
    pub statistics_height: f32,
    /// Height of the trailing "+" row (0 when hidden)
    pub append_row_height: f32,
    /// Width of the trailing "+" column button (0 when hidden)
    pub append_column_width: f32,
    default_row_height: f32,
    group_header_height: f32,
    /// Record-row height overrides (e.g. wrapped text)
    row_overrides: HashMap<u32, f32>,
}

impl GridLayout {
    pub fn new(columns: &[ColumnDescriptor], rows: LinearRows, config: &GridConfig) -> Self {
        let mut layout = GridLayout {
            col_positions: Vec::new(),
            col_widths: Vec::new(),
            row_positions: Vec::new(),
            row_heights: Vec::new(),
            rows,
            frozen_cols: 0,
            row_header_width: 0.0,
            header_height: 0.0,
            statistics_height: 0.0,
            append_row_height: 0.0,
            append_column_width: 0.0,
            default_row_height: config.row_height,
            group_header_height: config.group_header_height,
            row_overrides: HashMap::new(),
        };
        layout.apply_config(config);
        layout.set_columns(columns);
        layout.rebuild_rows();
        layout
    }

    /// Re-read band sizes and frozen count; rebuilds row edges if heights changed.
    pub fn apply_config(&mut self, config: &GridConfig) {
        self.row_header_width = config.row_header_width.max(0.0);
        self.header_height = config.column_header_height.max(0.0);
        self.statistics_height = config.statistics_height.max(0.0);
        self.append_row_height = if config.show_append_row {
            config.row_height
        } else {
            0.0
        };
        self.append_column_width = if config.show_append_column {
            DEFAULT_APPEND_COLUMN_WIDTH
        } else {
            0.0
        };
        let heights_changed = (self.default_row_height - config.row_height).abs() > f32::EPSILON
            || (self.group_header_height - config.group_header_height).abs() > f32::EPSILON;
        self.default_row_height = config.row_height;
        self.group_header_height = config.group_header_height;
        self.set_frozen_cols(config.frozen_column_count);
        if heights_changed {
            self.rebuild_rows();
        }
    }

    pub fn set_columns(&mut self, columns: &[ColumnDescriptor]) {
        self.col_widths = columns.iter().map(|c| c.width.max(0.0)).collect();
        self.rebuild_columns();
        self.set_frozen_cols(self.frozen_cols);
    }

    pub fn set_rows(&mut self, rows: LinearRows) {
        self.rows = rows;
        self.rebuild_rows();
    }

    /// Replace per-record height overrides.
    pub fn set_row_overrides(&mut self, overrides: HashMap<u32, f32>) {
        self.row_overrides = overrides;
        self.rebuild_rows();
    }

    /// Frozen count is clamped to the column count.
    pub fn set_frozen_cols(&mut self, count: u32) {
        self.frozen_cols = count.min(self.column_count());
    }

    /// Change one column's width; returns false if the index is out of range.
    pub fn set_column_width(&mut self, col: u32, width: f32) -> bool {
        let Some(w) = self.col_widths.get_mut(col as usize) else {
            return false;
        };
        *w = width.max(MIN_COLUMN_WIDTH);
        self.rebuild_columns();
        true
    }

    fn rebuild_columns(&mut self) {
        self.col_positions = prefix_sums(&self.col_widths);
    }

    fn rebuild_rows(&mut self) {
        let count = self.rows.len();
        let mut heights = Vec::with_capacity(count as usize);
        for linear in 0..count {
            let h = match self.rows.get(linear) {
                Some(LinearRow::Group(_)) => self.group_header_height,
                Some(LinearRow::Record(record)) => self
                    .row_overrides
                    .get(&record)
                    .copied()
                    .unwrap_or(self.default_row_height),
                None => self.default_row_height,
            };
            heights.push(h.max(0.0));
        }
        self.row_heights = heights;
        self.row_positions = prefix_sums(&self.row_heights);
    }

    pub fn column_count(&self) -> u32 {
        u32::try_from(self.col_widths.len()).unwrap_or(u32::MAX)
    }

    /// Number of display rows (records plus group headers).
    pub fn row_count(&self) -> u32 {
        self.rows.len()
    }

    pub fn is_frozen(&self, col: u32) -> bool {
        col < self.frozen_cols
    }

    /// Content x of a column's left edge, ignoring scroll.
    pub fn column_offset(&self, col: u32) -> f32 {
        self.col_positions.get(col as usize).copied().unwrap_or(0.0)
    }

    /// Content y of a display row's top edge, ignoring scroll.
    pub fn row_offset(&self, row: u32) -> f32 {
        self.row_positions.get(row as usize).copied().unwrap_or(0.0)
    }

    pub fn column_width(&self, col: u32) -> f32 {
        self.col_widths.get(col as usize).copied().unwrap_or(0.0)
    }

    pub fn row_height(&self, row: u32) -> f32 {
        self.row_heights.get(row as usize).copied().unwrap_or(0.0)
    }

    pub fn total_columns_width(&self) -> f32 {
        self.col_positions.last().copied().unwrap_or(0.0)
    }

    /// Height of all display rows plus the append row.
    pub fn total_rows_height(&self) -> f32 {
        self.row_positions.last().copied().unwrap_or(0.0) + self.append_row_height
    }

    pub fn frozen_width(&self) -> f32 {
        self.column_offset(self.frozen_cols)
    }

    /// Full scrollable width including the row header band and append column.
    pub fn content_width(&self) -> f32 {
        self.row_header_width + self.total_columns_width() + self.append_column_width
    }

    /// Full scrollable height including header and statistics bands.
    pub fn content_height(&self) -> f32 {
        self.header_height + self.total_rows_height() + self.statistics_height
    }

    /// Column whose span contains content x (binary search).
    pub fn column_at_x(&self, x: f32) -> Option<u32> {
        index_at(&self.col_positions, x)
    }

    /// Display row whose span contains content y (binary search).
    pub fn row_at_y(&self, y: f32) -> Option<u32> {
        index_at(&self.row_positions, y)
    }

    /// Screen x of a column's left edge; frozen columns ignore `scroll_left`.
    pub fn column_screen_x(&self, col: u32, scroll_left: f32) -> f32 {
        let x = self.row_header_width + self.column_offset(col);
        if self.is_frozen(col) {
            x
        } else {
            x - scroll_left
        }
    }

    pub fn row_screen_y(&self, row: u32, scroll_top: f32) -> f32 {
        self.header_height + self.row_offset(row) - scroll_top
    }

    /// Screen rectangle of a cell at the viewport's scroll, or `None` if out of bounds.
    ///
    /// The rectangle is unclipped: a scrolled-away cell gets coordinates
    /// outside the viewport. Use [`GridLayout::visible_cell_rect`] for the
    /// part actually on screen.
    pub fn cell_rect(&self, address: CellAddress, viewport: &Viewport) -> Option<Rect> {
        if address.col >= self.column_count() || address.row >= self.row_count() {
            return None;
        }
        Some(Rect::new(
            self.column_screen_x(address.col, viewport.scroll_left),
            self.row_screen_y(address.row, viewport.scroll_top),
            self.column_width(address.col),
            self.row_height(address.row),
        ))
    }

    /// The on-screen portion of a cell, clipped to the band it is drawn in.
    ///
    /// Non-frozen cells are clipped to the scrollable body (right of the
    /// frozen band); frozen cells to the frozen band. `None` when nothing
    /// of the cell is visible.
    pub fn visible_cell_rect(&self, address: CellAddress, viewport: &Viewport) -> Option<Rect> {
        let rect = self.cell_rect(address, viewport)?;
        let body = self.body_rect(viewport);
        let left = if self.is_frozen(address.col) {
            self.row_header_width
        } else {
            self.row_header_width + self.frozen_width()
        };
        let band = Rect::new(
            left,
            body.y,
            (body.right() - left).max(0.0),
            body.height,
        );
        rect.intersection(&band)
    }

    /// Screen area holding cell rows, between the column header and statistics band.
    pub fn body_rect(&self, viewport: &Viewport) -> Rect {
        let x = self.row_header_width;
        let y = self.header_height;
        Rect::new(
            x,
            y,
            (viewport.width - x).max(0.0),
            (viewport.height - y - self.statistics_height).max(0.0),
        )
    }

    /// Screen x of the frozen divider.
    pub fn frozen_divider_x(&self) -> f32 {
        self.row_header_width + self.frozen_width()
    }
}

fn prefix_sums(sizes: &[f32]) -> Vec<f32> {
    let mut positions = Vec::with_capacity(sizes.len() + 1);
    let mut acc: f32 = 0.0;
    for size in sizes {
        positions.push(acc);
        acc += size;
    }
    positions.push(acc);
    positions
}

/// Index `i` with `positions[i] <= v < positions[i + 1]`.
fn index_at(positions: &[f32], v: f32) -> Option<u32> {
    let last = positions.len().checked_sub(1)?;
    if last == 0 || v.is_nan() || v < 0.0 || v >= positions.get(last).copied().unwrap_or(0.0) {
        return None;
    }
    let i = match positions.binary_search_by(|pos| pos.partial_cmp(&v).unwrap_or(Ordering::Equal))
    {
        Ok(i) => i,
        Err(i) => i.saturating_sub(1),
    };
    // Zero-width spans share an edge; step to the last one starting at `v`.
    let mut i = i.min(last - 1);
    while i + 1 < last && positions.get(i + 1).is_some_and(|&p| p <= v) {
        i += 1;
    }
    u32::try_from(i).ok()
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

    fn columns(widths: &[f32]) -> Vec<ColumnDescriptor> {
        widths
            .iter()
            .enumerate()
            .map(|(i, w)| ColumnDescriptor::new(format!("c{i}"), format!("Col {i}"), *w))
            .collect()
    }

    fn layout(widths: &[f32], rows: u32, frozen: u32) -> GridLayout {
        let config = GridConfig {
            frozen_column_count: frozen,
            ..GridConfig::default()
        };
        GridLayout::new(&columns(widths), LinearRows::ungrouped(rows), &config)
    }

    #[test]
    fn test_prefix_offsets() {
        let l = layout(&[100.0, 150.0, 50.0], 4, 0);
        assert_eq!(l.column_offset(0), 0.0);
        assert_eq!(l.column_offset(2), 250.0);
        assert_eq!(l.total_columns_width(), 300.0);
        assert_eq!(l.row_offset(3), 96.0);
        assert_eq!(l.total_rows_height(), 128.0);
    }

    #[test]
    fn test_column_at_x() {
        let l = layout(&[100.0, 150.0, 50.0], 4, 0);
        assert_eq!(l.column_at_x(0.0), Some(0));
        assert_eq!(l.column_at_x(99.9), Some(0));
        assert_eq!(l.column_at_x(100.0), Some(1));
        assert_eq!(l.column_at_x(299.0), Some(2));
        assert_eq!(l.column_at_x(300.0), None);
        assert_eq!(l.column_at_x(-1.0), None);
    }

    #[test]
    fn test_set_column_width_invalidates_offsets() {
        let mut l = layout(&[100.0, 100.0, 100.0], 4, 0);
        assert!(l.set_column_width(0, 200.0));
        assert_eq!(l.column_offset(1), 200.0);
        assert_eq!(l.total_columns_width(), 400.0);
        assert!(!l.set_column_width(9, 200.0));
    }

    #[test]
    fn test_row_overrides_and_group_bands() {
        use crate::types::GroupPoint;
        use std::collections::BTreeSet;

        let rows = LinearRows::grouped(
            &[GroupPoint::group("g", 0, "G"), GroupPoint::rows(2)],
            &BTreeSet::new(),
        );
        let config = GridConfig {
            group_header_height: 24.0,
            ..GridConfig::default()
        };
        let mut l = GridLayout::new(&columns(&[100.0]), rows, &config);
        assert_eq!(l.row_height(0), 24.0);
        assert_eq!(l.row_offset(1), 24.0);
        l.set_row_overrides([(1, 64.0)].into_iter().collect());
        assert_eq!(l.row_height(2), 64.0);
        assert_eq!(l.total_rows_height(), 24.0 + 32.0 + 64.0);
    }

    #[test]
    fn test_frozen_column_pinned() {
        let l = layout(&[100.0, 100.0, 100.0], 10, 1);
        let mut vp = Viewport::new(200.0, 300.0);
        vp.scroll_left = 50.0;
        let c0 = l.cell_rect(CellAddress::new(0, 0), &vp).unwrap();
        let c1 = l.cell_rect(CellAddress::new(1, 0), &vp).unwrap();
        assert_eq!(c0.x, 0.0);
        assert_eq!(c1.x, 50.0);
        // Column 1 slides under the frozen band.
        let v1 = l.visible_cell_rect(CellAddress::new(1, 0), &vp).unwrap();
        assert_eq!(v1.x, 100.0);
        assert_eq!(v1.width, 50.0);
    }

    #[test]
    fn test_frozen_count_clamped() {
        let l = layout(&[100.0, 100.0], 3, 5);
        assert_eq!(l.frozen_cols, 2);
        assert_eq!(l.frozen_width(), 200.0);
    }
}

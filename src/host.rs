//! The boundary between the grid core and the application that owns the data.
//!
//! The core never mutates host data. It asks for cell content while drawing
//! and reports user intent through the callbacks below; every callback has a
//! no-op default so hosts implement only what they handle. All row indices
//! passed across this boundary are record rows.

use std::collections::BTreeSet;

use crate::types::{CellAddress, CellContent, ColumnDescriptor, SelectionRegion};

/// Clipboard data handed to copy/paste callbacks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClipboardPayload {
    /// Tab-separated text (one line per row).
    pub text: String,
}

impl ClipboardPayload {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[allow(unused_variables)]
pub trait GridHost {
    /// Content for a visible cell. Called for every visible cell on every frame.
    fn cell_content(&self, address: CellAddress) -> CellContent;

    /// An edit was committed. `content` is the original content with the edited value.
    fn on_cell_edited(&mut self, address: CellAddress, content: CellContent) {}

    /// `None` appends at the end.
    fn on_row_append(&mut self, index: Option<u32>) {}

    fn on_column_append(&mut self) {}

    fn on_column_resize(&mut self, column: &ColumnDescriptor, new_width: f32, index: u32) {}

    /// `drop_index` is an insertion point in the pre-removal order.
    fn on_column_ordered(&mut self, drag_indices: &[u32], drop_index: u32) {}

    fn on_row_ordered(&mut self, drag_indices: &[u32], drop_index: u32) {}

    fn on_selection_changed(&mut self, region: &SelectionRegion) {}

    fn on_copy(&mut self, region: &SelectionRegion, payload: &ClipboardPayload) {}

    fn on_paste(&mut self, region: &SelectionRegion, payload: &ClipboardPayload) {}

    fn on_delete(&mut self, region: &SelectionRegion) {}

    fn on_undo(&mut self) {}

    fn on_redo(&mut self) {}

    fn on_collapsed_group_changed(&mut self, collapsed: &BTreeSet<String>) {}

    fn on_column_freeze(&mut self, frozen_count: u32) {}

    fn on_column_header_click(&mut self, col: u32) {}

    fn on_column_header_dbl_click(&mut self, col: u32) {}

    fn on_cell_dbl_click(&mut self, address: CellAddress) {}

    fn on_row_expand(&mut self, row: u32) {}

    fn on_scroll_changed(&mut self, scroll_left: f32, scroll_top: f32) {}
}

//! Common test utilities: a host that records every callback and builders
//! for grids of uniform columns.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use std::collections::{BTreeSet, HashMap};

use gridcanvas::controller::PointerInput;
use gridcanvas::{
    CellAddress, CellContent, ClipboardPayload, ColumnDescriptor, GridConfig, GridController,
    GridHost, SelectionRegion,
};

// ============================================================================
// Recording host
// ============================================================================

/// Host that serves `"col:row"` text unless a cell is overridden, and keeps
/// every callback it receives.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub cells: HashMap<CellAddress, CellContent>,
    pub edits: Vec<(CellAddress, CellContent)>,
    pub selections: Vec<SelectionRegion>,
    pub column_orders: Vec<(Vec<u32>, u32)>,
    pub row_orders: Vec<(Vec<u32>, u32)>,
    pub resizes: Vec<(String, f32, u32)>,
    pub freezes: Vec<u32>,
    pub collapsed: Vec<BTreeSet<String>>,
    pub copies: Vec<String>,
    pub pastes: Vec<(SelectionRegion, String)>,
    pub deletes: Vec<SelectionRegion>,
    pub row_appends: Vec<Option<u32>>,
    pub column_appends: usize,
    pub header_clicks: Vec<u32>,
    pub scrolls: Vec<(f32, f32)>,
    pub undos: usize,
    pub redos: usize,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cell(mut self, col: u32, row: u32, content: CellContent) -> Self {
        self.cells.insert(CellAddress::new(col, row), content);
        self
    }

    pub fn last_selection(&self) -> Option<&SelectionRegion> {
        self.selections.last()
    }
}

impl GridHost for RecordingHost {
    fn cell_content(&self, address: CellAddress) -> CellContent {
        self.cells
            .get(&address)
            .cloned()
            .unwrap_or_else(|| CellContent::text(format!("{}:{}", address.col, address.row)))
    }

    fn on_cell_edited(&mut self, address: CellAddress, content: CellContent) {
        self.edits.push((address, content));
    }

    fn on_row_append(&mut self, index: Option<u32>) {
        self.row_appends.push(index);
    }

    fn on_column_append(&mut self) {
        self.column_appends += 1;
    }

    fn on_column_resize(&mut self, column: &ColumnDescriptor, new_width: f32, index: u32) {
        self.resizes.push((column.id.clone(), new_width, index));
    }

    fn on_column_ordered(&mut self, drag_indices: &[u32], drop_index: u32) {
        self.column_orders.push((drag_indices.to_vec(), drop_index));
    }

    fn on_row_ordered(&mut self, drag_indices: &[u32], drop_index: u32) {
        self.row_orders.push((drag_indices.to_vec(), drop_index));
    }

    fn on_selection_changed(&mut self, region: &SelectionRegion) {
        self.selections.push(region.clone());
    }

    fn on_copy(&mut self, _region: &SelectionRegion, payload: &ClipboardPayload) {
        self.copies.push(payload.text.clone());
    }

    fn on_paste(&mut self, region: &SelectionRegion, payload: &ClipboardPayload) {
        self.pastes.push((region.clone(), payload.text.clone()));
    }

    fn on_delete(&mut self, region: &SelectionRegion) {
        self.deletes.push(region.clone());
    }

    fn on_undo(&mut self) {
        self.undos += 1;
    }

    fn on_redo(&mut self) {
        self.redos += 1;
    }

    fn on_collapsed_group_changed(&mut self, collapsed: &BTreeSet<String>) {
        self.collapsed.push(collapsed.clone());
    }

    fn on_column_freeze(&mut self, frozen_count: u32) {
        self.freezes.push(frozen_count);
    }

    fn on_column_header_click(&mut self, col: u32) {
        self.header_clicks.push(col);
    }

    fn on_scroll_changed(&mut self, scroll_left: f32, scroll_top: f32) {
        self.scrolls.push((scroll_left, scroll_top));
    }
}

// ============================================================================
// Grid builders
// ============================================================================

/// `count` columns of equal width, ids `c0..`.
pub fn uniform_columns(count: u32, width: f32) -> Vec<ColumnDescriptor> {
    (0..count)
        .map(|i| ColumnDescriptor::new(format!("c{i}"), format!("Column {i}"), width))
        .collect()
}

/// Grid of 100px columns with default config, sized `width` x `height`.
pub fn grid(cols: u32, rows: u32, width: f32, height: f32) -> GridController {
    grid_with(cols, rows, width, height, GridConfig::default())
}

pub fn grid_with(
    cols: u32,
    rows: u32,
    width: f32,
    height: f32,
    config: GridConfig,
) -> GridController {
    let mut controller = GridController::new(uniform_columns(cols, 100.0), rows, config);
    controller.resize(width, height);
    controller
}

/// Screen center of a cell (record rows).
pub fn cell_center(controller: &GridController, col: u32, row: u32) -> (f32, f32) {
    let rect = controller
        .get_cell_bounds(CellAddress::new(col, row))
        .expect("cell should be laid out");
    (rect.x + rect.width / 2.0, rect.y + rect.height / 2.0)
}

/// Press and release at one point.
pub fn click(controller: &mut GridController, host: &mut RecordingHost, input: PointerInput) {
    controller.pointer_down(input, host);
    controller.pointer_up(input, host);
}

pub fn click_cell(controller: &mut GridController, host: &mut RecordingHost, col: u32, row: u32) {
    let (x, y) = cell_center(controller, col, row);
    click(controller, host, PointerInput::primary(x, y));
}

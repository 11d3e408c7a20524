//! Interaction controller: the grid's single owner of mutable UI state.
//!
//! Pointer, keyboard, scroll and host data changes all come through here.
//! Internally every row index is a display row. The host only ever sees
//! record rows, so everything passed to [`GridHost`] and everything the
//! outbound API accepts or returns is translated at this boundary.
//!
//! State machine:
//!
//! ```text
//! Idle --press cell--> Selecting --release--> Idle (with selection)
//! Idle --Enter / double-click active cell--> Editing
//! Editing --Enter / Tab / blur--> commit --> Idle
//! Editing --Escape--> cancel --> Idle
//! Idle --press header, move past threshold--> Dragging --release--> Idle
//! ```

pub mod clipboard;
pub mod drag;
pub mod keyboard;
pub mod menus;

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::editor::{direct_commit_at, direct_commit_key, EditSession, EditorOverlay};
use crate::hit_test::{hit_test, HitTarget};
use crate::host::{ClipboardPayload, GridHost};
use crate::layout::{GridLayout, LinearRow, LinearRows, Viewport, MIN_COLUMN_WIDTH};
use crate::render::{build_frame, Decorations, DragFeedback, Frame, FrameInput};
use crate::selection::{SelectionModel, SelectionRange, SelectionTarget};
use crate::types::{
    normalize_cell_ranges, normalize_ranges, CellAddress, CellRange, CellValue, ColumnDescriptor,
    GridConfig, GroupPoint, IndexRange, Rect, SelectionKind, SelectionRegion,
};

pub use clipboard::{escape_cell_value, region_to_tsv};
pub use drag::{reorder, DragState, ReorderTarget, DRAG_THRESHOLD};
pub use keyboard::{Direction, KeyAction, KeyInput};
pub use menus::MenuState;

/// Keyboard modifiers held during a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
}

impl Modifiers {
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
    Other,
}

/// A pointer event in canvas (CSS pixel) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerInput {
    pub x: f32,
    pub y: f32,
    pub button: PointerButton,
    pub modifiers: Modifiers,
}

impl PointerInput {
    pub fn primary(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    pub fn secondary(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            button: PointerButton::Secondary,
            ..Self::default()
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }

    pub fn with_ctrl(mut self) -> Self {
        self.modifiers.ctrl = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InteractionState {
    Idle,
    Selecting,
    Editing,
    Dragging,
}

pub struct GridController {
    columns: Vec<ColumnDescriptor>,
    config: GridConfig,
    record_count: u32,
    /// Group points with their collapse flags moved into `collapsed`
    group_points: Vec<GroupPoint>,
    collapsed: BTreeSet<String>,
    row_heights: HashMap<u32, f32>,
    layout: GridLayout,
    viewport: Viewport,
    selection: SelectionModel,
    active: Option<CellAddress>,
    selecting: bool,
    edit: Option<EditSession>,
    drag: Option<DragState>,
    menus: MenuState,
    decorations: Decorations,
    hover: HitTarget,
    /// Last region reported to the host, in record rows
    reported: SelectionRegion,
    needs_render: bool,
}

impl GridController {
    pub fn new(columns: Vec<ColumnDescriptor>, record_count: u32, config: GridConfig) -> Self {
        let layout = GridLayout::new(&columns, LinearRows::ungrouped(record_count), &config);
        let selection =
            SelectionModel::new(layout.column_count(), layout.row_count(), config.selectable);
        Self {
            columns,
            config,
            record_count,
            group_points: Vec::new(),
            collapsed: BTreeSet::new(),
            row_heights: HashMap::new(),
            layout,
            viewport: Viewport::default(),
            selection,
            active: None,
            selecting: false,
            edit: None,
            drag: None,
            menus: MenuState::default(),
            decorations: Decorations::default(),
            hover: HitTarget::None,
            reported: SelectionRegion::None,
            needs_render: true,
        }
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn decorations(&self) -> &Decorations {
        &self.decorations
    }

    pub fn collapsed_groups(&self) -> &BTreeSet<String> {
        &self.collapsed
    }

    pub fn menus(&self) -> &MenuState {
        &self.menus
    }

    /// Close any open menu, e.g. after the host acted on it.
    pub fn close_menu(&mut self) -> bool {
        let closed = self.menus.close();
        self.needs_render |= closed;
        closed
    }

    pub fn editing(&self) -> Option<&EditSession> {
        self.edit.as_ref()
    }

    pub fn drag(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    pub fn state(&self) -> InteractionState {
        if self.edit.is_some() {
            InteractionState::Editing
        } else if self.drag.as_ref().is_some_and(DragState::is_active) {
            InteractionState::Dragging
        } else if self.selecting {
            InteractionState::Selecting
        } else {
            InteractionState::Idle
        }
    }

    /// Selection in display rows.
    pub fn selection_region(&self) -> SelectionRegion {
        self.selection.region()
    }

    /// Selection in record rows, as the host sees it.
    pub fn record_region(&self) -> SelectionRegion {
        to_record_region(&self.selection.region(), &self.layout.rows)
    }

    /// Active cell in record rows.
    pub fn active_cell(&self) -> Option<CellAddress> {
        self.active.and_then(|a| self.to_record(a))
    }

    /// CSS cursor for the current hover target or drag.
    pub fn cursor(&self) -> &'static str {
        match &self.drag {
            Some(DragState::Reorder { .. }) => "grabbing",
            Some(DragState::Resize { .. } | DragState::Freeze { .. }) => "col-resize",
            _ => self.hover.cursor(),
        }
    }

    /// Whether something changed since the last [`Self::take_needs_render`].
    pub fn needs_render(&self) -> bool {
        self.needs_render
    }

    pub fn take_needs_render(&mut self) -> bool {
        std::mem::take(&mut self.needs_render)
    }

    pub fn invalidate(&mut self) {
        self.needs_render = true;
    }

    /// Where the edit overlay goes right now, if editing.
    pub fn editor_overlay(&self) -> Option<EditorOverlay> {
        self.edit
            .as_ref()
            .map(|session| session.overlay(&self.layout, &self.viewport))
    }

    pub fn frame(&self, host: &dyn GridHost) -> Frame {
        let selection = self.selection.region();
        let input = FrameInput {
            layout: &self.layout,
            viewport: &self.viewport,
            columns: &self.columns,
            config: &self.config,
            selection: &selection,
            active_cell: self.active,
            decorations: &self.decorations,
            drag: self.drag_feedback(),
        };
        build_frame(&input, host)
    }

    fn drag_feedback(&self) -> DragFeedback {
        let layout = &self.layout;
        let viewport = &self.viewport;
        match &self.drag {
            Some(DragState::Reorder {
                target: ReorderTarget::Columns(_),
                drop: Some(drop),
            }) => DragFeedback::ColumnDrop {
                x: drag::column_drop_x(layout, viewport, *drop),
            },
            Some(DragState::Reorder {
                target: ReorderTarget::Rows(_),
                drop: Some(drop),
            }) => DragFeedback::RowDrop {
                y: drag::row_drop_y(layout, viewport, *drop),
            },
            Some(DragState::Resize { col, .. }) => DragFeedback::ResizeGuide {
                x: layout.column_screen_x(*col, viewport.scroll_left) + layout.column_width(*col),
            },
            Some(DragState::Freeze { count, .. }) => DragFeedback::FreezeGuide {
                x: drag::freeze_guide_x(layout, viewport, *count),
            },
            _ => DragFeedback::None,
        }
    }

    // ------------------------------------------------------------------
    // Host data
    // ------------------------------------------------------------------

    pub fn set_columns(&mut self, columns: Vec<ColumnDescriptor>) {
        self.columns = columns;
        self.layout.set_columns(&self.columns);
        self.layout.set_frozen_cols(self.config.frozen_column_count);
        self.after_structure_change();
    }

    /// Row count for an ungrouped grid. Ignored while group points are set.
    pub fn set_record_count(&mut self, count: u32, host: &mut dyn GridHost) {
        self.record_count = count;
        self.rebuild_rows();
        self.notify_selection(host);
    }

    /// Replace the grouping. Groups flagged collapsed join the collapsed set.
    pub fn set_group_points(&mut self, points: Vec<GroupPoint>, host: &mut dyn GridHost) {
        self.group_points = points
            .into_iter()
            .map(|point| match point {
                GroupPoint::Group {
                    id,
                    depth,
                    value,
                    is_collapsed,
                } => {
                    if is_collapsed {
                        self.collapsed.insert(id.clone());
                    }
                    GroupPoint::Group {
                        id,
                        depth,
                        value,
                        is_collapsed: false,
                    }
                }
                rows => rows,
            })
            .collect();
        self.rebuild_rows();
        self.notify_selection(host);
    }

    pub fn set_collapsed_groups(&mut self, collapsed: BTreeSet<String>, host: &mut dyn GridHost) {
        self.collapsed = collapsed;
        self.rebuild_rows();
        self.notify_selection(host);
    }

    /// Per-record height overrides.
    pub fn set_row_heights(&mut self, heights: HashMap<u32, f32>) {
        self.row_heights = heights;
        self.layout.set_row_overrides(self.row_heights.clone());
        self.viewport.clamp_scroll(&self.layout);
        self.needs_render = true;
    }

    pub fn set_config(&mut self, config: GridConfig) {
        self.config = config;
        self.layout.apply_config(&self.config);
        self.selection.set_selectable(self.config.selectable);
        if !self.config.selectable.allows_cells() {
            self.active = None;
        }
        self.after_structure_change();
    }

    pub fn set_decorations(&mut self, decorations: Decorations) {
        self.decorations = decorations;
        self.needs_render = true;
    }

    /// Viewport size in CSS pixels.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport.resize(width, height, &self.layout);
        self.needs_render = true;
    }

    /// Rebuild display rows. Display indices shift, so the active cell,
    /// the edit and the selection follow their records; whatever is now
    /// hidden or gone is dropped.
    fn rebuild_rows(&mut self) {
        let active = self.active_cell();
        let region = self.record_region();
        let rows = if self.group_points.is_empty() {
            LinearRows::ungrouped(self.record_count)
        } else {
            LinearRows::grouped(&self.group_points, &self.collapsed)
        };
        self.layout.set_rows(rows);
        self.selection
            .set_bounds(self.layout.column_count(), self.layout.row_count());

        self.active = active.and_then(|a| self.to_display(a));
        match self.edit.as_ref().map(|e| self.to_display(e.record)) {
            Some(Some(address)) => {
                if let Some(edit) = self.edit.as_mut() {
                    edit.address = address;
                }
            }
            Some(None) => {
                tracing::debug!("edited record hidden; edit cancelled");
                self.edit = None;
            }
            None => {}
        }
        self.restore_selection(&region);
        self.after_structure_change();
    }

    /// Re-select a record-row region in the current display rows.
    fn restore_selection(&mut self, region: &SelectionRegion) {
        let rows = &self.layout.rows;
        let ranges: Vec<SelectionRange> = match region {
            SelectionRegion::None => Vec::new(),
            SelectionRegion::Columns(_) => return,
            SelectionRegion::Rows(ranges) => ranges
                .iter()
                .flat_map(|r| rows.display_ranges(*r))
                .map(SelectionRange::Rows)
                .collect(),
            SelectionRegion::Cells(ranges) => ranges
                .iter()
                .flat_map(|r| {
                    rows.display_ranges(r.rows).into_iter().map(move |run| {
                        SelectionRange::Cells(CellRange {
                            cols: r.cols,
                            rows: run,
                        })
                    })
                })
                .collect(),
        };
        self.selection.clear();
        for range in ranges {
            self.selection.add_range(range);
        }
    }

    /// Re-clamp everything that depends on extents.
    fn after_structure_change(&mut self) {
        self.selection
            .set_bounds(self.layout.column_count(), self.layout.row_count());
        if let Some(active) = self.active {
            let valid = active.col < self.layout.column_count()
                && self.layout.rows.record_index(active.row).is_some();
            if !valid {
                self.active = None;
            }
        }
        if self
            .edit
            .as_ref()
            .is_some_and(|e| self.to_display(e.record) != Some(e.address))
        {
            tracing::debug!("edited cell moved or disappeared; edit cancelled");
            self.edit = None;
        }
        self.drag = None;
        self.viewport.clamp_scroll(&self.layout);
        self.needs_render = true;
    }

    // ------------------------------------------------------------------
    // Outbound API (record rows)
    // ------------------------------------------------------------------

    /// Scroll the least amount that makes the cell fully visible.
    pub fn scroll_to_item(&mut self, address: CellAddress, host: &mut dyn GridHost) -> bool {
        let Some(display) = self.to_display(address) else {
            return false;
        };
        self.scroll_into_view(display, host)
    }

    pub fn scroll_to(&mut self, x: f32, y: f32, host: &mut dyn GridHost) -> bool {
        let moved = self.viewport.set_scroll(x, y, &self.layout);
        self.after_scroll(moved, host)
    }

    pub fn scroll_by(&mut self, dx: f32, dy: f32, host: &mut dyn GridHost) -> bool {
        let moved = self.viewport.scroll_by(dx, dy, &self.layout);
        self.after_scroll(moved, host)
    }

    /// Back to the initial state: no selection, no active cell, scrolled to
    /// the origin. An edit in progress is dropped without committing.
    pub fn reset_state(&mut self) {
        self.selection.clear();
        self.active = None;
        self.selecting = false;
        self.edit = None;
        self.drag = None;
        self.menus.close();
        self.hover = HitTarget::None;
        self.reported = SelectionRegion::None;
        self.viewport.scroll_left = 0.0;
        self.viewport.scroll_top = 0.0;
        self.needs_render = true;
    }

    /// Unclipped screen rect of a cell, or `None` for an unknown or hidden cell.
    pub fn get_cell_bounds(&self, address: CellAddress) -> Option<Rect> {
        let display = self.to_display(address)?;
        self.layout.cell_rect(display, &self.viewport)
    }

    pub fn set_active_cell(&mut self, address: CellAddress, host: &mut dyn GridHost) -> bool {
        let Some(display) = self.to_display(address) else {
            return false;
        };
        if display.col >= self.layout.column_count() || !self.config.selectable.allows_cells() {
            return false;
        }
        self.commit_edit(host);
        self.active = Some(display);
        self.selection.start_selection(SelectionTarget::Cell(display));
        self.notify_selection(host);
        true
    }

    /// Record address of the cell under a canvas point.
    pub fn get_cell_indices_at_position(&self, x: f32, y: f32) -> Option<CellAddress> {
        match self.hit(x, y) {
            HitTarget::Cell(address) => self.to_record(address),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Pointer
    // ------------------------------------------------------------------

    pub fn hit(&self, x: f32, y: f32) -> HitTarget {
        hit_test(&self.layout, &self.viewport, &self.columns, x, y)
    }

    pub fn pointer_down(&mut self, input: PointerInput, host: &mut dyn GridHost) {
        let hit = self.hit(input.x, input.y);
        match input.button {
            PointerButton::Primary => {}
            PointerButton::Secondary => {
                self.context_menu(hit, input, host);
                return;
            }
            PointerButton::Other => return,
        }
        if !matches!(hit, HitTarget::ColumnHeaderMenu(_)) && self.menus.close() {
            self.needs_render = true;
        }
        // Pressing anywhere on the canvas blurs the editor.
        self.commit_edit(host);

        let mods = input.modifiers;
        match hit {
            HitTarget::ColumnResizeHandle(col) => {
                let width = self.layout.column_width(col);
                tracing::debug!(col, width, "resize start");
                self.drag = Some(DragState::Resize {
                    col,
                    origin_x: input.x,
                    start_width: width,
                    width,
                });
            }
            HitTarget::FreezeHandle => {
                let original = self.layout.frozen_cols;
                self.drag = Some(DragState::Freeze {
                    original,
                    count: original,
                });
            }
            HitTarget::ColumnHeaderMenu(col) => {
                self.menus.open_header(col, input.x, input.y);
                self.needs_render = true;
            }
            HitTarget::ColumnHeader(col) | HitTarget::ColumnDragHandle(col) => {
                let already = self.selection.region().is_column_selected(col);
                if !(already && self.config.draggable.allows_columns() && !mods.shift && !mods.command()) {
                    self.select_header(SelectionTarget::Column(col), mods, host);
                }
                host.on_column_header_click(col);
                if self.config.draggable.allows_columns() {
                    let indices = self.dragged_indices(SelectionKind::Columns, col);
                    self.drag = Some(DragState::Pending {
                        target: ReorderTarget::Columns(indices),
                        origin_x: input.x,
                        origin_y: input.y,
                    });
                }
            }
            HitTarget::RowHeader(row) | HitTarget::RowDragHandle(row) => {
                let already = self.selection.region().is_row_selected(row);
                if !(already && self.config.draggable.allows_rows() && !mods.shift && !mods.command()) {
                    self.select_header(SelectionTarget::Row(row), mods, host);
                }
                if self.config.draggable.allows_rows() {
                    let indices = self.dragged_indices(SelectionKind::Rows, row);
                    self.drag = Some(DragState::Pending {
                        target: ReorderTarget::Rows(indices),
                        origin_x: input.x,
                        origin_y: input.y,
                    });
                }
            }
            HitTarget::CornerHeader => {
                if self.selection.select_all() {
                    self.notify_selection(host);
                }
            }
            HitTarget::Cell(address) => self.press_cell(address, input, host),
            HitTarget::GroupHeader(row) => self.toggle_group(row, host),
            HitTarget::AppendRow => host.on_row_append(None),
            HitTarget::AppendColumn => host.on_column_append(),
            HitTarget::StatisticCell(col) => {
                self.menus.open_statistic(col, input.x, input.y);
                self.needs_render = true;
            }
            HitTarget::None => {}
        }
    }

    pub fn pointer_move(&mut self, input: PointerInput) {
        let hit = self.hit(input.x, input.y);
        let drag = self.drag.take();
        let started = drag
            .as_ref()
            .is_some_and(|d| d.passes_threshold(input.x, input.y));
        self.drag = match drag {
            Some(DragState::Pending { target, .. }) if started => {
                tracing::debug!(?target, "reorder drag start");
                self.selecting = false;
                let drop = self.drop_index(&target, input);
                self.needs_render = true;
                Some(DragState::Reorder { target, drop })
            }
            Some(pending @ DragState::Pending { .. }) => {
                self.extend_by_pointer(hit);
                Some(pending)
            }
            Some(DragState::Reorder { target, .. }) => {
                let drop = self.drop_index(&target, input);
                self.needs_render = true;
                Some(DragState::Reorder { target, drop })
            }
            Some(DragState::Resize {
                col,
                origin_x,
                start_width,
                ..
            }) => {
                let width = (start_width + input.x - origin_x).max(MIN_COLUMN_WIDTH);
                self.layout.set_column_width(col, width);
                self.viewport.clamp_scroll(&self.layout);
                self.needs_render = true;
                Some(DragState::Resize {
                    col,
                    origin_x,
                    start_width,
                    width,
                })
            }
            Some(DragState::Freeze { original, .. }) => {
                let count = drag::freeze_count_at(&self.layout, &self.viewport, input.x);
                self.needs_render = true;
                Some(DragState::Freeze { original, count })
            }
            None => {
                self.extend_by_pointer(hit);
                self.hover = hit;
                None
            }
        };
    }

    pub fn pointer_up(&mut self, _input: PointerInput, host: &mut dyn GridHost) {
        self.selecting = false;
        match self.drag.take() {
            Some(DragState::Reorder {
                target,
                drop: Some(drop),
            }) => self.finish_reorder(target, drop, host),
            Some(DragState::Reorder { drop: None, .. }) => {
                tracing::debug!("reorder dropped outside grid; cancelled");
            }
            Some(DragState::Resize {
                col,
                start_width,
                width,
                ..
            }) => {
                if (width - start_width).abs() > f32::EPSILON {
                    if let Some(column) = self.columns.get_mut(col as usize) {
                        let before = column.clone();
                        column.width = width;
                        tracing::debug!(col, width, "resize commit");
                        host.on_column_resize(&before, width, col);
                    }
                }
            }
            Some(DragState::Freeze { original, count }) => {
                if count != original {
                    self.config.frozen_column_count = count;
                    self.layout.set_frozen_cols(count);
                    self.viewport.clamp_scroll(&self.layout);
                    host.on_column_freeze(self.layout.frozen_cols);
                }
            }
            Some(DragState::Pending { .. }) | None => {}
        }
        self.needs_render = true;
    }

    pub fn double_click(&mut self, input: PointerInput, host: &mut dyn GridHost) {
        match self.hit(input.x, input.y) {
            HitTarget::Cell(address) => {
                let Some(record) = self.to_record(address) else {
                    return;
                };
                if self.active == Some(address) && self.edit.is_none() {
                    self.begin_edit(host);
                }
                host.on_cell_dbl_click(record);
            }
            HitTarget::ColumnHeader(col) => host.on_column_header_dbl_click(col),
            HitTarget::RowHeader(row) | HitTarget::RowDragHandle(row) => {
                if let Some(record) = self.layout.rows.record_index(row) {
                    host.on_row_expand(record);
                }
            }
            _ => {}
        }
    }

    /// Leaving the canvas drops hover state but keeps any drag.
    pub fn pointer_leave(&mut self) {
        self.hover = HitTarget::None;
    }

    fn press_cell(&mut self, address: CellAddress, input: PointerInput, host: &mut dyn GridHost) {
        if !self.config.selectable.allows_cells() {
            return;
        }
        let mods = input.modifiers;
        if mods.shift && self.active.is_some() && self.selection.kind() == SelectionKind::Cells {
            self.selection.extend_to(SelectionTarget::Cell(address));
        } else if mods.command() {
            self.selection
                .add_range(SelectionRange::Cells(CellRange::single(address)));
            self.active = Some(address);
        } else {
            self.active = Some(address);
            self.selection.start_selection(SelectionTarget::Cell(address));
            self.try_direct_commit_at(address, input, host);
        }
        self.selecting = true;
        self.notify_selection(host);
    }

    fn try_direct_commit_at(&self, address: CellAddress, input: PointerInput, host: &mut dyn GridHost) {
        let (Some(record), Some(rect)) = (
            self.to_record(address),
            self.layout.cell_rect(address, &self.viewport),
        ) else {
            return;
        };
        let content = host.cell_content(record);
        if let Some(next) = direct_commit_at(&content, rect, input.x, input.y) {
            tracing::debug!(?record, "direct commit");
            host.on_cell_edited(record, next);
        }
    }

    fn select_header(&mut self, target: SelectionTarget, mods: Modifiers, host: &mut dyn GridHost) {
        let changed = if mods.shift && self.selection.kind() == target.kind() {
            self.selection.extend_to(target)
        } else if mods.command() {
            let range = match target {
                SelectionTarget::Row(r) => SelectionRange::Rows(IndexRange::single(r)),
                SelectionTarget::Column(c) => SelectionRange::Columns(IndexRange::single(c)),
                SelectionTarget::Cell(a) => SelectionRange::Cells(CellRange::single(a)),
            };
            self.selection.add_range(range)
        } else {
            self.selection.start_selection(target)
        };
        if changed {
            self.selecting = true;
            self.notify_selection(host);
        }
    }

    /// Drag-select while the button is held.
    fn extend_by_pointer(&mut self, hit: HitTarget) {
        if !self.selecting {
            return;
        }
        let target = match (hit, self.selection.kind()) {
            (HitTarget::Cell(address), SelectionKind::Cells) => SelectionTarget::Cell(address),
            (HitTarget::RowHeader(row) | HitTarget::RowDragHandle(row), SelectionKind::Rows) => {
                SelectionTarget::Row(row)
            }
            (
                HitTarget::ColumnHeader(col) | HitTarget::ColumnDragHandle(col),
                SelectionKind::Columns,
            ) => SelectionTarget::Column(col),
            _ => return,
        };
        if self.selection.focus() != Some(target) && self.selection.extend_to(target) {
            self.needs_render = true;
        }
    }

    /// Indices a header drag moves: the whole selection when the pressed
    /// header is part of it, otherwise just that header.
    fn dragged_indices(&self, kind: SelectionKind, index: u32) -> Vec<u32> {
        let region = self.selection.region();
        let ranges = match (&region, kind) {
            (SelectionRegion::Columns(ranges), SelectionKind::Columns)
            | (SelectionRegion::Rows(ranges), SelectionKind::Rows) => ranges,
            _ => return vec![index],
        };
        if !ranges.iter().any(|r| r.contains(index)) {
            return vec![index];
        }
        ranges
            .iter()
            .flat_map(|r| r.iter())
            .filter(|&i| kind == SelectionKind::Columns || self.layout.rows.record_index(i).is_some())
            .collect()
    }

    fn drop_index(&self, target: &ReorderTarget, input: PointerInput) -> Option<u32> {
        let (layout, viewport) = (&self.layout, &self.viewport);
        match target {
            ReorderTarget::Columns(_) => drag::column_drop_index(layout, viewport, input.x, input.y),
            ReorderTarget::Rows(_) => drag::row_drop_index(layout, viewport, input.x, input.y),
        }
    }

    fn finish_reorder(&mut self, target: ReorderTarget, drop: u32, host: &mut dyn GridHost) {
        match target {
            ReorderTarget::Columns(indices) => {
                if drag::is_noop_reorder(self.layout.column_count(), &indices, drop) {
                    tracing::debug!("column drop onto itself ignored");
                    return;
                }
                tracing::debug!(?indices, drop, "column reorder");
                host.on_column_ordered(&indices, drop);
            }
            ReorderTarget::Rows(indices) => {
                let rows = &self.layout.rows;
                let records: Vec<u32> = indices.iter().filter_map(|&r| rows.record_index(r)).collect();
                let drop_record = rows
                    .next_record_from(drop)
                    .unwrap_or_else(|| rows.record_count());
                if records.is_empty()
                    || drag::is_noop_reorder(rows.record_count(), &records, drop_record)
                {
                    tracing::debug!("row drop onto itself ignored");
                    return;
                }
                tracing::debug!(?records, drop_record, "row reorder");
                host.on_row_ordered(&records, drop_record);
            }
        }
    }

    fn context_menu(&mut self, hit: HitTarget, input: PointerInput, host: &mut dyn GridHost) {
        let (x, y) = (input.x, input.y);
        match hit {
            HitTarget::Cell(address) => {
                let Some(record) = self.to_record(address) else {
                    return;
                };
                if !self.selection.region().contains(address) {
                    self.commit_edit(host);
                    if self.config.selectable.allows_cells() {
                        self.active = Some(address);
                        self.selection.start_selection(SelectionTarget::Cell(address));
                        self.notify_selection(host);
                    }
                }
                self.menus.open_record(record.row, Some(record.col), x, y);
            }
            HitTarget::RowHeader(row) | HitTarget::RowDragHandle(row) => {
                if let Some(record) = self.layout.rows.record_index(row) {
                    self.menus.open_record(record, None, x, y);
                }
            }
            HitTarget::ColumnHeader(col)
            | HitTarget::ColumnHeaderMenu(col)
            | HitTarget::ColumnDragHandle(col) => self.menus.open_header(col, x, y),
            HitTarget::StatisticCell(col) => self.menus.open_statistic(col, x, y),
            HitTarget::GroupHeader(row) => {
                if let Some(LinearRow::Group(group)) = self.layout.rows.get(row) {
                    let id = group.id.clone();
                    self.menus.open_group(id, x, y);
                }
            }
            _ => {
                self.menus.close();
            }
        }
        self.needs_render = true;
    }

    fn toggle_group(&mut self, row: u32, host: &mut dyn GridHost) {
        let Some(LinearRow::Group(group)) = self.layout.rows.get(row) else {
            return;
        };
        let id = group.id.clone();
        if !self.collapsed.remove(&id) {
            self.collapsed.insert(id);
        }
        self.rebuild_rows();
        host.on_collapsed_group_changed(&self.collapsed);
        self.notify_selection(host);
    }

    // ------------------------------------------------------------------
    // Keyboard
    // ------------------------------------------------------------------

    /// Handle a keydown. Returns true when the key was consumed and the
    /// browser default should be suppressed.
    pub fn key_down(&mut self, input: &KeyInput, host: &mut dyn GridHost) -> bool {
        let action = keyboard::classify(input);

        if self.edit.is_some() {
            return match action {
                KeyAction::Escape => self.cancel_edit(),
                KeyAction::Enter => {
                    self.commit_edit(host);
                    self.move_active(Direction::Down, host);
                    true
                }
                KeyAction::Tab { back } => {
                    self.commit_edit(host);
                    let direction = if back { Direction::Left } else { Direction::Right };
                    self.move_active(direction, host);
                    true
                }
                // Everything else belongs to the input element.
                _ => false,
            };
        }

        match action {
            KeyAction::Escape => {
                if self.cancel_drag() {
                    return true;
                }
                let closed = self.menus.close();
                self.needs_render |= closed;
                closed
            }
            KeyAction::Move { direction, extend } => {
                if extend {
                    self.extend_active(direction, host);
                } else {
                    self.move_active(direction, host);
                }
                true
            }
            KeyAction::Tab { back } => {
                let direction = if back { Direction::Left } else { Direction::Right };
                self.move_active(direction, host);
                true
            }
            KeyAction::Enter => {
                let Some(record) = self.active_cell() else {
                    return false;
                };
                let content = host.cell_content(record);
                if let Some(next) = direct_commit_key(&content, "Enter") {
                    host.on_cell_edited(record, next);
                    return true;
                }
                self.begin_edit(host)
            }
            KeyAction::Delete => {
                let region = self.host_region();
                if region.is_none() {
                    return false;
                }
                host.on_delete(&region);
                true
            }
            KeyAction::Copy => self.copy(host).is_some(),
            // Let the browser raise its paste event, which carries the text.
            KeyAction::Paste => false,
            KeyAction::Undo => {
                host.on_undo();
                true
            }
            KeyAction::Redo => {
                host.on_redo();
                true
            }
            KeyAction::SelectAll => {
                if self.selection.select_all() {
                    self.notify_selection(host);
                }
                true
            }
            KeyAction::Type(text) => {
                let Some(record) = self.active_cell() else {
                    return false;
                };
                let content = host.cell_content(record);
                if let Some(next) = direct_commit_key(&content, &text) {
                    host.on_cell_edited(record, next);
                    return true;
                }
                self.begin_typing(&text, host)
            }
            KeyAction::Other => false,
        }
    }

    fn move_active(&mut self, direction: Direction, host: &mut dyn GridHost) {
        if !self.config.selectable.allows_cells() {
            return;
        }
        let from = match self.active {
            Some(active) => active,
            None => {
                let Some(row) = (0..self.layout.row_count())
                    .find(|&r| self.layout.rows.record_index(r).is_some())
                else {
                    return;
                };
                if self.layout.column_count() == 0 {
                    return;
                }
                CellAddress::new(0, row)
            }
        };
        let next = if self.active.is_some() {
            keyboard::step(from, direction, self.layout.column_count(), &self.layout.rows)
        } else {
            from
        };
        if self.active == Some(next) {
            return;
        }
        self.active = Some(next);
        self.selection.start_selection(SelectionTarget::Cell(next));
        self.scroll_into_view(next, host);
        self.notify_selection(host);
    }

    fn extend_active(&mut self, direction: Direction, host: &mut dyn GridHost) {
        let Some(active) = self.active else {
            self.move_active(direction, host);
            return;
        };
        let focus = match self.selection.focus() {
            Some(SelectionTarget::Cell(focus)) if self.selection.kind() == SelectionKind::Cells => focus,
            _ => {
                self.selection.start_selection(SelectionTarget::Cell(active));
                active
            }
        };
        let next = keyboard::step(focus, direction, self.layout.column_count(), &self.layout.rows);
        if next == focus {
            return;
        }
        self.selection.extend_to(SelectionTarget::Cell(next));
        self.scroll_into_view(next, host);
        self.notify_selection(host);
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    /// Open the overlay editor on the active cell.
    pub fn begin_edit(&mut self, host: &mut dyn GridHost) -> bool {
        let Some((address, record)) = self.active.zip(self.active_cell()) else {
            return false;
        };
        let Some(session) = EditSession::begin(address, record, host.cell_content(record)) else {
            return false;
        };
        self.start_session(session, host)
    }

    /// Open the editor seeded with a typed character.
    pub fn begin_typing(&mut self, typed: &str, host: &mut dyn GridHost) -> bool {
        let Some((address, record)) = self.active.zip(self.active_cell()) else {
            return false;
        };
        let Some(session) =
            EditSession::begin_typing(address, record, host.cell_content(record), typed)
        else {
            return false;
        };
        self.start_session(session, host)
    }

    fn start_session(&mut self, session: EditSession, host: &mut dyn GridHost) -> bool {
        tracing::debug!(record = ?session.record, editor = ?session.editor, "edit begin");
        let address = session.address;
        self.edit = Some(session);
        self.selecting = false;
        self.scroll_into_view(address, host);
        self.needs_render = true;
        true
    }

    /// Mirror the input element's text into the session.
    pub fn set_draft(&mut self, draft: &str) {
        if let Some(session) = self.edit.as_mut() {
            session.set_draft(draft);
        }
    }

    /// Commit the edit in progress. A no-op when not editing.
    pub fn commit_edit(&mut self, host: &mut dyn GridHost) -> bool {
        let Some(session) = self.edit.take() else {
            return false;
        };
        self.needs_render = true;
        match session.commit() {
            Some(content) => {
                tracing::debug!(record = ?session.record, "edit commit");
                host.on_cell_edited(session.record, content);
                true
            }
            None => {
                tracing::debug!(record = ?session.record, "edit closed without change");
                false
            }
        }
    }

    /// Commit a value from a host-driven picker. A no-op when not editing.
    pub fn commit_edit_value(&mut self, value: CellValue, host: &mut dyn GridHost) -> bool {
        let Some(session) = self.edit.take() else {
            return false;
        };
        self.needs_render = true;
        match session.commit_value(value) {
            Some(content) => {
                host.on_cell_edited(session.record, content);
                true
            }
            None => false,
        }
    }

    /// Drop the edit in progress without committing.
    pub fn cancel_edit(&mut self) -> bool {
        let cancelled = self.edit.take().is_some();
        if cancelled {
            tracing::debug!("edit cancel");
            self.needs_render = true;
        }
        cancelled
    }

    /// Abandon a drag, restoring a column being resized.
    pub fn cancel_drag(&mut self) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        if let DragState::Resize { col, start_width, .. } = drag {
            self.layout.set_column_width(col, start_width);
            self.viewport.clamp_scroll(&self.layout);
        }
        tracing::debug!("drag cancel");
        self.needs_render = true;
        drag.is_active()
    }

    // ------------------------------------------------------------------
    // Clipboard
    // ------------------------------------------------------------------

    /// Serialize the selection (or the active cell) and hand it to the host.
    pub fn copy(&mut self, host: &mut dyn GridHost) -> Option<ClipboardPayload> {
        let region = self.display_region_or_active();
        if region.is_none() {
            return None;
        }
        let text = region_to_tsv(&region, &self.layout.rows, self.layout.column_count(), &*host);
        let payload = ClipboardPayload::new(text);
        host.on_copy(&to_record_region(&region, &self.layout.rows), &payload);
        Some(payload)
    }

    /// Forward pasted text with the current selection.
    pub fn paste(&mut self, text: &str, host: &mut dyn GridHost) -> bool {
        let region = self.host_region();
        if region.is_none() {
            return false;
        }
        host.on_paste(&region, &ClipboardPayload::new(text));
        true
    }

    fn display_region_or_active(&self) -> SelectionRegion {
        let region = self.selection.region();
        match (region.is_none(), self.active) {
            (true, Some(active)) => SelectionRegion::Cells(vec![CellRange::single(active)]),
            _ => region,
        }
    }

    fn host_region(&self) -> SelectionRegion {
        to_record_region(&self.display_region_or_active(), &self.layout.rows)
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn to_record(&self, display: CellAddress) -> Option<CellAddress> {
        let row = self.layout.rows.record_index(display.row)?;
        Some(CellAddress::new(display.col, row))
    }

    fn to_display(&self, record: CellAddress) -> Option<CellAddress> {
        if record.col >= self.layout.column_count() {
            return None;
        }
        let row = self.layout.rows.linear_index(record.row)?;
        Some(CellAddress::new(record.col, row))
    }

    fn scroll_into_view(&mut self, display: CellAddress, host: &mut dyn GridHost) -> bool {
        let moved = self.viewport.scroll_to_item(display, &self.layout);
        self.after_scroll(moved, host)
    }

    fn after_scroll(&mut self, moved: bool, host: &mut dyn GridHost) -> bool {
        if moved {
            self.needs_render = true;
            host.on_scroll_changed(self.viewport.scroll_left, self.viewport.scroll_top);
        }
        moved
    }

    fn notify_selection(&mut self, host: &mut dyn GridHost) {
        self.needs_render = true;
        let region = self.record_region();
        if region != self.reported {
            host.on_selection_changed(&region);
            self.reported = region;
        }
    }
}

/// Translate a display-row region to record rows. Group header rows drop
/// out, so one display range may become several record ranges.
pub fn to_record_region(region: &SelectionRegion, rows: &LinearRows) -> SelectionRegion {
    match region {
        SelectionRegion::None => SelectionRegion::None,
        SelectionRegion::Cells(ranges) => {
            let records: Vec<CellRange> = ranges
                .iter()
                .flat_map(|range| {
                    rows.record_ranges(range.rows)
                        .into_iter()
                        .map(move |rows| CellRange {
                            cols: range.cols,
                            rows,
                        })
                })
                .collect();
            if records.is_empty() {
                SelectionRegion::None
            } else {
                SelectionRegion::Cells(normalize_cell_ranges(records))
            }
        }
        SelectionRegion::Rows(ranges) => {
            let records: Vec<_> = ranges.iter().flat_map(|r| rows.record_ranges(*r)).collect();
            if records.is_empty() {
                SelectionRegion::None
            } else {
                SelectionRegion::Rows(normalize_ranges(records))
            }
        }
        SelectionRegion::Columns(ranges) => SelectionRegion::Columns(ranges.clone()),
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
    use crate::types::CellContent;

    #[derive(Default)]
    struct Recorder {
        cells: HashMap<CellAddress, CellContent>,
        edits: Vec<(CellAddress, CellContent)>,
        selections: Vec<SelectionRegion>,
        column_orders: Vec<(Vec<u32>, u32)>,
        row_orders: Vec<(Vec<u32>, u32)>,
        resizes: Vec<(f32, f32, u32)>,
        freezes: Vec<u32>,
        collapsed: Vec<BTreeSet<String>>,
        copies: Vec<String>,
        deletes: Vec<SelectionRegion>,
        scrolls: usize,
    }

    impl GridHost for Recorder {
        fn cell_content(&self, address: CellAddress) -> CellContent {
            self.cells
                .get(&address)
                .cloned()
                .unwrap_or_else(|| CellContent::text(format!("{}:{}", address.col, address.row)))
        }

        fn on_cell_edited(&mut self, address: CellAddress, content: CellContent) {
            self.edits.push((address, content));
        }

        fn on_column_resize(&mut self, column: &ColumnDescriptor, new_width: f32, index: u32) {
            self.resizes.push((column.width, new_width, index));
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

        fn on_delete(&mut self, region: &SelectionRegion) {
            self.deletes.push(region.clone());
        }

        fn on_collapsed_group_changed(&mut self, collapsed: &BTreeSet<String>) {
            self.collapsed.push(collapsed.clone());
        }

        fn on_column_freeze(&mut self, frozen_count: u32) {
            self.freezes.push(frozen_count);
        }

        fn on_scroll_changed(&mut self, _scroll_left: f32, _scroll_top: f32) {
            self.scrolls += 1;
        }
    }

    fn controller(records: u32) -> GridController {
        let columns = (0..5)
            .map(|i| ColumnDescriptor::new(format!("c{i}"), format!("C{i}"), 100.0))
            .collect();
        GridController::new(columns, records, GridConfig::default())
    }

    /// Screen center of a display cell with default geometry.
    fn center(col: u32, row: u32) -> (f32, f32) {
        (100.0 * col as f32 + 50.0, 40.0 + 32.0 * row as f32 + 16.0)
    }

    fn click(grid: &mut GridController, host: &mut Recorder, col: u32, row: u32) {
        let (x, y) = center(col, row);
        grid.pointer_down(PointerInput::primary(x, y), host);
        grid.pointer_up(PointerInput::primary(x, y), host);
    }

    fn cells(a: (u32, u32), b: (u32, u32)) -> SelectionRegion {
        SelectionRegion::Cells(vec![CellRange::new(
            CellAddress::new(a.0, a.1),
            CellAddress::new(b.0, b.1),
        )])
    }

    #[test]
    fn click_selects_cell_and_reports_once() {
        let mut grid = controller(20);
        let mut host = Recorder::default();
        click(&mut grid, &mut host, 1, 2);
        assert_eq!(grid.active_cell(), Some(CellAddress::new(1, 2)));
        assert_eq!(grid.state(), InteractionState::Idle);
        click(&mut grid, &mut host, 1, 2);
        assert_eq!(host.selections, vec![cells((1, 2), (1, 2))]);
    }

    #[test]
    fn shift_click_extends_from_active_cell() {
        let mut grid = controller(20);
        let mut host = Recorder::default();
        click(&mut grid, &mut host, 0, 0);
        let (x, y) = center(2, 3);
        grid.pointer_down(PointerInput::primary(x, y).with_shift(), &mut host);
        assert_eq!(grid.record_region(), cells((0, 0), (2, 3)));
        assert_eq!(grid.active_cell(), Some(CellAddress::new(0, 0)));
    }

    #[test]
    fn ctrl_click_adds_disjoint_range() {
        let mut grid = controller(20);
        let mut host = Recorder::default();
        click(&mut grid, &mut host, 0, 0);
        let (x, y) = center(3, 4);
        grid.pointer_down(PointerInput::primary(x, y).with_ctrl(), &mut host);
        let SelectionRegion::Cells(ranges) = grid.record_region() else {
            panic!("expected cells");
        };
        assert_eq!(ranges.len(), 2);
        assert_eq!(grid.active_cell(), Some(CellAddress::new(3, 4)));
    }

    #[test]
    fn drag_select_extends_while_pressed() {
        let mut grid = controller(20);
        let mut host = Recorder::default();
        let (x, y) = center(0, 0);
        grid.pointer_down(PointerInput::primary(x, y), &mut host);
        assert_eq!(grid.state(), InteractionState::Selecting);
        let (x, y) = center(1, 2);
        grid.pointer_move(PointerInput::primary(x, y));
        grid.pointer_up(PointerInput::primary(x, y), &mut host);
        assert_eq!(grid.record_region(), cells((0, 0), (1, 2)));
        let (x, y) = center(4, 4);
        grid.pointer_move(PointerInput::primary(x, y));
        assert_eq!(grid.record_region(), cells((0, 0), (1, 2)));
    }

    #[test]
    fn arrow_keys_move_and_scroll_into_view() {
        let mut grid = controller(100);
        let mut host = Recorder::default();
        grid.resize(800.0, 200.0);
        assert!(grid.set_active_cell(CellAddress::new(0, 0), &mut host));
        for _ in 0..10 {
            assert!(grid.key_down(&KeyInput::new("ArrowDown"), &mut host));
        }
        assert_eq!(grid.active_cell(), Some(CellAddress::new(0, 10)));
        assert!(grid.viewport().scroll_top > 0.0);
        assert!(host.scrolls > 0);
        let bounds = grid.get_cell_bounds(CellAddress::new(0, 10)).unwrap();
        assert!(bounds.bottom() <= 200.0);
    }

    #[test]
    fn shift_arrow_extends_selection() {
        let mut grid = controller(20);
        let mut host = Recorder::default();
        grid.set_active_cell(CellAddress::new(1, 1), &mut host);
        grid.key_down(&KeyInput::new("ArrowRight").with_shift(), &mut host);
        grid.key_down(&KeyInput::new("ArrowDown").with_shift(), &mut host);
        assert_eq!(grid.record_region(), cells((1, 1), (2, 2)));
        assert_eq!(grid.active_cell(), Some(CellAddress::new(1, 1)));
    }

    #[test]
    fn enter_edits_then_commits_and_moves_down() {
        let mut grid = controller(20);
        let mut host = Recorder::default();
        grid.set_active_cell(CellAddress::new(0, 0), &mut host);
        assert!(grid.key_down(&KeyInput::new("Enter"), &mut host));
        assert_eq!(grid.state(), InteractionState::Editing);
        assert!(grid.editor_overlay().unwrap().visible);
        grid.set_draft("changed");
        grid.key_down(&KeyInput::new("Enter"), &mut host);
        assert_eq!(host.edits.len(), 1);
        assert_eq!(host.edits[0].0, CellAddress::new(0, 0));
        assert_eq!(host.edits[0].1.value.display_text(), "changed");
        assert_eq!(grid.active_cell(), Some(CellAddress::new(0, 1)));
    }

    #[test]
    fn escape_cancels_without_callback() {
        let mut grid = controller(20);
        let mut host = Recorder::default();
        grid.set_active_cell(CellAddress::new(0, 0), &mut host);
        grid.key_down(&KeyInput::new("x"), &mut host);
        assert_eq!(grid.editing().unwrap().draft, "x");
        assert!(grid.key_down(&KeyInput::new("Escape"), &mut host));
        assert!(grid.editing().is_none());
        assert!(host.edits.is_empty());
    }

    #[test]
    fn unchanged_commit_is_silent() {
        let mut grid = controller(20);
        let mut host = Recorder::default();
        grid.set_active_cell(CellAddress::new(0, 0), &mut host);
        grid.begin_edit(&mut host);
        assert!(!grid.commit_edit(&mut host));
        assert!(host.edits.is_empty());
        assert!(!grid.commit_edit(&mut host));
    }

    #[test]
    fn clicking_elsewhere_commits_edit() {
        let mut grid = controller(20);
        let mut host = Recorder::default();
        grid.set_active_cell(CellAddress::new(0, 0), &mut host);
        grid.begin_typing("z", &mut host);
        click(&mut grid, &mut host, 2, 2);
        assert_eq!(host.edits.len(), 1);
        assert_eq!(grid.active_cell(), Some(CellAddress::new(2, 2)));
    }

    #[test]
    fn space_toggles_boolean_in_place() {
        let mut grid = controller(20);
        let mut host = Recorder::default();
        host.cells
            .insert(CellAddress::new(0, 0), CellContent::boolean(false));
        grid.set_active_cell(CellAddress::new(0, 0), &mut host);
        assert!(grid.key_down(&KeyInput::new(" "), &mut host));
        assert!(grid.editing().is_none());
        assert_eq!(
            host.edits[0].1.value,
            CellValue::Boolean { data: Some(true) }
        );
    }

    #[test]
    fn column_header_drag_reorders() {
        let mut grid = controller(20);
        let mut host = Recorder::default();
        grid.pointer_down(PointerInput::primary(50.0, 20.0), &mut host);
        assert_eq!(
            grid.record_region(),
            SelectionRegion::Columns(vec![IndexRange::single(0)])
        );
        grid.pointer_move(PointerInput::primary(260.0, 20.0));
        assert_eq!(grid.state(), InteractionState::Dragging);
        assert_eq!(grid.cursor(), "grabbing");
        grid.pointer_up(PointerInput::primary(260.0, 20.0), &mut host);
        assert_eq!(host.column_orders, vec![(vec![0], 3)]);
        assert_eq!(grid.state(), InteractionState::Idle);
    }

    #[test]
    fn dropping_column_onto_itself_is_ignored() {
        let mut grid = controller(20);
        let mut host = Recorder::default();
        grid.pointer_down(PointerInput::primary(50.0, 20.0), &mut host);
        grid.pointer_move(PointerInput::primary(120.0, 20.0));
        grid.pointer_up(PointerInput::primary(120.0, 20.0), &mut host);
        assert!(host.column_orders.is_empty());
    }

    #[test]
    fn small_header_moves_do_not_start_drag() {
        let mut grid = controller(20);
        let mut host = Recorder::default();
        grid.pointer_down(PointerInput::primary(50.0, 20.0), &mut host);
        grid.pointer_move(PointerInput::primary(53.0, 22.0));
        assert_ne!(grid.state(), InteractionState::Dragging);
        grid.pointer_up(PointerInput::primary(53.0, 22.0), &mut host);
        assert!(host.column_orders.is_empty());
    }

    #[test]
    fn column_drag_released_outside_header_is_cancelled() {
        let mut grid = controller(20);
        let mut host = Recorder::default();
        grid.pointer_down(PointerInput::primary(50.0, 20.0), &mut host);
        grid.pointer_move(PointerInput::primary(260.0, 20.0));
        grid.pointer_move(PointerInput::primary(260.0, 300.0));
        assert!(matches!(
            grid.drag(),
            Some(DragState::Reorder { drop: None, .. })
        ));
        assert_eq!(grid.state(), InteractionState::Dragging);
        grid.pointer_up(PointerInput::primary(260.0, 300.0), &mut host);
        assert!(host.column_orders.is_empty());
        assert_eq!(grid.state(), InteractionState::Idle);
    }

    #[test]
    fn row_reorder_reports_record_rows() {
        let mut grid = controller(20);
        let mut host = Recorder::default();
        grid.set_group_points(
            vec![
                GroupPoint::group("a", 0, "A"),
                GroupPoint::rows(3),
                GroupPoint::group("b", 0, "B"),
                GroupPoint::rows(3),
            ],
            &mut host,
        );
        grid.set_config(GridConfig {
            row_header_width: 60.0,
            ..GridConfig::default()
        });
        // Display row 1 (y 80..112) is record 0. Group headers are 40px, so
        // display row 5 (record 3) spans y 216..248; its lower half drops
        // before record 4.
        grid.pointer_down(PointerInput::primary(40.0, 88.0), &mut host);
        let y = 240.0;
        grid.pointer_move(PointerInput::primary(40.0, y));
        grid.pointer_up(PointerInput::primary(40.0, y), &mut host);
        assert_eq!(host.row_orders, vec![(vec![0], 4)]);
    }

    #[test]
    fn resize_commits_on_release() {
        let mut grid = controller(20);
        let mut host = Recorder::default();
        grid.pointer_down(PointerInput::primary(98.0, 20.0), &mut host);
        assert_eq!(grid.cursor(), "col-resize");
        grid.pointer_move(PointerInput::primary(148.0, 20.0));
        assert_eq!(grid.layout().column_width(0), 150.0);
        grid.pointer_up(PointerInput::primary(148.0, 20.0), &mut host);
        assert_eq!(host.resizes, vec![(100.0, 150.0, 0)]);
        assert_eq!(grid.columns()[0].width, 150.0);
    }

    #[test]
    fn resize_never_goes_below_minimum() {
        let mut grid = controller(20);
        let mut host = Recorder::default();
        grid.pointer_down(PointerInput::primary(98.0, 20.0), &mut host);
        grid.pointer_move(PointerInput::primary(5.0, 20.0));
        assert_eq!(grid.layout().column_width(0), MIN_COLUMN_WIDTH);
        assert!(grid.key_down(&KeyInput::new("Escape"), &mut host));
        assert_eq!(grid.layout().column_width(0), 100.0);
        grid.pointer_up(PointerInput::primary(5.0, 20.0), &mut host);
        assert!(host.resizes.is_empty());
    }

    #[test]
    fn freeze_drag_reports_new_count() {
        let mut grid = controller(20);
        let mut host = Recorder::default();
        grid.pointer_down(PointerInput::primary(1.0, 100.0), &mut host);
        grid.pointer_move(PointerInput::primary(160.0, 100.0));
        grid.pointer_up(PointerInput::primary(160.0, 100.0), &mut host);
        assert_eq!(host.freezes, vec![2]);
        assert_eq!(grid.layout().frozen_cols, 2);
    }

    #[test]
    fn group_toggle_drops_hidden_active_cell() {
        let mut grid = controller(0);
        let mut host = Recorder::default();
        grid.set_group_points(
            vec![
                GroupPoint::group("a", 0, "A"),
                GroupPoint::rows(2),
                GroupPoint::group("b", 0, "B"),
                GroupPoint::rows(2),
            ],
            &mut host,
        );
        click(&mut grid, &mut host, 1, 1);
        assert_eq!(grid.active_cell(), Some(CellAddress::new(1, 0)));

        let (x, y) = center(1, 0);
        grid.pointer_down(PointerInput::primary(x, y), &mut host);
        assert_eq!(host.collapsed.last().unwrap().len(), 1);
        assert_eq!(grid.active_cell(), None);
        assert_eq!(grid.get_cell_bounds(CellAddress::new(0, 0)), None);
        let bounds = grid.get_cell_bounds(CellAddress::new(0, 2)).unwrap();
        // Two 40px group headers above it.
        assert_eq!(bounds.y, 120.0);
    }

    #[test]
    fn collapsed_flags_seed_collapsed_set() {
        let mut grid = controller(0);
        let mut host = Recorder::default();
        grid.set_group_points(
            vec![
                GroupPoint::Group {
                    id: "a".into(),
                    depth: 0,
                    value: None,
                    is_collapsed: true,
                },
                GroupPoint::rows(4),
            ],
            &mut host,
        );
        assert!(grid.collapsed_groups().contains("a"));
        assert_eq!(grid.layout().row_count(), 1);
    }

    #[test]
    fn copy_serializes_selection() {
        let mut grid = controller(20);
        let mut host = Recorder::default();
        click(&mut grid, &mut host, 0, 0);
        let (x, y) = center(1, 1);
        grid.pointer_down(PointerInput::primary(x, y).with_shift(), &mut host);
        assert!(grid.key_down(&KeyInput::new("c").with_ctrl(), &mut host));
        assert_eq!(host.copies, vec!["0:0\t1:0\n0:1\t1:1".to_string()]);
    }

    #[test]
    fn delete_uses_active_cell_without_selection() {
        let mut grid = controller(20);
        let mut host = Recorder::default();
        assert!(!grid.key_down(&KeyInput::new("Delete"), &mut host));
        grid.set_active_cell(CellAddress::new(2, 3), &mut host);
        assert!(grid.key_down(&KeyInput::new("Delete"), &mut host));
        assert_eq!(host.deletes, vec![cells((2, 3), (2, 3))]);
    }

    #[test]
    fn right_click_opens_record_menu() {
        let mut grid = controller(20);
        let mut host = Recorder::default();
        let (x, y) = center(2, 5);
        grid.pointer_down(PointerInput::secondary(x, y), &mut host);
        let MenuState::Record(menu) = grid.menus() else {
            panic!("expected record menu");
        };
        assert_eq!((menu.row, menu.column), (5, Some(2)));
        assert!(grid.key_down(&KeyInput::new("Escape"), &mut host));
        assert!(!grid.menus().is_open());
    }

    #[test]
    fn cell_indices_at_position_use_record_rows() {
        let mut grid = controller(0);
        let mut host = Recorder::default();
        grid.set_group_points(
            vec![GroupPoint::group("a", 0, "A"), GroupPoint::rows(3)],
            &mut host,
        );
        let (x, y) = center(1, 2);
        assert_eq!(
            grid.get_cell_indices_at_position(x, y),
            Some(CellAddress::new(1, 1))
        );
        let (x, y) = center(1, 0);
        assert_eq!(grid.get_cell_indices_at_position(x, y), None);
    }

    #[test]
    fn reset_state_is_idempotent() {
        let mut grid = controller(100);
        let mut host = Recorder::default();
        grid.resize(800.0, 200.0);
        grid.set_active_cell(CellAddress::new(0, 50), &mut host);
        grid.scroll_to_item(CellAddress::new(0, 50), &mut host);
        grid.reset_state();
        grid.reset_state();
        assert_eq!(grid.active_cell(), None);
        assert!(grid.record_region().is_none());
        assert_eq!(grid.viewport().scroll_top, 0.0);
    }

    #[test]
    fn shrinking_records_drops_out_of_range_state() {
        let mut grid = controller(20);
        let mut host = Recorder::default();
        grid.set_active_cell(CellAddress::new(0, 15), &mut host);
        grid.set_record_count(10, &mut host);
        assert_eq!(grid.active_cell(), None);
    }

    #[test]
    fn record_region_skips_group_rows() {
        let points = vec![
            GroupPoint::group("a", 0, "A"),
            GroupPoint::rows(2),
            GroupPoint::group("b", 0, "B"),
            GroupPoint::rows(2),
        ];
        let rows = LinearRows::grouped(&points, &BTreeSet::new());
        let display = SelectionRegion::Rows(vec![IndexRange::new(0, 5)]);
        assert_eq!(
            to_record_region(&display, &rows),
            SelectionRegion::Rows(vec![IndexRange::new(0, 3)])
        );
    }
}

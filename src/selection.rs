//! Selection model: anchor/extend/union over cells, rows or columns.
//!
//! The model keeps the ranges committed by earlier modifier clicks apart
//! from the active range (anchor to current end), so extending never
//! disturbs the other ranges. [`SelectionModel::region`] merges everything
//! into a normalized [`SelectionRegion`] with no overlapping ranges.

use crate::types::{
    normalize_cell_ranges, normalize_ranges, CellAddress, CellRange, IndexRange, SelectableType,
    SelectionKind, SelectionRegion,
};

/// A point a selection can start from or extend to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionTarget {
    Cell(CellAddress),
    Row(u32),
    Column(u32),
}

impl SelectionTarget {
    pub fn kind(&self) -> SelectionKind {
        match self {
            SelectionTarget::Cell(_) => SelectionKind::Cells,
            SelectionTarget::Row(_) => SelectionKind::Rows,
            SelectionTarget::Column(_) => SelectionKind::Columns,
        }
    }
}

/// One range of a given kind, as passed to [`SelectionModel::add_range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionRange {
    Cells(CellRange),
    Rows(IndexRange),
    Columns(IndexRange),
}

impl SelectionRange {
    fn kind(&self) -> SelectionKind {
        match self {
            SelectionRange::Cells(_) => SelectionKind::Cells,
            SelectionRange::Rows(_) => SelectionKind::Rows,
            SelectionRange::Columns(_) => SelectionKind::Columns,
        }
    }

    fn between(anchor: SelectionTarget, end: SelectionTarget) -> Option<Self> {
        match (anchor, end) {
            (SelectionTarget::Cell(a), SelectionTarget::Cell(b)) => {
                Some(SelectionRange::Cells(CellRange::new(a, b)))
            }
            (SelectionTarget::Row(a), SelectionTarget::Row(b)) => {
                Some(SelectionRange::Rows(IndexRange::new(a, b)))
            }
            (SelectionTarget::Column(a), SelectionTarget::Column(b)) => {
                Some(SelectionRange::Columns(IndexRange::new(a, b)))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveRange {
    anchor: SelectionTarget,
    end: SelectionTarget,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionModel {
    kind: SelectionKind,
    /// Ranges from earlier modifier clicks, all of `kind`.
    committed: Vec<SelectionRange>,
    active: Option<ActiveRange>,
    col_count: u32,
    row_count: u32,
    selectable: SelectableType,
}

impl SelectionModel {
    pub fn new(col_count: u32, row_count: u32, selectable: SelectableType) -> Self {
        Self {
            col_count,
            row_count,
            selectable,
            ..Self::default()
        }
    }

    /// Update grid extents; existing ranges are clamped, and an empty grid clears.
    pub fn set_bounds(&mut self, col_count: u32, row_count: u32) {
        self.col_count = col_count;
        self.row_count = row_count;
        if self.is_grid_empty() {
            self.clear();
            return;
        }
        let committed = std::mem::take(&mut self.committed);
        self.committed = committed
            .into_iter()
            .filter_map(|r| self.clamp_range(r))
            .collect();
        self.active = self.active.and_then(|a| {
            Some(ActiveRange {
                anchor: self.clamp_target(a.anchor)?,
                end: self.clamp_target(a.end)?,
            })
        });
        if self.committed.is_empty() && self.active.is_none() {
            self.kind = SelectionKind::None;
        }
    }

    pub fn set_selectable(&mut self, selectable: SelectableType) {
        self.selectable = selectable;
        if !self.allows(self.kind) {
            self.clear();
        }
    }

    pub fn selectable(&self) -> SelectableType {
        self.selectable
    }

    pub fn clear(&mut self) {
        self.kind = SelectionKind::None;
        self.committed.clear();
        self.active = None;
    }

    pub fn kind(&self) -> SelectionKind {
        self.kind
    }

    pub fn is_empty(&self) -> bool {
        self.kind == SelectionKind::None
    }

    /// Where the active range started.
    pub fn anchor(&self) -> Option<SelectionTarget> {
        self.active.map(|a| a.anchor)
    }

    /// The moving end of the active range.
    pub fn focus(&self) -> Option<SelectionTarget> {
        self.active.map(|a| a.end)
    }

    /// Replace the whole selection with a single point at `anchor`.
    ///
    /// Switching kind (e.g. clicking a row header during a cell selection)
    /// goes through here. Returns false if the kind is not selectable or the
    /// grid is empty; the selection is then left as it was.
    pub fn start_selection(&mut self, anchor: SelectionTarget) -> bool {
        if !self.allows(anchor.kind()) {
            return false;
        }
        let Some(anchor) = self.clamp_target(anchor) else {
            return false;
        };
        self.kind = anchor.kind();
        self.committed.clear();
        self.active = Some(ActiveRange {
            anchor,
            end: anchor,
        });
        true
    }

    /// Move the active range's end to `target`, keeping other ranges.
    ///
    /// A target of another kind starts a fresh selection instead.
    pub fn extend_to(&mut self, target: SelectionTarget) -> bool {
        if target.kind() != self.kind || self.active.is_none() {
            return self.start_selection(target);
        }
        let Some(target) = self.clamp_target(target) else {
            return false;
        };
        if let Some(active) = self.active.as_mut() {
            active.end = target;
        }
        true
    }

    /// Union a range into the selection (modifier-click).
    ///
    /// The current active range is committed and `range` becomes the new
    /// active range. A range of another kind replaces the selection.
    pub fn add_range(&mut self, range: SelectionRange) -> bool {
        if !self.allows(range.kind()) {
            return false;
        }
        let Some(range) = self.clamp_range(range) else {
            return false;
        };
        if range.kind() != self.kind {
            self.clear();
            self.kind = range.kind();
        } else if let Some(active) = self.active.take() {
            if let Some(r) = SelectionRange::between(active.anchor, active.end) {
                self.committed.push(r);
            }
        }
        let (anchor, end) = match range {
            SelectionRange::Cells(r) => (
                SelectionTarget::Cell(CellAddress::new(r.cols.start, r.rows.start)),
                SelectionTarget::Cell(CellAddress::new(r.cols.end, r.rows.end)),
            ),
            SelectionRange::Rows(r) => (SelectionTarget::Row(r.start), SelectionTarget::Row(r.end)),
            SelectionRange::Columns(r) => (
                SelectionTarget::Column(r.start),
                SelectionTarget::Column(r.end),
            ),
        };
        self.active = Some(ActiveRange { anchor, end });
        true
    }

    /// Select every cell as one Cells range spanning the full extents.
    pub fn select_all(&mut self) -> bool {
        let (Some(last_col), Some(last_row)) =
            (self.col_count.checked_sub(1), self.row_count.checked_sub(1))
        else {
            return false;
        };
        if !self.start_selection(SelectionTarget::Cell(CellAddress::new(0, 0))) {
            return false;
        }
        self.extend_to(SelectionTarget::Cell(CellAddress::new(last_col, last_row)))
    }

    /// The normalized region: sorted, non-overlapping ranges.
    pub fn region(&self) -> SelectionRegion {
        if self.is_grid_empty() {
            return SelectionRegion::None;
        }
        let active = self
            .active
            .and_then(|a| SelectionRange::between(a.anchor, a.end));
        let all = self.committed.iter().copied().chain(active);
        match self.kind {
            SelectionKind::None => SelectionRegion::None,
            SelectionKind::Cells => SelectionRegion::Cells(normalize_cell_ranges(
                all.filter_map(|r| match r {
                    SelectionRange::Cells(c) => Some(c),
                    _ => None,
                })
                .collect(),
            )),
            SelectionKind::Rows => SelectionRegion::Rows(normalize_ranges(
                all.filter_map(|r| match r {
                    SelectionRange::Rows(r) => Some(r),
                    _ => None,
                })
                .collect(),
            )),
            SelectionKind::Columns => SelectionRegion::Columns(normalize_ranges(
                all.filter_map(|r| match r {
                    SelectionRange::Columns(r) => Some(r),
                    _ => None,
                })
                .collect(),
            )),
        }
    }

    fn is_grid_empty(&self) -> bool {
        self.row_count == 0 || self.col_count == 0
    }

    fn allows(&self, kind: SelectionKind) -> bool {
        match kind {
            SelectionKind::None => true,
            SelectionKind::Cells => self.selectable.allows_cells(),
            SelectionKind::Rows => self.selectable.allows_rows(),
            SelectionKind::Columns => self.selectable.allows_columns(),
        }
    }

    fn clamp_target(&self, target: SelectionTarget) -> Option<SelectionTarget> {
        let last_col = self.col_count.checked_sub(1)?;
        let last_row = self.row_count.checked_sub(1)?;
        Some(match target {
            SelectionTarget::Cell(a) => {
                SelectionTarget::Cell(CellAddress::new(a.col.min(last_col), a.row.min(last_row)))
            }
            SelectionTarget::Row(r) => SelectionTarget::Row(r.min(last_row)),
            SelectionTarget::Column(c) => SelectionTarget::Column(c.min(last_col)),
        })
    }

    fn clamp_range(&self, range: SelectionRange) -> Option<SelectionRange> {
        if self.is_grid_empty() {
            return None;
        }
        Some(match range {
            SelectionRange::Cells(r) => {
                SelectionRange::Cells(r.clamped(self.col_count, self.row_count)?)
            }
            SelectionRange::Rows(r) => SelectionRange::Rows(r.clamped(self.row_count)?),
            SelectionRange::Columns(r) => SelectionRange::Columns(r.clamped(self.col_count)?),
        })
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

    fn cell(col: u32, row: u32) -> SelectionTarget {
        SelectionTarget::Cell(CellAddress::new(col, row))
    }

    #[test]
    fn start_replaces_existing() {
        let mut m = SelectionModel::new(5, 10, SelectableType::All);
        m.start_selection(SelectionTarget::Row(3));
        m.start_selection(cell(1, 1));
        assert_eq!(
            m.region(),
            SelectionRegion::Cells(vec![CellRange::single(CellAddress::new(1, 1))])
        );
    }

    #[test]
    fn extend_keeps_committed_ranges() {
        let mut m = SelectionModel::new(5, 10, SelectableType::All);
        m.start_selection(SelectionTarget::Row(0));
        m.add_range(SelectionRange::Rows(IndexRange::single(5)));
        m.extend_to(SelectionTarget::Row(7));
        assert_eq!(
            m.region(),
            SelectionRegion::Rows(vec![IndexRange::single(0), IndexRange::new(5, 7)])
        );
        // Extending backwards past the anchor flips the active range.
        m.extend_to(SelectionTarget::Row(2));
        assert_eq!(
            m.region(),
            SelectionRegion::Rows(vec![IndexRange::single(0), IndexRange::new(2, 5)])
        );
    }

    #[test]
    fn selection_past_bounds_clamps() {
        let mut m = SelectionModel::new(3, 4, SelectableType::All);
        m.start_selection(cell(0, 0));
        m.extend_to(cell(10, 99));
        assert_eq!(
            m.region(),
            SelectionRegion::Cells(vec![CellRange::new(
                CellAddress::new(0, 0),
                CellAddress::new(2, 3)
            )])
        );
    }

    #[test]
    fn empty_grid_is_always_none() {
        let mut m = SelectionModel::new(3, 0, SelectableType::All);
        assert!(!m.start_selection(cell(0, 0)));
        assert!(!m.select_all());
        assert_eq!(m.region(), SelectionRegion::None);
    }

    #[test]
    fn shrinking_bounds_clamps_and_clears() {
        let mut m = SelectionModel::new(3, 10, SelectableType::All);
        m.start_selection(SelectionTarget::Row(8));
        m.set_bounds(3, 5);
        assert_eq!(m.region(), SelectionRegion::Rows(vec![IndexRange::single(4)]));
        m.set_bounds(3, 0);
        assert!(m.is_empty());
    }

    #[test]
    fn selectable_mode_gates_kinds() {
        let mut m = SelectionModel::new(3, 10, SelectableType::Row);
        assert!(!m.start_selection(cell(0, 0)));
        assert!(m.start_selection(SelectionTarget::Row(1)));
        m.set_selectable(SelectableType::Cell);
        assert!(m.is_empty());
    }

    #[test]
    fn select_all_spans_extents() {
        let mut m = SelectionModel::new(4, 6, SelectableType::All);
        assert!(m.select_all());
        assert_eq!(
            m.region(),
            SelectionRegion::Cells(vec![CellRange::new(
                CellAddress::new(0, 0),
                CellAddress::new(3, 5)
            )])
        );
    }
}

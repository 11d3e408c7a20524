use serde::{Deserialize, Serialize};

use super::CellAddress;

/// Inclusive `[start, end]` index range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexRange {
    pub start: u32,
    pub end: u32,
}

impl IndexRange {
    /// Build a range from two endpoints in any order.
    pub fn new(a: u32, b: u32) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn single(index: u32) -> Self {
        Self {
            start: index,
            end: index,
        }
    }

    /// Number of indices covered (always at least one).
    pub fn count(&self) -> u32 {
        self.end - self.start + 1
    }

    pub fn contains(&self, index: u32) -> bool {
        index >= self.start && index <= self.end
    }

    pub fn overlaps(&self, other: &IndexRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Clamp to `[0, count)`; `None` when `count == 0`.
    pub fn clamped(&self, count: u32) -> Option<Self> {
        let last = count.checked_sub(1)?;
        Some(Self {
            start: self.start.min(last),
            end: self.end.min(last),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }
}

/// Rectangular block of cells between two corners (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRange {
    pub cols: IndexRange,
    pub rows: IndexRange,
}

impl CellRange {
    pub fn new(a: CellAddress, b: CellAddress) -> Self {
        Self {
            cols: IndexRange::new(a.col, b.col),
            rows: IndexRange::new(a.row, b.row),
        }
    }

    pub fn single(address: CellAddress) -> Self {
        Self::new(address, address)
    }

    pub fn contains(&self, address: CellAddress) -> bool {
        self.cols.contains(address.col) && self.rows.contains(address.row)
    }

    pub fn overlaps(&self, other: &CellRange) -> bool {
        self.cols.overlaps(&other.cols) && self.rows.overlaps(&other.rows)
    }

    pub fn contains_range(&self, other: &CellRange) -> bool {
        self.cols.start <= other.cols.start
            && other.cols.end <= self.cols.end
            && self.rows.start <= other.rows.start
            && other.rows.end <= self.rows.end
    }

    /// The parts of `self` not covered by `other`, as disjoint rectangles:
    /// full-width bands above and below, then slivers left and right.
    pub fn subtract(&self, other: &CellRange) -> Vec<CellRange> {
        if !self.overlaps(other) {
            return vec![*self];
        }
        let mut pieces = Vec::with_capacity(4);
        if self.rows.start < other.rows.start {
            pieces.push(CellRange {
                cols: self.cols,
                rows: IndexRange::new(self.rows.start, other.rows.start - 1),
            });
        }
        if other.rows.end < self.rows.end {
            pieces.push(CellRange {
                cols: self.cols,
                rows: IndexRange::new(other.rows.end + 1, self.rows.end),
            });
        }
        let middle = IndexRange::new(
            self.rows.start.max(other.rows.start),
            self.rows.end.min(other.rows.end),
        );
        if self.cols.start < other.cols.start {
            pieces.push(CellRange {
                cols: IndexRange::new(self.cols.start, other.cols.start - 1),
                rows: middle,
            });
        }
        if other.cols.end < self.cols.end {
            pieces.push(CellRange {
                cols: IndexRange::new(other.cols.end + 1, self.cols.end),
                rows: middle,
            });
        }
        pieces
    }

    /// The union of two disjoint rectangles when it is itself a rectangle.
    fn joined(&self, other: &CellRange) -> Option<CellRange> {
        let touches = |a: &IndexRange, b: &IndexRange| {
            a.start <= b.end.saturating_add(1) && b.start <= a.end.saturating_add(1)
        };
        let span = |a: &IndexRange, b: &IndexRange| {
            IndexRange::new(a.start.min(b.start), a.end.max(b.end))
        };
        if self.cols == other.cols && touches(&self.rows, &other.rows) {
            Some(CellRange {
                cols: self.cols,
                rows: span(&self.rows, &other.rows),
            })
        } else if self.rows == other.rows && touches(&self.cols, &other.cols) {
            Some(CellRange {
                cols: span(&self.cols, &other.cols),
                rows: self.rows,
            })
        } else {
            None
        }
    }

    pub fn clamped(&self, col_count: u32, row_count: u32) -> Option<Self> {
        Some(Self {
            cols: self.cols.clamped(col_count)?,
            rows: self.rows.clamped(row_count)?,
        })
    }
}

/// Which kind of thing a selection covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionKind {
    #[default]
    None,
    Cells,
    Rows,
    Columns,
}

/// The current selection as a tagged union of non-overlapping ranges.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "ranges", rename_all = "camelCase")]
pub enum SelectionRegion {
    #[default]
    None,
    Cells(Vec<CellRange>),
    Rows(Vec<IndexRange>),
    Columns(Vec<IndexRange>),
}

/// Concrete addresses covered by a region, without duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionIndices {
    None,
    Cells(Vec<CellAddress>),
    Rows(Vec<u32>),
    Columns(Vec<u32>),
}

impl SelectionRegion {
    pub fn kind(&self) -> SelectionKind {
        match self {
            SelectionRegion::None => SelectionKind::None,
            SelectionRegion::Cells(_) => SelectionKind::Cells,
            SelectionRegion::Rows(_) => SelectionKind::Rows,
            SelectionRegion::Columns(_) => SelectionKind::Columns,
        }
    }

    pub fn is_none(&self) -> bool {
        match self {
            SelectionRegion::None => true,
            SelectionRegion::Cells(r) => r.is_empty(),
            SelectionRegion::Rows(r) | SelectionRegion::Columns(r) => r.is_empty(),
        }
    }

    /// True if the address is covered, whatever the region kind.
    pub fn contains(&self, address: CellAddress) -> bool {
        match self {
            SelectionRegion::None => false,
            SelectionRegion::Cells(ranges) => ranges.iter().any(|r| r.contains(address)),
            SelectionRegion::Rows(ranges) => ranges.iter().any(|r| r.contains(address.row)),
            SelectionRegion::Columns(ranges) => ranges.iter().any(|r| r.contains(address.col)),
        }
    }

    pub fn is_row_selected(&self, row: u32) -> bool {
        matches!(self, SelectionRegion::Rows(ranges) if ranges.iter().any(|r| r.contains(row)))
    }

    pub fn is_column_selected(&self, col: u32) -> bool {
        matches!(self, SelectionRegion::Columns(ranges) if ranges.iter().any(|r| r.contains(col)))
    }

    /// Expand to concrete addresses: rows/columns ascending, cells row-major.
    /// Overlapping ranges never produce the same address twice.
    pub fn to_indices(&self) -> SelectionIndices {
        match self {
            SelectionRegion::None => SelectionIndices::None,
            SelectionRegion::Rows(ranges) => SelectionIndices::Rows(expand_ranges(ranges)),
            SelectionRegion::Columns(ranges) => SelectionIndices::Columns(expand_ranges(ranges)),
            SelectionRegion::Cells(ranges) => {
                let mut cells: Vec<CellAddress> = ranges
                    .iter()
                    .flat_map(|r| {
                        r.rows
                            .iter()
                            .flat_map(move |row| r.cols.iter().map(move |col| (row, col)))
                    })
                    .map(|(row, col)| CellAddress::new(col, row))
                    .collect();
                cells.sort_by_key(|a| (a.row, a.col));
                cells.dedup();
                SelectionIndices::Cells(cells)
            }
        }
    }
}

fn expand_ranges(ranges: &[IndexRange]) -> Vec<u32> {
    let mut out: Vec<u32> = ranges.iter().flat_map(IndexRange::iter).collect();
    out.sort_unstable();
    out.dedup();
    out
}

/// Sort and coalesce overlapping or adjacent ranges.
pub fn normalize_ranges(mut ranges: Vec<IndexRange>) -> Vec<IndexRange> {
    if ranges.len() <= 1 {
        return ranges;
    }
    ranges.sort_by_key(|r| r.start);
    let mut merged: Vec<IndexRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        if let Some(last) = merged.last_mut() {
            if range.start <= last.end.saturating_add(1) {
                last.end = last.end.max(range.end);
                continue;
            }
        }
        merged.push(range);
    }
    merged
}

/// Rewrite cell rectangles as disjoint rectangles covering exactly the
/// same cells. Each range keeps only what earlier ranges did not cover, and
/// neighbours whose union is a rectangle are joined.
pub fn normalize_cell_ranges(ranges: Vec<CellRange>) -> Vec<CellRange> {
    let mut out: Vec<CellRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        out.retain(|existing| !range.contains_range(existing));
        let mut pieces = vec![range];
        for existing in &out {
            pieces = pieces
                .iter()
                .flat_map(|piece| piece.subtract(existing))
                .collect();
        }
        out.extend(pieces);
    }

    while let Some((i, j, joined)) = out.iter().enumerate().find_map(|(i, a)| {
        out.iter()
            .enumerate()
            .skip(i + 1)
            .find_map(|(j, b)| a.joined(b).map(|joined| (i, j, joined)))
    }) {
        out.swap_remove(j);
        out.swap_remove(i);
        out.push(joined);
    }
    out.sort_by_key(|r| (r.rows.start, r.cols.start));
    out
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

    #[test]
    fn index_range_normalizes_endpoints() {
        let r = IndexRange::new(7, 3);
        assert_eq!((r.start, r.end), (3, 7));
        assert_eq!(r.count(), 5);
    }

    #[test]
    fn clamped_to_empty_extent_is_none() {
        assert_eq!(IndexRange::new(0, 4).clamped(0), None);
        assert_eq!(IndexRange::new(2, 40).clamped(10), Some(IndexRange::new(2, 9)));
    }

    #[test]
    fn normalize_merges_overlap_and_adjacency() {
        let merged = normalize_ranges(vec![
            IndexRange::new(6, 8),
            IndexRange::new(2, 4),
            IndexRange::new(3, 5),
            IndexRange::new(10, 11),
        ]);
        assert_eq!(merged, vec![IndexRange::new(2, 8), IndexRange::new(10, 11)]);
    }

    fn cell_count(ranges: &[CellRange]) -> u32 {
        ranges.iter().map(|r| r.cols.count() * r.rows.count()).sum()
    }

    #[test]
    fn overlapping_cell_rects_keep_exact_coverage() {
        let a = CellRange::new(CellAddress::new(0, 0), CellAddress::new(1, 1));
        let b = CellRange::new(CellAddress::new(1, 1), CellAddress::new(2, 2));
        let merged = normalize_cell_ranges(vec![a, b]);

        assert_eq!(cell_count(&merged), 7);
        let region = SelectionRegion::Cells(merged);
        assert!(!region.contains(CellAddress::new(2, 0)));
        assert!(!region.contains(CellAddress::new(0, 2)));
        let SelectionIndices::Cells(cells) = region.to_indices() else {
            panic!("expected cells");
        };
        assert_eq!(cells.len(), 7);
    }

    #[test]
    fn contained_and_edge_sharing_rects_join() {
        let big = CellRange::new(CellAddress::new(0, 0), CellAddress::new(3, 3));
        let inner = CellRange::single(CellAddress::new(1, 1));
        assert_eq!(normalize_cell_ranges(vec![inner, big]), vec![big]);
        assert_eq!(normalize_cell_ranges(vec![big, inner]), vec![big]);

        let left = CellRange::new(CellAddress::new(0, 0), CellAddress::new(1, 2));
        let right = CellRange::new(CellAddress::new(2, 0), CellAddress::new(4, 2));
        assert_eq!(
            normalize_cell_ranges(vec![right, left]),
            vec![CellRange::new(CellAddress::new(0, 0), CellAddress::new(4, 2))]
        );
    }

    #[test]
    fn normalized_cell_ranges_are_disjoint() {
        let merged = normalize_cell_ranges(vec![
            CellRange::new(CellAddress::new(0, 0), CellAddress::new(3, 3)),
            CellRange::new(CellAddress::new(2, 2), CellAddress::new(5, 5)),
            CellRange::new(CellAddress::new(4, 0), CellAddress::new(6, 2)),
            CellRange::single(CellAddress::new(9, 9)),
        ]);
        for (i, a) in merged.iter().enumerate() {
            for b in merged.iter().skip(i + 1) {
                assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
            }
        }
        // 16 + 16 - 4 + 9 - 2 + 1
        assert_eq!(cell_count(&merged), 36);
    }

    #[test]
    fn region_serializes_with_type_tag() {
        let region = SelectionRegion::Rows(vec![IndexRange::new(1, 2)]);
        let json = serde_json::to_string(&region).unwrap();
        assert_eq!(json, r#"{"type":"rows","ranges":[{"start":1,"end":2}]}"#);
    }
}

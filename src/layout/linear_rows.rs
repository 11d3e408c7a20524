//! Flat display-row space built from the host's group points.
//!
//! Display rows interleave group headers with record rows. The mapping is
//! stored as a run-length segment table with prefix starts, so both
//! directions (display -> record, record -> display) are binary searches
//! instead of scans over the group sequence.

use std::collections::BTreeSet;

use crate::types::{GroupPoint, IndexRange};

/// A group header as it appears in display-row space.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupHeader {
    pub id: String,
    pub depth: u32,
    pub value: Option<String>,
    pub collapsed: bool,
}

/// What a display row is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinearRow<'a> {
    Group(&'a GroupHeader),
    /// A host record, by record-row index.
    Record(u32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SegmentKind {
    Group(usize),
    Records { record_start: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Segment {
    linear_start: u32,
    len: u32,
    kind: SegmentKind,
}

/// Display-row index space.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRows {
    segments: Vec<Segment>,
    /// Indices into `segments` of record runs, ascending by record start.
    record_segments: Vec<usize>,
    groups: Vec<GroupHeader>,
    len: u32,
    /// Records in the host's ordering, hidden ones included.
    record_total: u32,
}

impl Default for LinearRows {
    fn default() -> Self {
        Self::ungrouped(0)
    }
}

impl LinearRows {
    /// One record per display row.
    pub fn ungrouped(row_count: u32) -> Self {
        let mut rows = Self {
            segments: Vec::new(),
            record_segments: Vec::new(),
            groups: Vec::new(),
            len: 0,
            record_total: row_count,
        };
        rows.push_records(0, row_count);
        rows
    }

    /// Linearize `points`, hiding everything under a collapsed group.
    ///
    /// A group is collapsed if the point says so or its id is in `collapsed`.
    /// Record indices keep counting through hidden runs so they stay aligned
    /// with the host's record ordering.
    pub fn grouped(points: &[GroupPoint], collapsed: &BTreeSet<String>) -> Self {
        let mut rows = Self {
            segments: Vec::new(),
            record_segments: Vec::new(),
            groups: Vec::new(),
            len: 0,
            record_total: 0,
        };
        let mut record_cursor: u32 = 0;
        let mut hidden_depth: Option<u32> = None;

        for point in points {
            match point {
                GroupPoint::Group {
                    id,
                    depth,
                    value,
                    is_collapsed,
                } => {
                    if hidden_depth.is_some_and(|d| *depth <= d) {
                        hidden_depth = None;
                    }
                    if hidden_depth.is_some() {
                        continue;
                    }
                    let is_collapsed = *is_collapsed || collapsed.contains(id);
                    rows.groups.push(GroupHeader {
                        id: id.clone(),
                        depth: *depth,
                        value: value.clone(),
                        collapsed: is_collapsed,
                    });
                    rows.segments.push(Segment {
                        linear_start: rows.len,
                        len: 1,
                        kind: SegmentKind::Group(rows.groups.len() - 1),
                    });
                    rows.len += 1;
                    if is_collapsed {
                        hidden_depth = Some(*depth);
                    }
                }
                GroupPoint::Row { count } => {
                    if hidden_depth.is_none() {
                        rows.push_records(record_cursor, *count);
                    }
                    record_cursor = record_cursor.saturating_add(*count);
                }
            }
        }
        rows.record_total = record_cursor;
        rows
    }

    fn push_records(&mut self, record_start: u32, count: u32) {
        if count == 0 {
            return;
        }
        self.segments.push(Segment {
            linear_start: self.len,
            len: count,
            kind: SegmentKind::Records { record_start },
        });
        self.record_segments.push(self.segments.len() - 1);
        self.len += count;
    }

    /// Number of display rows.
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of host records, including those under collapsed groups.
    pub fn record_count(&self) -> u32 {
        self.record_total
    }

    pub fn has_groups(&self) -> bool {
        !self.groups.is_empty()
    }

    pub fn groups(&self) -> &[GroupHeader] {
        &self.groups
    }

    fn segment_at(&self, linear: u32) -> Option<&Segment> {
        if linear >= self.len {
            return None;
        }
        let idx = self
            .segments
            .partition_point(|s| s.linear_start <= linear)
            .checked_sub(1)?;
        self.segments.get(idx)
    }

    pub fn get(&self, linear: u32) -> Option<LinearRow<'_>> {
        let segment = self.segment_at(linear)?;
        match segment.kind {
            SegmentKind::Group(idx) => self.groups.get(idx).map(LinearRow::Group),
            SegmentKind::Records { record_start } => Some(LinearRow::Record(
                record_start + (linear - segment.linear_start),
            )),
        }
    }

    pub fn is_group(&self, linear: u32) -> bool {
        matches!(self.get(linear), Some(LinearRow::Group(_)))
    }

    /// Record index shown at a display row (`None` for group headers).
    pub fn record_index(&self, linear: u32) -> Option<u32> {
        match self.get(linear)? {
            LinearRow::Record(record) => Some(record),
            LinearRow::Group(_) => None,
        }
    }

    /// Display row of a record (`None` if hidden by a collapsed group or absent).
    pub fn linear_index(&self, record: u32) -> Option<u32> {
        let pos = self
            .record_segments
            .partition_point(|&seg| {
                self.segments
                    .get(seg)
                    .is_some_and(|s| matches!(s.kind, SegmentKind::Records { record_start } if record_start <= record))
            })
            .checked_sub(1)?;
        let segment = self.segments.get(*self.record_segments.get(pos)?)?;
        let SegmentKind::Records { record_start } = segment.kind else {
            return None;
        };
        let offset = record - record_start;
        (offset < segment.len).then_some(segment.linear_start + offset)
    }

    /// First record shown at or below display row `linear`, if any.
    pub fn next_record_from(&self, linear: u32) -> Option<u32> {
        (linear..self.len).find_map(|l| self.record_index(l))
    }

    /// Display rows showing the records in `records`, as ascending runs.
    /// Records hidden under a collapsed group have no display row and are
    /// left out.
    pub fn display_ranges(&self, records: IndexRange) -> Vec<IndexRange> {
        let mut out: Vec<IndexRange> = Vec::new();
        for segment in self.record_segments.iter().filter_map(|&i| self.segments.get(i)) {
            let SegmentKind::Records { record_start } = segment.kind else {
                continue;
            };
            if record_start > records.end {
                break;
            }
            let lo = records.start.max(record_start);
            let hi = records.end.min(record_start + segment.len - 1);
            if lo > hi {
                continue;
            }
            let run = IndexRange::new(
                segment.linear_start + (lo - record_start),
                segment.linear_start + (hi - record_start),
            );
            match out.last_mut() {
                Some(last) if run.start <= last.end.saturating_add(1) => {
                    last.end = last.end.max(run.end);
                }
                _ => out.push(run),
            }
        }
        out
    }

    /// Record rows covered by a display-row range, as ascending coalesced runs.
    pub fn record_ranges(&self, range: IndexRange) -> Vec<IndexRange> {
        let mut out: Vec<IndexRange> = Vec::new();
        let first = self
            .segments
            .partition_point(|s| s.linear_start <= range.start)
            .saturating_sub(1);
        for segment in self.segments.iter().skip(first) {
            if segment.linear_start > range.end {
                break;
            }
            let SegmentKind::Records { record_start } = segment.kind else {
                continue;
            };
            let seg_end = segment.linear_start + segment.len - 1;
            let lo = range.start.max(segment.linear_start);
            let hi = range.end.min(seg_end);
            if lo > hi {
                continue;
            }
            let run = IndexRange::new(
                record_start + (lo - segment.linear_start),
                record_start + (hi - segment.linear_start),
            );
            match out.last_mut() {
                Some(last) if run.start <= last.end.saturating_add(1) => {
                    last.end = last.end.max(run.end);
                }
                _ => out.push(run),
            }
        }
        out
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

    fn two_groups() -> Vec<GroupPoint> {
        vec![
            GroupPoint::group("g-todo", 0, "TODO"),
            GroupPoint::rows(3),
            GroupPoint::group("g-done", 0, "DONE"),
            GroupPoint::rows(2),
        ]
    }

    #[test]
    fn ungrouped_is_identity() {
        let rows = LinearRows::ungrouped(5);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows.record_index(3), Some(3));
        assert_eq!(rows.linear_index(4), Some(4));
        assert_eq!(rows.record_index(5), None);
    }

    #[test]
    fn grouped_interleaves_headers() {
        let rows = LinearRows::grouped(&two_groups(), &BTreeSet::new());
        assert_eq!(rows.len(), 7);
        assert!(rows.is_group(0));
        assert_eq!(rows.record_index(1), Some(0));
        assert_eq!(rows.record_index(3), Some(2));
        assert!(rows.is_group(4));
        assert_eq!(rows.record_index(5), Some(3));
        assert_eq!(rows.linear_index(3), Some(5));
    }

    #[test]
    fn collapsed_group_hides_rows_but_keeps_record_numbering() {
        let collapsed: BTreeSet<String> = ["g-todo".to_string()].into_iter().collect();
        let rows = LinearRows::grouped(&two_groups(), &collapsed);
        assert_eq!(rows.len(), 4);
        assert!(rows.is_group(0));
        assert!(rows.is_group(1));
        assert_eq!(rows.record_index(2), Some(3));
        assert_eq!(rows.linear_index(0), None);
    }

    #[test]
    fn collapsing_outer_group_hides_nested_headers() {
        let points = vec![
            GroupPoint::group("a", 0, "A"),
            GroupPoint::group("a1", 1, "A1"),
            GroupPoint::rows(2),
            GroupPoint::group("b", 0, "B"),
            GroupPoint::rows(1),
        ];
        let collapsed: BTreeSet<String> = ["a".to_string()].into_iter().collect();
        let rows = LinearRows::grouped(&points, &collapsed);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows.record_index(2), Some(2));
    }

    #[test]
    fn record_ranges_skip_headers() {
        let rows = LinearRows::grouped(&two_groups(), &BTreeSet::new());
        let runs = rows.record_ranges(IndexRange::new(0, 6));
        assert_eq!(runs, vec![IndexRange::new(0, 4)]);
        let runs = rows.record_ranges(IndexRange::new(2, 5));
        assert_eq!(runs, vec![IndexRange::new(1, 3)]);
    }

    #[test]
    fn record_count_includes_hidden_records() {
        let collapsed: BTreeSet<String> = ["g-todo".to_string()].into_iter().collect();
        let rows = LinearRows::grouped(&two_groups(), &collapsed);
        assert_eq!(rows.record_count(), 5);
        assert_eq!(rows.next_record_from(0), Some(3));
        assert_eq!(rows.next_record_from(4), None);
    }

    #[test]
    fn display_ranges_split_at_headers_and_skip_hidden() {
        let rows = LinearRows::grouped(&two_groups(), &BTreeSet::new());
        assert_eq!(
            rows.display_ranges(IndexRange::new(0, 4)),
            vec![IndexRange::new(1, 3), IndexRange::new(5, 6)]
        );

        let collapsed: BTreeSet<String> = ["g-todo".to_string()].into_iter().collect();
        let rows = LinearRows::grouped(&two_groups(), &collapsed);
        assert_eq!(rows.display_ranges(IndexRange::new(1, 3)), vec![IndexRange::single(2)]);
        assert!(rows.display_ranges(IndexRange::new(0, 2)).is_empty());
    }
}

//! Clipboard serialization of a selection.
//!
//! Copies produce tab-separated text built from each cell's display text,
//! the way spreadsheets put ranges on the clipboard.

use crate::host::GridHost;
use crate::layout::LinearRows;
use crate::types::{CellAddress, SelectionRegion};

/// Escape a cell value for TSV/clipboard format
/// If the value contains tabs, newlines, or quotes, wrap in quotes and escape internal quotes
pub fn escape_cell_value(value: &str) -> String {
    let needs_quoting = value.contains('\t')
        || value.contains('\n')
        || value.contains('\r')
        || value.contains('"');

    if needs_quoting {
        let escaped = value.replace('"', "\"\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}

/// TSV for a selection region given in display rows.
///
/// Rows cover every column and columns cover every row. Group header rows
/// are skipped. Disjoint ranges are written one after another.
pub fn region_to_tsv(
    region: &SelectionRegion,
    rows: &LinearRows,
    col_count: u32,
    host: &dyn GridHost,
) -> String {
    let Some(last_col) = col_count.checked_sub(1) else {
        return String::new();
    };
    let blocks: Vec<(u32, u32, u32, u32)> = match region {
        SelectionRegion::None => Vec::new(),
        SelectionRegion::Cells(ranges) => ranges
            .iter()
            .map(|r| (r.cols.start, r.cols.end, r.rows.start, r.rows.end))
            .collect(),
        SelectionRegion::Rows(ranges) => ranges
            .iter()
            .map(|r| (0, last_col, r.start, r.end))
            .collect(),
        SelectionRegion::Columns(ranges) => match rows.len().checked_sub(1) {
            Some(last_row) => ranges.iter().map(|r| (r.start, r.end, 0, last_row)).collect(),
            None => Vec::new(),
        },
    };

    let mut lines = Vec::new();
    for (min_col, max_col, min_row, max_row) in blocks {
        for row in min_row..=max_row {
            let Some(record) = rows.record_index(row) else {
                continue;
            };
            let line: Vec<String> = (min_col..=max_col.min(last_col))
                .map(|col| {
                    let content = host.cell_content(CellAddress::new(col, record));
                    escape_cell_value(&content.value.display_text())
                })
                .collect();
            lines.push(line.join("\t"));
        }
    }
    lines.join("\n")
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
    use crate::types::{CellContent, CellRange, IndexRange};

    struct Letters;

    impl GridHost for Letters {
        fn cell_content(&self, address: CellAddress) -> CellContent {
            let letter = char::from(b'A' + u8::try_from(address.col).unwrap());
            CellContent::text(format!("{letter}{}", address.row))
        }
    }

    #[test]
    fn escapes_like_spreadsheets() {
        assert_eq!(escape_cell_value("plain"), "plain");
        assert_eq!(escape_cell_value("a\tb"), "\"a\tb\"");
        assert_eq!(escape_cell_value("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn cell_block_to_tsv() {
        let region = SelectionRegion::Cells(vec![CellRange {
            cols: IndexRange::new(0, 1),
            rows: IndexRange::new(2, 3),
        }]);
        let tsv = region_to_tsv(&region, &LinearRows::ungrouped(10), 3, &Letters);
        assert_eq!(tsv, "A2\tB2\nA3\tB3");
    }

    #[test]
    fn rows_span_all_columns() {
        let region = SelectionRegion::Rows(vec![IndexRange::single(1)]);
        let tsv = region_to_tsv(&region, &LinearRows::ungrouped(10), 3, &Letters);
        assert_eq!(tsv, "A1\tB1\tC1");
    }
}

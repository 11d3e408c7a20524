//! Selection tests
//!
//! Range unions and their expansion to concrete indices, both on the
//! selection model directly and through pointer/keyboard input.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::*;
use gridcanvas::controller::{KeyInput, PointerInput};
use gridcanvas::selection::{SelectionModel, SelectionRange, SelectionTarget};
use gridcanvas::{
    CellAddress, CellRange, GridConfig, IndexRange, SelectableType, SelectionIndices,
    SelectionRegion,
};

fn cells(a: (u32, u32), b: (u32, u32)) -> SelectionRange {
    SelectionRange::Cells(CellRange::new(
        CellAddress::new(a.0, a.1),
        CellAddress::new(b.0, b.1),
    ))
}

#[test]
fn overlapping_cell_ranges_expand_without_duplicates() {
    let mut model = SelectionModel::new(10, 10, SelectableType::All);
    model.add_range(cells((0, 0), (3, 3)));
    model.add_range(cells((2, 2), (5, 5)));
    model.add_range(cells((1, 1), (1, 1)));
    model.add_range(cells((4, 0), (6, 2)));

    let SelectionIndices::Cells(addresses) = model.region().to_indices() else {
        panic!("expected cells");
    };
    let mut unique = addresses.clone();
    unique.sort_by_key(|a| (a.row, a.col));
    unique.dedup();
    assert_eq!(addresses.len(), unique.len());
    assert!(addresses.contains(&CellAddress::new(5, 5)));
    assert!(addresses.contains(&CellAddress::new(6, 0)));
    assert!(!addresses.contains(&CellAddress::new(9, 9)));
}

#[test]
fn overlapping_row_ranges_merge() {
    let mut model = SelectionModel::new(4, 20, SelectableType::All);
    model.add_range(SelectionRange::Rows(IndexRange::new(2, 6)));
    model.add_range(SelectionRange::Rows(IndexRange::new(4, 9)));
    model.add_range(SelectionRange::Rows(IndexRange::new(10, 11)));

    assert_eq!(
        model.region(),
        SelectionRegion::Rows(vec![IndexRange::new(2, 11)])
    );
    let SelectionIndices::Rows(rows) = model.region().to_indices() else {
        panic!("expected rows");
    };
    assert_eq!(rows, (2..=11).collect::<Vec<_>>());
}

#[test]
fn row_union_expands_in_ascending_order() {
    let mut model = SelectionModel::new(4, 20, SelectableType::All);
    model.start_selection(SelectionTarget::Row(2));
    model.extend_to(SelectionTarget::Row(4));
    model.add_range(SelectionRange::Rows(IndexRange::new(6, 8)));

    assert_eq!(
        model.region().to_indices(),
        SelectionIndices::Rows(vec![2, 3, 4, 6, 7, 8])
    );
}

#[test]
fn row_union_through_row_headers() {
    let config = GridConfig {
        row_header_width: 60.0,
        ..GridConfig::default()
    };
    let mut controller = grid_with(4, 20, 800.0, 800.0, config);
    let mut host = RecordingHost::new();
    let row_y = |row: u32| 40.0 + 32.0 * row as f32 + 16.0;

    click(&mut controller, &mut host, PointerInput::primary(40.0, row_y(2)));
    click(
        &mut controller,
        &mut host,
        PointerInput::primary(40.0, row_y(4)).with_shift(),
    );
    click(
        &mut controller,
        &mut host,
        PointerInput::primary(40.0, row_y(6)).with_ctrl(),
    );
    click(
        &mut controller,
        &mut host,
        PointerInput::primary(40.0, row_y(8)).with_shift(),
    );

    let region = controller.record_region();
    assert_eq!(
        region.to_indices(),
        SelectionIndices::Rows(vec![2, 3, 4, 6, 7, 8])
    );
    assert_eq!(host.last_selection(), Some(&region));
    assert!(host.row_orders.is_empty());
}

#[test]
fn column_union_through_headers() {
    let mut controller = grid(6, 10, 800.0, 600.0);
    let mut host = RecordingHost::new();

    click(&mut controller, &mut host, PointerInput::primary(50.0, 20.0));
    click(
        &mut controller,
        &mut host,
        PointerInput::primary(350.0, 20.0).with_ctrl(),
    );

    assert_eq!(
        controller.record_region(),
        SelectionRegion::Columns(vec![IndexRange::single(0), IndexRange::single(3)])
    );
    assert_eq!(host.header_clicks, vec![0, 3]);
    assert!(host.column_orders.is_empty());
}

#[test]
fn selection_kind_switch_replaces_previous_ranges() {
    let mut model = SelectionModel::new(5, 5, SelectableType::All);
    model.add_range(cells((0, 0), (1, 1)));
    model.add_range(SelectionRange::Columns(IndexRange::single(3)));

    assert_eq!(
        model.region(),
        SelectionRegion::Columns(vec![IndexRange::single(3)])
    );
}

#[test]
fn selectable_rows_only_ignores_cell_clicks() {
    let config = GridConfig {
        selectable: SelectableType::Row,
        ..GridConfig::default()
    };
    let mut controller = grid_with(3, 10, 800.0, 600.0, config);
    let mut host = RecordingHost::new();

    click_cell(&mut controller, &mut host, 1, 1);

    assert!(controller.selection_region().is_none());
    assert!(host.selections.is_empty());
}

#[test]
fn select_all_key_and_corner_cover_full_extent() {
    let mut controller = grid(3, 4, 800.0, 600.0);
    let mut host = RecordingHost::new();
    click_cell(&mut controller, &mut host, 0, 0);

    assert!(controller.key_down(&KeyInput::new("a").with_ctrl(), &mut host));

    let expected = SelectionRegion::Cells(vec![CellRange::new(
        CellAddress::new(0, 0),
        CellAddress::new(2, 3),
    )]);
    assert_eq!(controller.record_region(), expected);

    let config = GridConfig {
        row_header_width: 40.0,
        ..GridConfig::default()
    };
    let mut with_corner = grid_with(3, 4, 800.0, 600.0, config);
    click(&mut with_corner, &mut host, PointerInput::primary(10.0, 10.0));
    assert_eq!(with_corner.record_region(), expected);
}

#[test]
fn grouped_selection_is_reported_in_record_rows() {
    let mut controller = grid(2, 4, 800.0, 600.0);
    let mut host = RecordingHost::new();
    controller.set_group_points(
        vec![
            gridcanvas::GroupPoint::group("g", 0, "G"),
            gridcanvas::GroupPoint::rows(4),
        ],
        &mut host,
    );

    click_cell(&mut controller, &mut host, 0, 1);
    let (x, y) = cell_center(&controller, 1, 3);
    click(&mut controller, &mut host, PointerInput::primary(x, y).with_shift());

    assert_eq!(
        host.last_selection(),
        Some(&SelectionRegion::Cells(vec![CellRange::new(
            CellAddress::new(0, 1),
            CellAddress::new(1, 3),
        )]))
    );
    assert_eq!(controller.active_cell(), Some(CellAddress::new(0, 1)));
}

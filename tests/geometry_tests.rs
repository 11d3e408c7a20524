//! Coordinate tests through the public controller API
//!
//! Cell rectangles, frozen columns, scroll-into-view and point lookup,
//! with and without grouped rows.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::*;
use gridcanvas::{CellAddress, GridConfig, GroupPoint, Rect};
use test_case::test_case;

fn frozen(count: u32) -> GridConfig {
    GridConfig {
        frozen_column_count: count,
        ..GridConfig::default()
    }
}

fn assert_inside(outer: &Rect, inner: &Rect, context: &str) {
    assert!(
        inner.x >= outer.x
            && inner.y >= outer.y
            && inner.right() <= outer.right() + 0.001
            && inner.bottom() <= outer.bottom() + 0.001,
        "{context}: {inner:?} not inside {outer:?}"
    );
}

#[test]
fn frozen_column_ignores_horizontal_scroll() {
    let mut controller = grid_with(3, 10, 200.0, 300.0, frozen(1));
    let mut host = RecordingHost::new();

    assert!(controller.scroll_to(50.0, 0.0, &mut host));

    let first = controller.get_cell_bounds(CellAddress::new(0, 0)).unwrap();
    let second = controller.get_cell_bounds(CellAddress::new(1, 0)).unwrap();
    assert_eq!(first.x, 0.0);
    assert_eq!(second.x, 50.0);
    assert_eq!(host.scrolls, vec![(50.0, 0.0)]);
}

#[test_case(0.0, 0.0 ; "origin")]
#[test_case(130.0, 0.0 ; "scrolled right")]
#[test_case(0.0, 700.0 ; "scrolled down")]
#[test_case(475.0, 2_000.0 ; "scrolled both")]
fn visible_cell_rects_stay_on_screen(scroll_left: f32, scroll_top: f32) {
    let mut controller = grid_with(12, 200, 640.0, 480.0, frozen(2));
    let mut host = RecordingHost::new();
    controller.scroll_to(scroll_left, scroll_top, &mut host);

    let layout = controller.layout();
    let viewport = *controller.viewport();
    let screen = Rect::new(0.0, 0.0, viewport.width, viewport.height);
    let rows = viewport.visible_rows(layout, 0).unwrap();
    let cols = viewport.visible_cols(layout, 0).unwrap();

    for row in rows.iter() {
        for col in (0..2).chain(cols.iter()) {
            let address = CellAddress::new(col, row);
            let rect = layout.cell_rect(address, &viewport).unwrap();
            assert!(rect.width >= 0.0 && rect.height >= 0.0);
            if let Some(visible) = layout.visible_cell_rect(address, &viewport) {
                assert_inside(&screen, &visible, &format!("{address:?}"));
                assert!(visible.y >= layout.header_height);
                if !layout.is_frozen(col) {
                    assert!(visible.x >= layout.frozen_divider_x());
                }
            }
        }
    }
}

#[test]
fn out_of_range_cells_have_no_bounds() {
    let controller = grid(3, 10, 800.0, 600.0);
    assert!(controller.get_cell_bounds(CellAddress::new(3, 0)).is_none());
    assert!(controller.get_cell_bounds(CellAddress::new(0, 10)).is_none());
}

#[test]
fn scroll_to_item_then_bounds_is_fully_visible() {
    let mut controller = grid_with(20, 500, 640.0, 480.0, frozen(1));
    let mut host = RecordingHost::new();

    for (col, row) in [(0, 0), (19, 499), (7, 250), (1, 0), (19, 0), (0, 499), (10, 37)] {
        let address = CellAddress::new(col, row);
        controller.scroll_to_item(address, &mut host);
        let rect = controller.get_cell_bounds(address).unwrap();
        let layout = controller.layout();
        let body = layout.body_rect(controller.viewport());
        assert_inside(&body, &rect, &format!("{address:?}"));
        if col > 0 {
            assert!(rect.x >= layout.frozen_divider_x(), "{address:?} under frozen band");
        }
    }
}

#[test]
fn scroll_to_item_moves_as_little_as_possible() {
    let mut controller = grid(5, 100, 800.0, 600.0);
    let mut host = RecordingHost::new();

    // Already visible: no scroll and no notification.
    assert!(!controller.scroll_to_item(CellAddress::new(2, 5), &mut host));
    assert!(host.scrolls.is_empty());

    // Bottom-aligns a row below the fold.
    controller.scroll_to_item(CellAddress::new(0, 40), &mut host);
    let rect = controller.get_cell_bounds(CellAddress::new(0, 40)).unwrap();
    assert_eq!(rect.bottom(), 600.0);
}

#[test]
fn point_lookup_round_trips_through_bounds() {
    let mut controller = grid(6, 50, 500.0, 400.0);
    let mut host = RecordingHost::new();
    controller.scroll_to(120.0, 300.0, &mut host);

    for (col, row) in [(1, 9), (2, 10), (4, 15)] {
        let (x, y) = cell_center(&controller, col, row);
        assert_eq!(
            controller.get_cell_indices_at_position(x, y),
            Some(CellAddress::new(col, row))
        );
    }
    // Header band is not a cell.
    assert_eq!(controller.get_cell_indices_at_position(250.0, 10.0), None);
}

#[test]
fn grouped_rows_translate_to_record_rows() {
    let mut controller = grid(3, 6, 800.0, 600.0);
    let mut host = RecordingHost::new();
    controller.set_group_points(
        vec![
            GroupPoint::group("a", 0, "A"),
            GroupPoint::rows(2),
            GroupPoint::group("b", 0, "B"),
            GroupPoint::rows(4),
        ],
        &mut host,
    );

    // Display: [A] r0 r1 [B] r2 r3 r4 r5 ; headers 40px, rows 32px.
    let r0 = controller.get_cell_bounds(CellAddress::new(0, 0)).unwrap();
    let r2 = controller.get_cell_bounds(CellAddress::new(0, 2)).unwrap();
    assert_eq!(r0.y, 40.0 + 40.0);
    assert_eq!(r2.y, 40.0 + 40.0 + 64.0 + 40.0);

    // A point on a group header is not a cell.
    assert_eq!(controller.get_cell_indices_at_position(150.0, 60.0), None);
    assert_eq!(
        controller.get_cell_indices_at_position(150.0, r2.y + 1.0),
        Some(CellAddress::new(1, 2))
    );
}

#[test]
fn collapsed_group_hides_its_records() {
    let mut controller = grid(3, 6, 800.0, 600.0);
    let mut host = RecordingHost::new();
    controller.set_group_points(
        vec![
            GroupPoint::group("a", 0, "A"),
            GroupPoint::rows(2),
            GroupPoint::group("b", 0, "B"),
            GroupPoint::rows(4),
        ],
        &mut host,
    );
    controller.set_collapsed_groups(["a".to_string()].into_iter().collect(), &mut host);

    assert!(controller.get_cell_bounds(CellAddress::new(0, 1)).is_none());
    let r2 = controller.get_cell_bounds(CellAddress::new(0, 2)).unwrap();
    assert_eq!(r2.y, 40.0 + 40.0 + 40.0);
}

#[test]
fn row_height_overrides_shift_following_rows() {
    let mut controller = grid(2, 10, 800.0, 600.0);
    controller.set_row_heights([(1, 80.0)].into_iter().collect());

    let r1 = controller.get_cell_bounds(CellAddress::new(0, 1)).unwrap();
    let r2 = controller.get_cell_bounds(CellAddress::new(0, 2)).unwrap();
    assert_eq!(r1.height, 80.0);
    assert_eq!(r2.y, r1.y + 80.0);
}

#[test]
fn resize_reclamps_scroll() {
    let mut controller = grid(10, 100, 400.0, 300.0);
    let mut host = RecordingHost::new();
    controller.scroll_to(10_000.0, 10_000.0, &mut host);
    let (max_x, max_y) = controller.viewport().max_scroll(controller.layout());
    assert_eq!(controller.viewport().scroll_left, max_x);
    assert_eq!(controller.viewport().scroll_top, max_y);

    controller.resize(2_000.0, 5_000.0);
    assert_eq!(controller.viewport().scroll_left, 0.0);
    assert_eq!(controller.viewport().scroll_top, 0.0);
}

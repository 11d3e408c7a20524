//! Interaction tests
//!
//! Pointer and keyboard flows through the controller: reset, navigation,
//! editing, header drags, grouping, clipboard and menus, checked via the
//! callbacks a host receives.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use std::collections::BTreeSet;

use common::*;
use gridcanvas::controller::menus::MenuState;
use gridcanvas::controller::{reorder, InteractionState, KeyInput, PointerInput};
use gridcanvas::{
    CellAddress, CellContent, CellRange, CellValue, GridConfig, GridController, GroupPoint,
    IndexRange, SelectionRegion,
};

fn key(controller: &mut GridController, host: &mut RecordingHost, name: &str) -> bool {
    controller.key_down(&KeyInput::new(name), host)
}

/// Everything `reset_state` is meant to restore.
fn snapshot(
    controller: &GridController,
) -> (SelectionRegion, Option<CellAddress>, f32, f32, InteractionState) {
    (
        controller.selection_region(),
        controller.active_cell(),
        controller.viewport().scroll_left,
        controller.viewport().scroll_top,
        controller.state(),
    )
}

// ============================================================================
// Reset and navigation
// ============================================================================

#[test]
fn reset_state_is_idempotent() {
    let mut controller = grid(8, 200, 500.0, 400.0);
    let mut host = RecordingHost::new();
    click_cell(&mut controller, &mut host, 2, 3);
    key(&mut controller, &mut host, "ArrowRight");
    controller.scroll_to(150.0, 900.0, &mut host);

    controller.reset_state();
    let once = snapshot(&controller);
    controller.reset_state();
    let twice = snapshot(&controller);

    assert_eq!(once, twice);
    assert_eq!(
        once,
        (SelectionRegion::None, None, 0.0, 0.0, InteractionState::Idle)
    );
}

#[test]
fn reset_state_drops_edit_without_commit() {
    let mut controller = grid(3, 10, 800.0, 600.0);
    let mut host = RecordingHost::new();
    click_cell(&mut controller, &mut host, 0, 0);
    key(&mut controller, &mut host, "q");
    assert_eq!(controller.state(), InteractionState::Editing);

    controller.reset_state();

    assert!(controller.editing().is_none());
    assert!(host.edits.is_empty());
}

#[test]
fn arrow_down_at_last_row_keeps_active_cell() {
    let mut controller = grid(3, 5, 800.0, 600.0);
    let mut host = RecordingHost::new();
    click_cell(&mut controller, &mut host, 1, 4);
    let reported = host.selections.len();

    assert!(key(&mut controller, &mut host, "ArrowDown"));

    assert_eq!(controller.active_cell(), Some(CellAddress::new(1, 4)));
    assert_eq!(host.selections.len(), reported);
}

#[test]
fn arrow_keys_clamp_at_every_edge() {
    let mut controller = grid(3, 5, 800.0, 600.0);
    let mut host = RecordingHost::new();
    click_cell(&mut controller, &mut host, 0, 0);

    key(&mut controller, &mut host, "ArrowUp");
    key(&mut controller, &mut host, "ArrowLeft");
    assert_eq!(controller.active_cell(), Some(CellAddress::new(0, 0)));

    for _ in 0..5 {
        key(&mut controller, &mut host, "ArrowRight");
    }
    assert_eq!(controller.active_cell(), Some(CellAddress::new(2, 0)));
}

#[test]
fn arrow_down_skips_group_headers() {
    let mut controller = grid(2, 4, 800.0, 600.0);
    let mut host = RecordingHost::new();
    controller.set_group_points(
        vec![
            GroupPoint::group("a", 0, "A"),
            GroupPoint::rows(2),
            GroupPoint::group("b", 0, "B"),
            GroupPoint::rows(2),
        ],
        &mut host,
    );
    click_cell(&mut controller, &mut host, 0, 1);

    key(&mut controller, &mut host, "ArrowDown");

    assert_eq!(controller.active_cell(), Some(CellAddress::new(0, 2)));
}

#[test]
fn navigation_scrolls_active_cell_into_view() {
    let mut controller = grid(3, 100, 800.0, 200.0);
    let mut host = RecordingHost::new();
    click_cell(&mut controller, &mut host, 0, 0);

    for _ in 0..10 {
        key(&mut controller, &mut host, "ArrowDown");
    }

    let rect = controller.get_cell_bounds(CellAddress::new(0, 10)).unwrap();
    assert!(rect.y >= 40.0 && rect.bottom() <= 200.0);
    assert!(!host.scrolls.is_empty());
}

// ============================================================================
// Editing
// ============================================================================

#[test]
fn type_to_edit_commits_wrapped_content() {
    let mut controller = grid(3, 10, 800.0, 600.0);
    let mut host = RecordingHost::new();
    click_cell(&mut controller, &mut host, 1, 2);

    assert!(key(&mut controller, &mut host, "h"));
    assert_eq!(controller.editing().unwrap().draft, "h");
    controller.set_draft("hello");
    assert!(key(&mut controller, &mut host, "Enter"));

    assert_eq!(host.edits.len(), 1);
    let (address, content) = &host.edits[0];
    assert_eq!(*address, CellAddress::new(1, 2));
    assert!(matches!(&content.value, CellValue::Text { data: Some(d), .. } if d == "hello"));
    assert_eq!(controller.active_cell(), Some(CellAddress::new(1, 3)));
    assert_eq!(controller.state(), InteractionState::Idle);
}

#[test]
fn escape_cancels_edit() {
    let mut controller = grid(3, 10, 800.0, 600.0);
    let mut host = RecordingHost::new();
    click_cell(&mut controller, &mut host, 0, 0);
    key(&mut controller, &mut host, "Enter");
    controller.set_draft("changed");

    assert!(key(&mut controller, &mut host, "Escape"));

    assert!(controller.editing().is_none());
    assert!(host.edits.is_empty());
}

#[test]
fn readonly_cells_never_edit() {
    let mut controller = grid(2, 4, 800.0, 600.0);
    let mut host =
        RecordingHost::new().with_cell(0, 0, CellContent::text("fixed").readonly());
    click_cell(&mut controller, &mut host, 0, 0);

    assert!(!key(&mut controller, &mut host, "Enter"));
    assert!(!key(&mut controller, &mut host, "x"));
    assert!(controller.editing().is_none());
}

#[test]
fn space_toggles_boolean_without_editor() {
    let mut controller = grid(2, 4, 800.0, 600.0);
    let mut host = RecordingHost::new().with_cell(1, 1, CellContent::boolean(false));
    assert!(controller.set_active_cell(CellAddress::new(1, 1), &mut host));

    assert!(key(&mut controller, &mut host, " "));

    assert!(controller.editing().is_none());
    assert_eq!(host.edits.len(), 1);
    assert_eq!(host.edits[0].1.value, CellValue::Boolean { data: Some(true) });
}

#[test]
fn digit_sets_rating() {
    let mut controller = grid(2, 4, 800.0, 600.0);
    let mut host = RecordingHost::new().with_cell(0, 3, CellContent::rating(1.0, 5));
    assert!(controller.set_active_cell(CellAddress::new(0, 3), &mut host));

    assert!(key(&mut controller, &mut host, "4"));

    assert!(matches!(
        host.edits[0].1.value,
        CellValue::Rating { data: Some(v), .. } if v == 4.0
    ));
}

#[test]
fn invalid_number_draft_is_not_committed() {
    let mut controller = grid(2, 4, 800.0, 600.0);
    let mut host = RecordingHost::new().with_cell(0, 0, CellContent::number(3.0));
    click_cell(&mut controller, &mut host, 0, 0);
    key(&mut controller, &mut host, "Enter");
    controller.set_draft("abc");

    key(&mut controller, &mut host, "Enter");

    assert!(host.edits.is_empty());
}

#[test]
fn editor_overlay_tracks_cell() {
    let mut controller = grid(4, 40, 800.0, 400.0);
    let mut host = RecordingHost::new();
    click_cell(&mut controller, &mut host, 2, 5);
    key(&mut controller, &mut host, "Enter");

    let overlay = controller.editor_overlay().unwrap();
    assert!(overlay.visible);
    assert_eq!(
        overlay.rect,
        controller.get_cell_bounds(CellAddress::new(2, 5)).unwrap()
    );

    controller.scroll_to(0.0, 1_000.0, &mut host);
    assert!(!controller.editor_overlay().unwrap().visible);
}

// ============================================================================
// Header drags
// ============================================================================

#[test]
fn dragging_non_adjacent_columns_keeps_their_order() {
    let mut controller = grid(5, 10, 800.0, 600.0);
    let mut host = RecordingHost::new();

    click(&mut controller, &mut host, PointerInput::primary(50.0, 20.0));
    click(
        &mut controller,
        &mut host,
        PointerInput::primary(250.0, 20.0).with_ctrl(),
    );
    controller.pointer_down(PointerInput::primary(250.0, 20.0), &mut host);
    controller.pointer_move(PointerInput::primary(320.0, 22.0));
    assert_eq!(controller.state(), InteractionState::Dragging);
    assert_eq!(controller.cursor(), "grabbing");
    controller.pointer_move(PointerInput::primary(380.0, 22.0));
    controller.pointer_up(PointerInput::primary(380.0, 22.0), &mut host);

    assert_eq!(host.column_orders, vec![(vec![0, 2], 4)]);

    let (drag, drop) = &host.column_orders[0];
    let ids: Vec<String> = reorder(controller.columns(), drag, *drop)
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, ["c1", "c3", "c0", "c2", "c4"]);
}

#[test]
fn header_drag_released_off_grid_is_cancelled() {
    let mut controller = grid(5, 10, 800.0, 600.0);
    let mut host = RecordingHost::new();

    controller.pointer_down(PointerInput::primary(50.0, 20.0), &mut host);
    controller.pointer_move(PointerInput::primary(2000.0, 5000.0));
    assert_eq!(controller.state(), InteractionState::Dragging);
    controller.pointer_up(PointerInput::primary(2000.0, 5000.0), &mut host);

    assert!(host.column_orders.is_empty());
    assert_eq!(controller.state(), InteractionState::Idle);
}

#[test]
fn row_drag_released_above_body_is_cancelled() {
    let config = GridConfig {
        row_header_width: 40.0,
        ..GridConfig::default()
    };
    let mut controller = grid_with(3, 10, 800.0, 600.0, config);
    let mut host = RecordingHost::new();

    controller.pointer_down(PointerInput::primary(20.0, 56.0), &mut host);
    controller.pointer_move(PointerInput::primary(20.0, 200.0));
    controller.pointer_move(PointerInput::primary(20.0, 10.0));
    controller.pointer_up(PointerInput::primary(20.0, 10.0), &mut host);
    assert!(host.row_orders.is_empty());

    // Coming back over the rows restores a drop position.
    controller.pointer_down(PointerInput::primary(20.0, 56.0), &mut host);
    controller.pointer_move(PointerInput::primary(20.0, 10.0));
    controller.pointer_move(PointerInput::primary(20.0, 40.0 + 32.0 * 3.0 + 24.0));
    controller.pointer_up(PointerInput::primary(20.0, 40.0 + 32.0 * 3.0 + 24.0), &mut host);
    assert_eq!(host.row_orders, vec![(vec![0], 4)]);
}

#[test]
fn column_resize_reports_new_width() {
    let mut controller = grid(3, 10, 800.0, 600.0);
    let mut host = RecordingHost::new();

    controller.pointer_down(PointerInput::primary(199.0, 20.0), &mut host);
    controller.pointer_move(PointerInput::primary(239.0, 20.0));
    controller.pointer_up(PointerInput::primary(239.0, 20.0), &mut host);

    assert_eq!(host.resizes, vec![("c1".to_string(), 140.0, 1)]);
    assert_eq!(controller.columns()[1].width, 140.0);
    assert_eq!(controller.layout().column_offset(2), 240.0);
}

#[test]
fn freeze_handle_drag_sets_frozen_count() {
    let config = GridConfig {
        row_header_width: 40.0,
        ..GridConfig::default()
    };
    let mut controller = grid_with(4, 10, 800.0, 600.0, config);
    let mut host = RecordingHost::new();

    controller.pointer_down(PointerInput::primary(41.0, 100.0), &mut host);
    assert_eq!(controller.cursor(), "col-resize");
    controller.pointer_move(PointerInput::primary(230.0, 100.0));
    controller.pointer_up(PointerInput::primary(230.0, 100.0), &mut host);

    assert_eq!(host.freezes, vec![2]);
    assert_eq!(controller.layout().frozen_cols, 2);
}

// ============================================================================
// Groups
// ============================================================================

#[test]
fn clicking_group_header_toggles_collapse() {
    let mut controller = grid(2, 5, 800.0, 600.0);
    let mut host = RecordingHost::new();
    controller.set_group_points(
        vec![
            GroupPoint::group("a", 0, "A"),
            GroupPoint::rows(3),
            GroupPoint::group("b", 0, "B"),
            GroupPoint::rows(2),
        ],
        &mut host,
    );

    click(&mut controller, &mut host, PointerInput::primary(100.0, 60.0));

    let expected: BTreeSet<String> = ["a".to_string()].into_iter().collect();
    assert_eq!(host.collapsed, vec![expected.clone()]);
    assert_eq!(controller.collapsed_groups(), &expected);
    assert!(controller.get_cell_bounds(CellAddress::new(0, 0)).is_none());

    click(&mut controller, &mut host, PointerInput::primary(100.0, 60.0));
    assert!(controller.collapsed_groups().is_empty());
    assert!(controller.get_cell_bounds(CellAddress::new(0, 0)).is_some());
}

fn long_second_group() -> Vec<GroupPoint> {
    vec![
        GroupPoint::group("a", 0, "A"),
        GroupPoint::rows(3),
        GroupPoint::group("b", 0, "B"),
        GroupPoint::rows(10),
    ]
}

fn collapse(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

#[test]
fn host_collapse_keeps_active_cell_on_its_record() {
    let mut controller = grid(2, 13, 800.0, 800.0);
    let mut host = RecordingHost::new();
    controller.set_group_points(long_second_group(), &mut host);
    assert!(controller.set_active_cell(CellAddress::new(0, 5), &mut host));
    let reported = host.selections.len();

    controller.set_collapsed_groups(collapse(&["a"]), &mut host);

    assert_eq!(controller.active_cell(), Some(CellAddress::new(0, 5)));
    assert_eq!(
        controller.record_region(),
        SelectionRegion::Cells(vec![CellRange::single(CellAddress::new(0, 5))])
    );
    // Same record selected as before, so nothing new to report.
    assert_eq!(host.selections.len(), reported);
    // Header, both group headers, then records 3 and 4.
    let bounds = controller.get_cell_bounds(CellAddress::new(0, 5)).unwrap();
    assert_eq!(bounds.y, 40.0 + 40.0 + 40.0 + 64.0);
}

#[test]
fn host_collapse_drops_hidden_part_of_selection() {
    let mut controller = grid(2, 13, 800.0, 800.0);
    let mut host = RecordingHost::new();
    controller.set_group_points(long_second_group(), &mut host);
    controller.set_active_cell(CellAddress::new(0, 1), &mut host);
    let (x, y) = cell_center(&controller, 0, 4);
    click(&mut controller, &mut host, PointerInput::primary(x, y).with_shift());

    controller.set_collapsed_groups(collapse(&["a"]), &mut host);

    let expected = SelectionRegion::Cells(vec![CellRange::new(
        CellAddress::new(0, 3),
        CellAddress::new(0, 4),
    )]);
    assert_eq!(controller.record_region(), expected);
    assert_eq!(host.last_selection(), Some(&expected));
    assert_eq!(controller.active_cell(), None);

    controller.set_collapsed_groups(BTreeSet::new(), &mut host);
    assert_eq!(controller.record_region(), expected);
}

#[test]
fn regrouping_keeps_row_selection_on_records() {
    let config = GridConfig {
        row_header_width: 40.0,
        ..GridConfig::default()
    };
    let mut controller = grid_with(2, 13, 800.0, 800.0, config);
    let mut host = RecordingHost::new();
    // Ungrouped: record 4 is display row 4.
    let row_4 = PointerInput::primary(20.0, 40.0 + 32.0 * 4.0 + 16.0);
    click(&mut controller, &mut host, row_4);
    assert_eq!(
        controller.record_region(),
        SelectionRegion::Rows(vec![IndexRange::single(4)])
    );

    controller.set_group_points(long_second_group(), &mut host);

    assert_eq!(
        controller.record_region(),
        SelectionRegion::Rows(vec![IndexRange::single(4)])
    );
    assert_eq!(
        controller.selection_region(),
        SelectionRegion::Rows(vec![IndexRange::single(6)])
    );
}

// ============================================================================
// Clipboard, delete, undo
// ============================================================================

#[test]
fn copy_builds_tsv_from_selection() {
    let mut controller = grid(3, 5, 800.0, 600.0);
    let mut host = RecordingHost::new().with_cell(1, 1, CellContent::text("a\tb"));
    click_cell(&mut controller, &mut host, 0, 0);
    let (x, y) = cell_center(&controller, 1, 1);
    click(&mut controller, &mut host, PointerInput::primary(x, y).with_shift());

    let payload = controller.copy(&mut host).unwrap();

    assert_eq!(payload.text, "0:0\t1:0\n0:1\t\"a\tb\"");
    assert_eq!(host.copies, vec![payload.text]);
}

#[test]
fn paste_and_delete_receive_record_region() {
    let mut controller = grid(3, 5, 800.0, 600.0);
    let mut host = RecordingHost::new();
    click_cell(&mut controller, &mut host, 2, 4);

    assert!(controller.paste("x\ty", &mut host));
    assert!(key(&mut controller, &mut host, "Delete"));

    let region = controller.record_region();
    assert_eq!(host.pastes, vec![(region.clone(), "x\ty".to_string())]);
    assert_eq!(host.deletes, vec![region]);
}

#[test]
fn undo_and_redo_shortcuts_reach_host() {
    let mut controller = grid(2, 2, 800.0, 600.0);
    let mut host = RecordingHost::new();

    controller.key_down(&KeyInput::new("z").with_ctrl(), &mut host);
    controller.key_down(&KeyInput::new("z").with_ctrl().with_shift(), &mut host);
    controller.key_down(&KeyInput::new("y").with_ctrl(), &mut host);

    assert_eq!((host.undos, host.redos), (1, 2));
}

// ============================================================================
// Append and menus
// ============================================================================

#[test]
fn append_row_and_column_buttons() {
    let config = GridConfig {
        show_append_row: true,
        show_append_column: true,
        ..GridConfig::default()
    };
    let mut controller = grid_with(2, 3, 800.0, 600.0, config);
    let mut host = RecordingHost::new();

    // Append row sits below the last row: 40 + 3 * 32.
    click(&mut controller, &mut host, PointerInput::primary(50.0, 150.0));
    // Append column button sits right of the last header.
    click(&mut controller, &mut host, PointerInput::primary(220.0, 20.0));

    assert_eq!(host.row_appends, vec![None]);
    assert_eq!(host.column_appends, 1);
}

#[test]
fn right_click_opens_record_menu_and_escape_closes_it() {
    let mut controller = grid(3, 10, 800.0, 600.0);
    let mut host = RecordingHost::new();
    let (x, y) = cell_center(&controller, 2, 6);

    controller.pointer_down(PointerInput::secondary(x, y), &mut host);

    let MenuState::Record(menu) = controller.menus().clone() else {
        panic!("expected record menu");
    };
    assert_eq!((menu.row, menu.column), (6, Some(2)));
    assert_eq!(controller.active_cell(), Some(CellAddress::new(2, 6)));

    assert!(key(&mut controller, &mut host, "Escape"));
    assert_eq!(controller.menus(), &MenuState::Closed);
}

#[test]
fn scroll_by_reports_clamped_position() {
    let mut controller = grid(4, 50, 300.0, 300.0);
    let mut host = RecordingHost::new();

    assert!(controller.scroll_by(-10.0, 64.0, &mut host));
    assert!(!controller.scroll_by(-10.0, 0.0, &mut host));

    assert_eq!(host.scrolls, vec![(0.0, 64.0)]);
}

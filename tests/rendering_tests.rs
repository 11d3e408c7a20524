//! Frame building tests
//!
//! Virtualization, bands and overlays as seen in the display list a
//! controller produces.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::*;
use gridcanvas::render::{Decorations, DrawCommand, TextAlign};
use gridcanvas::{
    CellAddress, CellContent, CellValue, Collaborator, GridConfig, GroupPoint, IndexRange, Rect,
};

#[test]
fn large_grid_only_draws_visible_cells() {
    let controller = grid(50, 100_000, 800.0, 600.0);
    let host = RecordingHost::new();

    let frame = controller.frame(&host);

    let rows = frame.visible_rows.unwrap();
    let cols = frame.visible_cols.unwrap();
    assert_eq!(rows.start, 0);
    assert!(rows.count() < 30, "{rows:?}");
    assert!(cols.count() < 12, "{cols:?}");
    assert_eq!(frame.cells_drawn, rows.count() * cols.count());
}

#[test]
fn scrolled_frame_starts_near_scroll_position() {
    let mut controller = grid(10, 100_000, 800.0, 600.0);
    let mut host = RecordingHost::new();
    controller.scroll_to(0.0, 32.0 * 50_000.0, &mut host);

    let frame = controller.frame(&host);

    let rows = frame.visible_rows.unwrap();
    assert!(rows.contains(50_000));
    assert!(frame.texts().any(|t| t == "0:50000"));
    assert!(!frame.texts().any(|t| t == "0:0"));
}

#[test]
fn frozen_columns_are_always_drawn() {
    let config = GridConfig {
        frozen_column_count: 1,
        ..GridConfig::default()
    };
    let mut controller = grid_with(20, 10, 400.0, 300.0, config);
    let mut host = RecordingHost::new();
    controller.scroll_to(1_200.0, 0.0, &mut host);

    let frame = controller.frame(&host);

    assert!(frame.texts().any(|t| t == "Column 0"));
    assert!(frame.texts().any(|t| t == "0:0"));
    assert!(!frame.texts().any(|t| t == "Column 1"));
    assert!(frame.visible_cols.unwrap().start >= 1);
}

#[test]
fn malformed_content_draws_blank_and_is_counted() {
    let controller = grid(2, 2, 800.0, 600.0);
    let host = RecordingHost::new().with_cell(
        1,
        1,
        CellContent::new(CellValue::Rating {
            data: Some(3.0),
            max: None,
            icon: None,
            color: None,
        }),
    );

    let frame = controller.frame(&host);

    assert_eq!(frame.fallback_cells, 1);
    assert_eq!(frame.cells_drawn, 4);
    assert!(frame.texts().any(|t| t == "0:1"));
}

#[test]
fn empty_number_draws_as_blank_cell() {
    let controller = grid(2, 2, 800.0, 600.0);
    let host = RecordingHost::new().with_cell(
        1,
        1,
        CellContent::new(CellValue::Number {
            data: None,
            display_data: None,
        }),
    );

    let frame = controller.frame(&host);

    assert_eq!(frame.fallback_cells, 0);
    assert_eq!(frame.cells_drawn, 4);
    let cell = controller.get_cell_bounds(CellAddress::new(1, 1)).unwrap();
    assert!(!frame.commands.iter().any(|c| matches!(
        c,
        DrawCommand::Text { x, y, .. } if cell.contains(*x, *y)
    )));
}

#[test]
fn group_headers_show_group_value() {
    let mut controller = grid(2, 3, 800.0, 600.0);
    let mut host = RecordingHost::new();
    controller.set_group_points(
        vec![
            GroupPoint::group("g1", 0, "Pending"),
            GroupPoint::rows(3),
        ],
        &mut host,
    );

    let frame = controller.frame(&host);

    assert!(frame.texts().any(|t| t == "Pending"));
    assert!(frame.texts().any(|t| t == "1:2"));
}

#[test]
fn collaborator_label_is_drawn_on_their_cell() {
    let mut controller = grid(3, 5, 800.0, 600.0);
    controller.set_decorations(Decorations {
        collaborators: vec![Collaborator {
            id: "u1".into(),
            name: "Robin".into(),
            active_cell: CellAddress::new(1, 2),
            border_color: "#e11d48".into(),
            timestamp: 1.0,
        }],
        ..Decorations::default()
    });
    let host = RecordingHost::new();

    let frame = controller.frame(&host);

    assert!(frame.texts().any(|t| t == "Robin"));
    let cell = controller.get_cell_bounds(CellAddress::new(1, 2)).unwrap();
    assert!(frame.commands.iter().any(|c| matches!(
        c,
        DrawCommand::StrokeRect { rect, color, .. } if *rect == cell && color == "#e11d48"
    )));
}

#[test]
fn search_cursor_uses_distinct_border() {
    let mut controller = grid(3, 5, 800.0, 600.0);
    controller.set_decorations(Decorations {
        search_hits: vec![CellAddress::new(0, 1), CellAddress::new(1, 1)],
        search_cursor: Some(CellAddress::new(1, 1)),
        ..Decorations::default()
    });
    let host = RecordingHost::new();
    let theme = GridConfig::default().theme;

    let frame = controller.frame(&host);

    let hit = controller.get_cell_bounds(CellAddress::new(0, 1)).unwrap();
    let cursor = controller.get_cell_bounds(CellAddress::new(1, 1)).unwrap();
    let strokes: Vec<(Rect, &str, f32)> = frame
        .commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::StrokeRect {
                rect,
                color,
                line_width,
            } => Some((*rect, color.as_str(), *line_width)),
            _ => None,
        })
        .collect();
    let hit_width = strokes
        .iter()
        .find(|(rect, color, _)| *rect == hit && *color == theme.search_hit_color)
        .map(|s| s.2)
        .unwrap();
    let cursor_width = strokes
        .iter()
        .find(|(rect, color, _)| *rect == cursor && *color == theme.search_cursor_color)
        .map(|s| s.2)
        .unwrap();
    assert_ne!(theme.search_hit_color, theme.search_cursor_color);
    assert!(cursor_width > hit_width);
    assert!(!strokes
        .iter()
        .any(|(rect, color, _)| *rect == cursor && *color == theme.search_hit_color));
}

#[test]
fn statistics_band_draws_column_aggregates() {
    let config = GridConfig {
        statistics_height: 32.0,
        ..GridConfig::default()
    };
    let mut controller = grid_with(3, 5, 800.0, 600.0, config);
    controller.set_decorations(Decorations {
        statistics: [("c0".to_string(), "Sum 10".to_string())].into_iter().collect(),
        ..Decorations::default()
    });
    let host = RecordingHost::new();
    let theme = GridConfig::default().theme;

    let frame = controller.frame(&host);

    // The band sits below the body: 600 - 32 = 568.
    assert!(frame.commands.iter().any(|c| matches!(
        c,
        DrawCommand::FillRect { rect, color }
            if rect.y == 568.0 && rect.height == 32.0 && *color == theme.statistics_background
    )));
    let aggregates: Vec<(f32, &str, TextAlign)> = frame
        .commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Text { y, text, align, .. } if *y > 568.0 => {
                Some((*y, text.as_str(), *align))
            }
            _ => None,
        })
        .collect();
    assert_eq!(aggregates, vec![(584.0, "Sum 10", TextAlign::Right)]);
}

#[test]
fn clips_are_balanced() {
    let config = GridConfig {
        frozen_column_count: 2,
        row_header_width: 48.0,
        statistics_height: 32.0,
        show_append_row: true,
        ..GridConfig::default()
    };
    let controller = grid_with(8, 40, 640.0, 480.0, config);
    let host = RecordingHost::new();

    let frame = controller.frame(&host);

    let saves = frame
        .commands
        .iter()
        .filter(|c| matches!(c, DrawCommand::Save))
        .count();
    let restores = frame
        .commands
        .iter()
        .filter(|c| matches!(c, DrawCommand::Restore))
        .count();
    assert_eq!(saves, restores);
    assert_eq!(frame.visible_cols, Some(IndexRange::new(2, 6)));
}

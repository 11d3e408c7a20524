//! Overlays drawn above the cell bodies.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use crate::layout::{GridLayout, LinearRow, Viewport};
use crate::render::backend::{DrawCommand, Frame, TextAlign};
use crate::render::colors::{contrast_text, palette, with_alpha};
use crate::render::frame::{DragFeedback, FrameInput};
use crate::render::selection::{region_cell_ranges, selection_rects};
use crate::types::{CellAddress, CellRange, Collaborator, Rect, SelectionRegion};

const ACTIVE_BORDER_WIDTH: f32 = 2.0;
const COLLABORATOR_LABEL_HEIGHT: f32 = 16.0;
const COLLABORATOR_FONT: &str = "11px sans-serif";

/// Host-supplied data drawn over the grid. Addresses use record rows.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Decorations {
    pub collaborators: Vec<Collaborator>,
    pub search_hits: Vec<CellAddress>,
    pub search_cursor: Option<CellAddress>,
    /// Column id -> aggregate text for the statistics band.
    pub statistics: HashMap<String, String>,
}

/// Display-row address of a record-row address, if it is shown.
fn to_display(layout: &GridLayout, address: CellAddress) -> Option<CellAddress> {
    let row = layout.rows.linear_index(address.row)?;
    Some(CellAddress::new(address.col, row))
}

fn visible_rect(layout: &GridLayout, viewport: &Viewport, address: CellAddress) -> Option<Rect> {
    layout.visible_cell_rect(address, viewport)
}

/// One collaborator per cell: the one with the latest timestamp.
pub fn latest_collaborators(collaborators: &[Collaborator]) -> Vec<&Collaborator> {
    let mut by_cell: BTreeMap<CellAddress, &Collaborator> = BTreeMap::new();
    for collaborator in collaborators {
        by_cell
            .entry(collaborator.active_cell)
            .and_modify(|current| {
                if collaborator.timestamp > current.timestamp {
                    *current = collaborator;
                }
            })
            .or_insert(collaborator);
    }
    by_cell.into_values().collect()
}

pub fn draw_frozen_divider(frame: &mut Frame, input: &FrameInput<'_>) {
    let layout = input.layout;
    if layout.frozen_cols == 0 {
        return;
    }
    let x = layout.frozen_divider_x();
    frame.push(DrawCommand::Line {
        x1: x,
        y1: 0.0,
        x2: x,
        y2: layout.body_rect(input.viewport).bottom(),
        color: input.config.theme.frozen_divider_color.clone(),
        line_width: 2.0,
    });
}

pub fn draw_active_cell(frame: &mut Frame, input: &FrameInput<'_>) {
    let Some(active) = input.active_cell else {
        return;
    };
    if !matches!(input.layout.rows.get(active.row), Some(LinearRow::Record(_))) {
        return;
    }
    if let Some(rect) = visible_rect(input.layout, input.viewport, active) {
        frame.push(DrawCommand::StrokeRect {
            rect,
            color: input.config.theme.active_cell_border_color.clone(),
            line_width: ACTIVE_BORDER_WIDTH,
        });
    }
}

/// Semi-transparent fill plus an outer border per range.
///
/// A lone cell selection that is just the active cell is left to the
/// active-cell border.
pub fn draw_selection(frame: &mut Frame, input: &FrameInput<'_>) {
    let theme = &input.config.theme;
    if let (SelectionRegion::Cells(ranges), Some(active)) = (input.selection, input.active_cell) {
        if ranges.len() == 1 && ranges.first() == Some(&CellRange::single(active)) {
            return;
        }
    }
    let fill = with_alpha(&theme.selection_fill_color, 0.1);
    for range in region_cell_ranges(input.selection, input.layout) {
        for part in selection_rects(&range, input.layout, input.viewport) {
            let r = part.rect;
            frame.push(DrawCommand::FillRect {
                rect: r,
                color: fill.clone(),
            });
            let mut edge = |draw: bool, x1: f32, y1: f32, x2: f32, y2: f32| {
                if draw {
                    frame.push(DrawCommand::Line {
                        x1,
                        y1,
                        x2,
                        y2,
                        color: theme.selection_border_color.clone(),
                        line_width: 1.0,
                    });
                }
            };
            edge(part.draw_top, r.x, r.y, r.right(), r.y);
            edge(part.draw_bottom, r.x, r.bottom(), r.right(), r.bottom());
            edge(part.draw_left, r.x, r.y, r.x, r.bottom());
            edge(part.draw_right, r.right(), r.y, r.right(), r.bottom());
        }
    }
}

/// Bordered rect plus a name tag for each other user's active cell.
pub fn draw_collaborators(frame: &mut Frame, input: &FrameInput<'_>) {
    for collaborator in latest_collaborators(&input.decorations.collaborators) {
        let Some(address) = to_display(input.layout, collaborator.active_cell) else {
            continue;
        };
        let Some(rect) = visible_rect(input.layout, input.viewport, address) else {
            continue;
        };
        frame.push(DrawCommand::StrokeRect {
            rect,
            color: collaborator.border_color.clone(),
            line_width: ACTIVE_BORDER_WIDTH,
        });
        let label_width = crate::render::cells::estimate_text_width(&collaborator.name, 11.0) + 8.0;
        let label = Rect::new(
            rect.right() - label_width,
            rect.y - COLLABORATOR_LABEL_HEIGHT,
            label_width,
            COLLABORATOR_LABEL_HEIGHT,
        );
        frame.push(DrawCommand::FillRect {
            rect: label,
            color: collaborator.border_color.clone(),
        });
        frame.push(DrawCommand::Text {
            x: label.x + 4.0,
            y: label.y + COLLABORATOR_LABEL_HEIGHT / 2.0,
            text: collaborator.name.clone(),
            color: contrast_text(&collaborator.border_color).to_string(),
            font: COLLABORATOR_FONT.to_string(),
            align: TextAlign::Left,
            max_width: None,
        });
    }
}

/// Search hits get a tinted border; the current cursor hit a stronger one.
pub fn draw_search_hits(frame: &mut Frame, input: &FrameInput<'_>) {
    let theme = &input.config.theme;
    let decorations = input.decorations;
    let hits = decorations
        .search_hits
        .iter()
        .filter(|hit| Some(**hit) != decorations.search_cursor);
    for hit in hits {
        let Some(rect) = to_display(input.layout, *hit)
            .and_then(|a| visible_rect(input.layout, input.viewport, a))
        else {
            continue;
        };
        frame.push(DrawCommand::FillRect {
            rect,
            color: with_alpha(&theme.search_hit_color, 0.2),
        });
        frame.push(DrawCommand::StrokeRect {
            rect,
            color: theme.search_hit_color.clone(),
            line_width: 1.0,
        });
    }
    if let Some(rect) = decorations
        .search_cursor
        .and_then(|c| to_display(input.layout, c))
        .and_then(|a| visible_rect(input.layout, input.viewport, a))
    {
        frame.push(DrawCommand::FillRect {
            rect,
            color: with_alpha(&theme.search_cursor_color, 0.3),
        });
        frame.push(DrawCommand::StrokeRect {
            rect,
            color: theme.search_cursor_color.clone(),
            line_width: ACTIVE_BORDER_WIDTH,
        });
    }
}

pub fn draw_drag_feedback(frame: &mut Frame, input: &FrameInput<'_>) {
    let viewport = input.viewport;
    let (x1, y1, x2, y2, color) = match input.drag {
        DragFeedback::None => return,
        DragFeedback::ColumnDrop { x } | DragFeedback::ResizeGuide { x } => {
            (x, 0.0, x, viewport.height, palette::DROP_INDICATOR.to_string())
        }
        DragFeedback::RowDrop { y } => (0.0, y, viewport.width, y, palette::DROP_INDICATOR.to_string()),
        DragFeedback::FreezeGuide { x } => (
            x,
            0.0,
            x,
            viewport.height,
            input.config.theme.frozen_divider_color.clone(),
        ),
    };
    frame.push(DrawCommand::Line {
        x1,
        y1,
        x2,
        y2,
        color,
        line_width: 2.0,
    });
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

    fn collaborator(id: &str, cell: CellAddress, timestamp: f64) -> Collaborator {
        Collaborator {
            id: id.to_string(),
            name: id.to_string(),
            active_cell: cell,
            border_color: "#FF0000".to_string(),
            timestamp,
        }
    }

    #[test]
    fn latest_timestamp_wins_shared_cell() {
        let cell = CellAddress::new(1, 1);
        let list = vec![
            collaborator("ana", cell, 10.0),
            collaborator("bo", cell, 30.0),
            collaborator("cy", cell, 20.0),
            collaborator("dee", CellAddress::new(0, 0), 5.0),
        ];
        let winners = latest_collaborators(&list);
        assert_eq!(winners.len(), 2);
        assert!(winners.iter().any(|c| c.id == "bo"));
        assert!(!winners.iter().any(|c| c.id == "ana" || c.id == "cy"));
    }
}

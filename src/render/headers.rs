//! Pinned bands: column headers, row headers, group rows, append row and
//! the statistics band.
//!
//! Headers render in two passes like the cell body: the scrollable part
//! first (clipped right of the frozen divider), then the frozen part on top.

use crate::hit_test::{MENU_ICON_PADDING, MENU_ICON_SIZE};
use crate::layout::LinearRow;
use crate::render::backend::{DrawCommand, Frame, TextAlign};
use crate::render::cells::CELL_PADDING;
use crate::render::frame::FrameInput;
use crate::types::{IndexRange, Rect, SelectionRegion};

/// Indent per group nesting level
const GROUP_INDENT: f32 = 16.0;
const CHEVRON_SIZE: f32 = 8.0;

fn column_selected(region: &SelectionRegion, col: u32) -> bool {
    match region {
        SelectionRegion::Columns(_) => region.is_column_selected(col),
        SelectionRegion::Cells(ranges) => ranges.iter().any(|r| r.cols.contains(col)),
        _ => false,
    }
}

fn row_selected(region: &SelectionRegion, row: u32) -> bool {
    match region {
        SelectionRegion::Rows(_) => region.is_row_selected(row),
        SelectionRegion::Cells(ranges) => ranges.iter().any(|r| r.rows.contains(row)),
        _ => false,
    }
}

/// Chevron pointing right (collapsed) or down (expanded), centered on `(cx, cy)`.
fn chevron(cx: f32, cy: f32, collapsed: bool, color: &str) -> DrawCommand {
    let h = CHEVRON_SIZE / 2.0;
    let points = if collapsed {
        vec![(cx - h / 2.0, cy - h), (cx + h / 2.0, cy), (cx - h / 2.0, cy + h)]
    } else {
        vec![(cx - h, cy - h / 2.0), (cx, cy + h / 2.0), (cx + h, cy - h / 2.0)]
    };
    DrawCommand::Polyline {
        points,
        color: color.to_string(),
        line_width: 1.5,
    }
}

/// Column headers, the corner and the append-column button.
pub fn draw_column_headers(frame: &mut Frame, input: &FrameInput<'_>) {
    let layout = input.layout;
    let viewport = input.viewport;
    let theme = &input.config.theme;
    let header_height = layout.header_height;
    if header_height <= 0.0 {
        return;
    }
    let divider = layout.frozen_divider_x();
    let font = input.header_font();

    frame.push(DrawCommand::FillRect {
        rect: Rect::new(0.0, 0.0, viewport.width, header_height),
        color: theme.header_background.clone(),
    });

    let draw_header = |f: &mut Frame, col: u32| {
        let Some(column) = input.columns.get(col as usize) else {
            return;
        };
        let x = layout.column_screen_x(col, viewport.scroll_left);
        let width = layout.column_width(col);
        let rect = Rect::new(x, 0.0, width, header_height);
        let background = if column_selected(input.selection, col) {
            Some(theme.header_selected_background.as_str())
        } else {
            column
                .custom_theme
                .as_ref()
                .and_then(|t| t.header_background.as_deref())
        };
        if let Some(bg) = background {
            f.push(DrawCommand::FillRect {
                rect,
                color: bg.to_string(),
            });
        }
        let menu_space = if column.has_menu {
            MENU_ICON_SIZE + MENU_ICON_PADDING
        } else {
            0.0
        };
        f.push(DrawCommand::Text {
            x: x + CELL_PADDING,
            y: header_height / 2.0,
            text: column.name.clone(),
            color: theme.header_text_color.clone(),
            font: font.clone(),
            align: TextAlign::Left,
            max_width: Some((width - CELL_PADDING * 2.0 - menu_space).max(0.0)),
        });
        if column.has_menu {
            let cx = rect.right() - MENU_ICON_PADDING - MENU_ICON_SIZE / 2.0;
            f.push(chevron(cx, header_height / 2.0, false, &theme.header_text_color));
        }
        f.push(DrawCommand::Line {
            x1: rect.right(),
            y1: 0.0,
            x2: rect.right(),
            y2: header_height,
            color: theme.grid_line_color.clone(),
            line_width: 1.0,
        });
    };

    let scroll_part = Rect::new(divider, 0.0, (viewport.width - divider).max(0.0), header_height);
    frame.clipped(scroll_part, |f| {
        if let Some(cols) = f.visible_cols {
            for col in cols.iter() {
                draw_header(f, col);
            }
        }
        if layout.append_column_width > 0.0 {
            let x = layout.column_screen_x(layout.column_count(), viewport.scroll_left);
            let x = if layout.column_count() == layout.frozen_cols {
                layout.frozen_divider_x()
            } else {
                x
            };
            f.push(DrawCommand::Text {
                x: x + layout.append_column_width / 2.0,
                y: header_height / 2.0,
                text: "+".to_string(),
                color: theme.header_text_color.clone(),
                font: font.clone(),
                align: TextAlign::Center,
                max_width: None,
            });
        }
    });
    if let Some(cols) = input.frozen_cols() {
        let frozen_part = Rect::new(layout.row_header_width, 0.0, layout.frozen_width(), header_height);
        frame.clipped(frozen_part, |f| {
            for col in cols.iter() {
                draw_header(f, col);
            }
        });
    }

    if layout.row_header_width > 0.0 {
        frame.push(DrawCommand::FillRect {
            rect: Rect::new(0.0, 0.0, layout.row_header_width, header_height),
            color: theme.header_background.clone(),
        });
    }
    frame.push(DrawCommand::Line {
        x1: 0.0,
        y1: header_height,
        x2: viewport.width,
        y2: header_height,
        color: theme.grid_line_color.clone(),
        line_width: 1.0,
    });
}

/// Row numbers (record index + 1) in the row header band.
pub fn draw_row_headers(frame: &mut Frame, input: &FrameInput<'_>, rows: IndexRange) {
    let layout = input.layout;
    let viewport = input.viewport;
    let theme = &input.config.theme;
    let width = layout.row_header_width;
    if width <= 0.0 {
        return;
    }
    let body = layout.body_rect(viewport);
    let font = input.font();
    let band = Rect::new(0.0, body.y, width, body.height);
    frame.clipped(band, |f| {
        f.push(DrawCommand::FillRect {
            rect: band,
            color: theme.header_background.clone(),
        });
        for row in rows.iter() {
            let y = layout.row_screen_y(row, viewport.scroll_top);
            let height = layout.row_height(row);
            let rect = Rect::new(0.0, y, width, height);
            match layout.rows.get(row) {
                Some(LinearRow::Group(_)) => {
                    f.push(DrawCommand::FillRect {
                        rect,
                        color: theme.group_header_background.clone(),
                    });
                }
                Some(LinearRow::Record(record)) => {
                    if row_selected(input.selection, row) {
                        f.push(DrawCommand::FillRect {
                            rect,
                            color: theme.header_selected_background.clone(),
                        });
                    }
                    f.push(DrawCommand::Text {
                        x: width / 2.0,
                        y: y + height / 2.0,
                        text: (u64::from(record) + 1).to_string(),
                        color: theme.cell_secondary_text_color.clone(),
                        font: font.clone(),
                        align: TextAlign::Center,
                        max_width: Some(width),
                    });
                }
                None => {}
            }
            f.push(DrawCommand::Line {
                x1: 0.0,
                y1: y + height,
                x2: width,
                y2: y + height,
                color: theme.grid_line_color.clone(),
                line_width: 1.0,
            });
        }
    });
    frame.push(DrawCommand::Line {
        x1: width,
        y1: 0.0,
        x2: width,
        y2: body.bottom(),
        color: theme.grid_line_color.clone(),
        line_width: 1.0,
    });
}

/// Full-width bands for group header rows.
pub fn draw_group_rows(frame: &mut Frame, input: &FrameInput<'_>, rows: IndexRange) {
    let layout = input.layout;
    let viewport = input.viewport;
    let theme = &input.config.theme;
    let body = layout.body_rect(viewport);
    let font = input.header_font();
    for row in rows.iter() {
        let Some(LinearRow::Group(group)) = layout.rows.get(row) else {
            continue;
        };
        let y = layout.row_screen_y(row, viewport.scroll_top);
        let height = layout.row_height(row);
        frame.push(DrawCommand::FillRect {
            rect: Rect::new(body.x, y, body.width, height),
            color: theme.group_header_background.clone(),
        });
        let depth = u16::try_from(group.depth).unwrap_or(u16::MAX);
        let x = body.x + CELL_PADDING + f32::from(depth) * GROUP_INDENT;
        frame.push(chevron(
            x + CHEVRON_SIZE / 2.0,
            y + height / 2.0,
            group.collapsed,
            &theme.header_text_color,
        ));
        frame.push(DrawCommand::Text {
            x: x + CHEVRON_SIZE + CELL_PADDING,
            y: y + height / 2.0,
            text: group.value.clone().unwrap_or_default(),
            color: theme.header_text_color.clone(),
            font: font.clone(),
            align: TextAlign::Left,
            max_width: Some((body.right() - x - CHEVRON_SIZE - CELL_PADDING * 2.0).max(0.0)),
        });
        frame.push(DrawCommand::Line {
            x1: body.x,
            y1: y + height,
            x2: body.right(),
            y2: y + height,
            color: theme.grid_line_color.clone(),
            line_width: 1.0,
        });
    }
}

/// The trailing "+" row.
pub fn draw_append_row(frame: &mut Frame, input: &FrameInput<'_>) {
    let layout = input.layout;
    let viewport = input.viewport;
    let height = layout.append_row_height;
    if height <= 0.0 {
        return;
    }
    let theme = &input.config.theme;
    let y = layout.row_screen_y(layout.row_count(), viewport.scroll_top);
    let body = layout.body_rect(viewport);
    if y >= body.bottom() || y + height <= body.y {
        return;
    }
    let right = layout
        .column_count()
        .checked_sub(1)
        .map_or(body.x, |last| {
            layout.column_screen_x(last, viewport.scroll_left) + layout.column_width(last)
        })
        .max(layout.frozen_divider_x())
        .min(body.right());
    frame.push(DrawCommand::FillRect {
        rect: Rect::new(body.x, y, right - body.x, height),
        color: theme.cell_background.clone(),
    });
    frame.push(DrawCommand::Text {
        x: body.x + CELL_PADDING,
        y: y + height / 2.0,
        text: "+".to_string(),
        color: theme.cell_secondary_text_color.clone(),
        font: input.font(),
        align: TextAlign::Left,
        max_width: None,
    });
    frame.push(DrawCommand::Line {
        x1: body.x,
        y1: y + height,
        x2: right,
        y2: y + height,
        color: theme.grid_line_color.clone(),
        line_width: 1.0,
    });
}

/// Pinned band below the body with one aggregate per column.
pub fn draw_statistics(frame: &mut Frame, input: &FrameInput<'_>) {
    let layout = input.layout;
    let viewport = input.viewport;
    let height = layout.statistics_height;
    if height <= 0.0 {
        return;
    }
    let theme = &input.config.theme;
    let top = layout.body_rect(viewport).bottom();
    let font = input.font();
    frame.push(DrawCommand::FillRect {
        rect: Rect::new(0.0, top, viewport.width, height),
        color: theme.statistics_background.clone(),
    });
    frame.push(DrawCommand::Line {
        x1: 0.0,
        y1: top,
        x2: viewport.width,
        y2: top,
        color: theme.grid_line_color.clone(),
        line_width: 1.0,
    });

    let draw_stat = |f: &mut Frame, col: u32| {
        let Some(text) = input
            .columns
            .get(col as usize)
            .and_then(|c| input.decorations.statistics.get(&c.id))
        else {
            return;
        };
        let x = layout.column_screen_x(col, viewport.scroll_left) + layout.column_width(col);
        f.push(DrawCommand::Text {
            x: x - CELL_PADDING,
            y: top + height / 2.0,
            text: text.clone(),
            color: theme.cell_secondary_text_color.clone(),
            font: font.clone(),
            align: TextAlign::Right,
            max_width: Some((layout.column_width(col) - CELL_PADDING * 2.0).max(0.0)),
        });
    };
    let divider = layout.frozen_divider_x();
    frame.clipped(
        Rect::new(divider, top, (viewport.width - divider).max(0.0), height),
        |f| {
            if let Some(cols) = f.visible_cols {
                for col in cols.iter() {
                    draw_stat(f, col);
                }
            }
        },
    );
    if let Some(cols) = input.frozen_cols() {
        for col in cols.iter() {
            draw_stat(frame, col);
        }
    }
}

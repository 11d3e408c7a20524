//! Per-kind cell drawers.
//!
//! Each kind has one pure drawer selected by [`drawer_for`]. Drawers write
//! into a scratch buffer; if content is malformed the buffer is dropped and
//! the cell stays blank, so one bad row never breaks the frame.

use crate::error::{GridError, Result};
use crate::render::backend::{DrawCommand, TextAlign};
use crate::render::colors::{contrast_text, palette};
use crate::types::{CellContent, CellKind, CellValue, GridTheme, Rect};

pub const CELL_PADDING: f32 = 8.0;
pub const CHECKBOX_SIZE: f32 = 16.0;
pub const RATING_ICON_SIZE: f32 = 16.0;
pub const RATING_GAP: f32 = 4.0;
const CHIP_HEIGHT: f32 = 20.0;
const CHIP_GAP: f32 = 4.0;
const CHIP_PADDING: f32 = 8.0;
const AVATAR_SIZE: f32 = 20.0;
const THUMBNAIL_SIZE: f32 = 22.0;

/// Where and how a single cell is painted.
#[derive(Debug, Clone, Copy)]
pub struct CellPaint<'a> {
    pub rect: Rect,
    pub theme: &'a GridTheme,
    pub text_color: &'a str,
    pub font: &'a str,
}

impl CellPaint<'_> {
    fn center_y(&self) -> f32 {
        self.rect.y + self.rect.height / 2.0
    }

    fn inner_width(&self) -> f32 {
        (self.rect.width - CELL_PADDING * 2.0).max(0.0)
    }

    fn text(&self, text: String, align: TextAlign, color: &str) -> DrawCommand {
        let x = match align {
            TextAlign::Left => self.rect.x + CELL_PADDING,
            TextAlign::Center => self.rect.x + self.rect.width / 2.0,
            TextAlign::Right => self.rect.right() - CELL_PADDING,
        };
        DrawCommand::Text {
            x,
            y: self.center_y(),
            text,
            color: color.to_string(),
            font: self.font.to_string(),
            align,
            max_width: Some(self.inner_width()),
        }
    }
}

pub type CellDrawer = fn(&CellValue, &CellPaint<'_>, &mut Vec<DrawCommand>) -> Result<()>;

/// The drawer for a kind.
pub fn drawer_for(kind: CellKind) -> CellDrawer {
    match kind {
        CellKind::Text => draw_text,
        CellKind::Number => draw_number,
        CellKind::Boolean => draw_boolean,
        CellKind::Select => draw_select,
        CellKind::Rating => draw_rating,
        CellKind::Link => draw_link,
        CellKind::User => draw_user,
        CellKind::Date => draw_date,
        CellKind::Attachment => draw_attachment,
        CellKind::Chart => draw_chart,
        CellKind::Loading => draw_loading,
    }
}

/// Validate and draw `content`; returns false (drawing nothing) when malformed.
pub fn draw_cell(content: &CellContent, paint: &CellPaint<'_>, out: &mut Vec<DrawCommand>) -> bool {
    let mut scratch = Vec::new();
    let result = content
        .value
        .validate()
        .and_then(|()| drawer_for(content.kind())(&content.value, paint, &mut scratch));
    match result {
        Ok(()) => {
            out.append(&mut scratch);
            true
        }
        Err(err) => {
            tracing::warn!(kind = ?content.kind(), error = %err, "malformed cell content, drawing blank");
            false
        }
    }
}

fn mismatch(value: &CellValue) -> GridError {
    GridError::malformed(value.kind(), "drawer received another kind")
}

/// Rough advance width used for laying out chips before the backend measures text.
pub fn estimate_text_width(text: &str, font_size: f32) -> f32 {
    let chars = u16::try_from(text.chars().count()).unwrap_or(u16::MAX);
    f32::from(chars) * font_size * 0.6
}

/// Checkbox square of a Boolean cell.
pub fn checkbox_rect(cell: Rect) -> Rect {
    Rect::new(
        cell.x + (cell.width - CHECKBOX_SIZE) / 2.0,
        cell.y + (cell.height - CHECKBOX_SIZE) / 2.0,
        CHECKBOX_SIZE,
        CHECKBOX_SIZE,
    )
}

/// Box of the `index`-th rating icon (0-based).
pub fn rating_icon_rect(cell: Rect, index: u32) -> Rect {
    let step = u16::try_from(index).unwrap_or(u16::MAX);
    Rect::new(
        cell.x + CELL_PADDING + f32::from(step) * (RATING_ICON_SIZE + RATING_GAP),
        cell.y + (cell.height - RATING_ICON_SIZE) / 2.0,
        RATING_ICON_SIZE,
        RATING_ICON_SIZE,
    )
}

fn draw_text(value: &CellValue, paint: &CellPaint<'_>, out: &mut Vec<DrawCommand>) -> Result<()> {
    let CellValue::Text { .. } = value else {
        return Err(mismatch(value));
    };
    let text = value.display_text();
    if !text.is_empty() {
        out.push(paint.text(text, TextAlign::Left, paint.text_color));
    }
    Ok(())
}

fn draw_number(value: &CellValue, paint: &CellPaint<'_>, out: &mut Vec<DrawCommand>) -> Result<()> {
    let CellValue::Number { .. } = value else {
        return Err(mismatch(value));
    };
    let text = value.display_text();
    if !text.is_empty() {
        out.push(paint.text(text, TextAlign::Right, paint.text_color));
    }
    Ok(())
}

fn draw_date(value: &CellValue, paint: &CellPaint<'_>, out: &mut Vec<DrawCommand>) -> Result<()> {
    let CellValue::Date { .. } = value else {
        return Err(mismatch(value));
    };
    let text = value.display_text();
    if !text.is_empty() {
        out.push(paint.text(text, TextAlign::Left, paint.text_color));
    }
    Ok(())
}

fn draw_boolean(value: &CellValue, paint: &CellPaint<'_>, out: &mut Vec<DrawCommand>) -> Result<()> {
    let CellValue::Boolean { data } = value else {
        return Err(mismatch(value));
    };
    let rect = checkbox_rect(paint.rect);
    if data.unwrap_or(false) {
        out.push(DrawCommand::FillRoundRect {
            rect,
            radius: 3.0,
            color: paint.theme.active_cell_border_color.clone(),
        });
        out.push(DrawCommand::Polyline {
            points: vec![
                (rect.x + 4.0, rect.y + 8.0),
                (rect.x + 7.0, rect.y + 11.0),
                (rect.x + 12.0, rect.y + 5.0),
            ],
            color: palette::WHITE.to_string(),
            line_width: 2.0,
        });
    } else {
        out.push(DrawCommand::StrokeRect {
            rect,
            color: palette::CHECKBOX_BORDER.to_string(),
            line_width: 1.0,
        });
    }
    Ok(())
}

fn draw_select(value: &CellValue, paint: &CellPaint<'_>, out: &mut Vec<DrawCommand>) -> Result<()> {
    let CellValue::Select {
        data, display_data, ..
    } = value
    else {
        return Err(mismatch(value));
    };
    let titles: Vec<&str> = if display_data.is_empty() {
        data.iter().filter_map(|o| o.title.as_deref()).collect()
    } else {
        display_data.iter().map(String::as_str).collect()
    };
    let font_size = paint.theme.font_size;
    let limit = paint.rect.right() - CELL_PADDING;
    let mut x = paint.rect.x + CELL_PADDING;
    let y = paint.rect.y + (paint.rect.height - CHIP_HEIGHT) / 2.0;
    for (i, title) in titles.iter().enumerate() {
        if x >= limit {
            break;
        }
        let background = data
            .get(i)
            .and_then(|o| o.color.as_deref())
            .unwrap_or(&paint.theme.chip_background);
        let width = (estimate_text_width(title, font_size) + CHIP_PADDING * 2.0).min(limit - x);
        out.push(DrawCommand::FillRoundRect {
            rect: Rect::new(x, y, width, CHIP_HEIGHT),
            radius: CHIP_HEIGHT / 2.0,
            color: background.to_string(),
        });
        out.push(DrawCommand::Text {
            x: x + CHIP_PADDING,
            y: y + CHIP_HEIGHT / 2.0,
            text: (*title).to_string(),
            color: contrast_text(background).to_string(),
            font: paint.font.to_string(),
            align: TextAlign::Left,
            max_width: Some((width - CHIP_PADDING * 2.0).max(0.0)),
        });
        x += width + CHIP_GAP;
    }
    Ok(())
}

fn draw_rating(value: &CellValue, paint: &CellPaint<'_>, out: &mut Vec<DrawCommand>) -> Result<()> {
    let CellValue::Rating {
        data, max, color, ..
    } = value
    else {
        return Err(mismatch(value));
    };
    let max = max.ok_or_else(|| GridError::malformed(CellKind::Rating, "missing max"))?;
    let filled = data.unwrap_or(0.0).round().clamp(0.0, f64::from(max));
    let fill_color = color.as_deref().unwrap_or(&paint.theme.rating_color);
    for i in 0..max {
        let icon = rating_icon_rect(paint.rect, i);
        if icon.right() > paint.rect.right() {
            break;
        }
        let on = f64::from(i) < filled;
        out.push(DrawCommand::Circle {
            cx: icon.x + icon.width / 2.0,
            cy: icon.y + icon.height / 2.0,
            radius: icon.width / 2.0 - 1.0,
            color: if on {
                fill_color.to_string()
            } else {
                palette::RATING_EMPTY.to_string()
            },
            fill: true,
        });
    }
    Ok(())
}

fn draw_link(value: &CellValue, paint: &CellPaint<'_>, out: &mut Vec<DrawCommand>) -> Result<()> {
    let CellValue::Link { .. } = value else {
        return Err(mismatch(value));
    };
    let text = value.display_text();
    if !text.is_empty() {
        out.push(paint.text(text, TextAlign::Left, &paint.theme.link_color));
    }
    Ok(())
}

fn draw_user(value: &CellValue, paint: &CellPaint<'_>, out: &mut Vec<DrawCommand>) -> Result<()> {
    let CellValue::User { data } = value else {
        return Err(mismatch(value));
    };
    let cy = paint.center_y();
    let mut x = paint.rect.x + CELL_PADDING;
    let limit = paint.rect.right() - CELL_PADDING;
    for user in data {
        if x + AVATAR_SIZE > limit {
            break;
        }
        let name = user
            .name
            .as_deref()
            .ok_or_else(|| GridError::malformed(CellKind::User, "user without name"))?;
        let radius = AVATAR_SIZE / 2.0;
        out.push(DrawCommand::Circle {
            cx: x + radius,
            cy,
            radius,
            color: palette::AVATAR.to_string(),
            fill: true,
        });
        out.push(DrawCommand::Text {
            x: x + radius,
            y: cy,
            text: name.chars().next().map(|c| c.to_uppercase().collect()).unwrap_or_default(),
            color: palette::WHITE.to_string(),
            font: paint.font.to_string(),
            align: TextAlign::Center,
            max_width: None,
        });
        x += AVATAR_SIZE + CHIP_GAP;
        // A lone user also gets their name beside the avatar.
        if data.len() == 1 {
            out.push(DrawCommand::Text {
                x,
                y: cy,
                text: name.to_string(),
                color: paint.text_color.to_string(),
                font: paint.font.to_string(),
                align: TextAlign::Left,
                max_width: Some((limit - x).max(0.0)),
            });
        }
    }
    Ok(())
}

fn draw_attachment(
    value: &CellValue,
    paint: &CellPaint<'_>,
    out: &mut Vec<DrawCommand>,
) -> Result<()> {
    let CellValue::Attachment { data } = value else {
        return Err(mismatch(value));
    };
    let y = paint.rect.y + (paint.rect.height - THUMBNAIL_SIZE) / 2.0;
    let mut x = paint.rect.x + CELL_PADDING;
    let limit = paint.rect.right() - CELL_PADDING;
    for _ in data {
        if x + THUMBNAIL_SIZE > limit {
            break;
        }
        let rect = Rect::new(x, y, THUMBNAIL_SIZE, THUMBNAIL_SIZE);
        out.push(DrawCommand::FillRoundRect {
            rect,
            radius: 2.0,
            color: paint.theme.chip_background.clone(),
        });
        out.push(DrawCommand::StrokeRect {
            rect,
            color: paint.theme.grid_line_color.clone(),
            line_width: 1.0,
        });
        x += THUMBNAIL_SIZE + CHIP_GAP;
    }
    Ok(())
}

fn draw_chart(value: &CellValue, paint: &CellPaint<'_>, out: &mut Vec<DrawCommand>) -> Result<()> {
    let CellValue::Chart { data, color } = value else {
        return Err(mismatch(value));
    };
    let series = data
        .as_deref()
        .ok_or_else(|| GridError::malformed(CellKind::Chart, "missing series"))?;
    let values: Vec<f64> = series.iter().copied().filter(|v| v.is_finite()).collect();
    if values.is_empty() {
        return Ok(());
    }
    let area = paint.rect.inset(CELL_PADDING / 2.0);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    let steps = u16::try_from(values.len().saturating_sub(1)).unwrap_or(u16::MAX);
    let dx = if steps == 0 {
        0.0
    } else {
        area.width / f32::from(steps)
    };
    let points = values
        .iter()
        .zip(0u16..)
        .map(|(v, i)| {
            let t = if span > 0.0 { (v - min) / span } else { 0.5 };
            #[allow(clippy::cast_possible_truncation)]
            let t = t as f32;
            (area.x + dx * f32::from(i), area.bottom() - t * area.height)
        })
        .collect();
    out.push(DrawCommand::Polyline {
        points,
        color: color.as_deref().unwrap_or(palette::CHART_LINE).to_string(),
        line_width: 1.5,
    });
    Ok(())
}

fn draw_loading(value: &CellValue, paint: &CellPaint<'_>, out: &mut Vec<DrawCommand>) -> Result<()> {
    let CellValue::Loading = value else {
        return Err(mismatch(value));
    };
    out.push(DrawCommand::FillRoundRect {
        rect: Rect::new(
            paint.rect.x + CELL_PADDING,
            paint.center_y() - 5.0,
            paint.inner_width() * 0.6,
            10.0,
        ),
        radius: 5.0,
        color: palette::SKELETON.to_string(),
    });
    Ok(())
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
    use crate::types::SelectOption;

    fn paint(theme: &GridTheme) -> CellPaint<'_> {
        CellPaint {
            rect: Rect::new(0.0, 0.0, 200.0, 32.0),
            theme,
            text_color: "#000000",
            font: "13px sans-serif",
        }
    }

    #[test]
    fn text_cell_draws_left_aligned_text() {
        let theme = GridTheme::default();
        let mut out = Vec::new();
        assert!(draw_cell(&CellContent::text("hello"), &paint(&theme), &mut out));
        assert!(matches!(
            &out[0],
            DrawCommand::Text { text, align: TextAlign::Left, x, .. } if text == "hello" && *x == CELL_PADDING
        ));
    }

    #[test]
    fn malformed_rating_draws_nothing() {
        let theme = GridTheme::default();
        let content = CellContent::new(CellValue::Rating {
            data: Some(3.0),
            max: None,
            icon: None,
            color: None,
        });
        let mut out = Vec::new();
        assert!(!draw_cell(&content, &paint(&theme), &mut out));
        assert!(out.is_empty());
    }

    #[test]
    fn rating_fills_up_to_value() {
        let theme = GridTheme::default();
        let mut out = Vec::new();
        assert!(draw_cell(&CellContent::rating(2.0, 5), &paint(&theme), &mut out));
        let filled = out
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { color, .. } if *color == theme.rating_color))
            .count();
        assert_eq!(out.len(), 5);
        assert_eq!(filled, 2);
    }

    #[test]
    fn select_chips_use_option_color() {
        let theme = GridTheme::default();
        let content = CellContent::new(CellValue::Select {
            data: vec![SelectOption {
                id: None,
                title: Some("Done".into()),
                color: Some("#111827".into()),
            }],
            display_data: vec![],
            is_multiple: false,
        });
        let mut out = Vec::new();
        assert!(draw_cell(&content, &paint(&theme), &mut out));
        assert!(matches!(&out[0], DrawCommand::FillRoundRect { color, .. } if color == "#111827"));
        assert!(matches!(&out[1], DrawCommand::Text { color, .. } if color == palette::WHITE));
    }

    #[test]
    fn every_kind_has_a_drawer_that_rejects_other_kinds() {
        let theme = GridTheme::default();
        let mut out = Vec::new();
        let kinds = [
            CellKind::Text,
            CellKind::Number,
            CellKind::Boolean,
            CellKind::Select,
            CellKind::Rating,
            CellKind::Link,
            CellKind::User,
            CellKind::Date,
            CellKind::Attachment,
            CellKind::Chart,
        ];
        for kind in kinds {
            assert!(drawer_for(kind)(&CellValue::Loading, &paint(&theme), &mut out).is_err());
        }
        assert!(drawer_for(CellKind::Loading)(&CellValue::Loading, &paint(&theme), &mut out).is_ok());
    }

    #[test]
    fn flat_chart_draws_midline() {
        let theme = GridTheme::default();
        let content = CellContent::new(CellValue::Chart {
            data: Some(vec![4.0, 4.0, 4.0]),
            color: None,
        });
        let mut out = Vec::new();
        assert!(draw_cell(&content, &paint(&theme), &mut out));
        let DrawCommand::Polyline { points, .. } = &out[0] else {
            panic!("expected polyline");
        };
        assert_eq!(points.len(), 3);
        assert!(points.iter().all(|(_, y)| (*y - 16.0).abs() < 0.01));
    }
}

//! Plays a frame display list onto a Canvas 2D context.
//!
//! Colors are validated once and fonts are only set when they change.

use std::collections::HashMap;
use std::f64::consts::TAU;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::error::{GridError, Result};
use crate::render::backend::{DrawCommand, Frame, RenderBackend, TextAlign};
use crate::render::colors::parse_color_rgba;
use crate::render::text::{truncate_with, TextMeasureCache, TEXT_MEASURE_CACHE_CAP};
use crate::types::Rect;

pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    width: u32,
    height: u32,
    dpr: f32,
    /// Widths of recently drawn strings, per font
    text_measure_cache: TextMeasureCache,
    /// Colors already checked against the parser (value: usable as-is)
    color_cache: HashMap<String, bool>,
    /// Font currently set on the context, to skip redundant sets
    current_font: String,
}

impl CanvasRenderer {
    /// Wrap `canvas` and its 2D context.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|_| GridError::Render("Failed to get 2d context".to_string()))?
            .ok_or_else(|| GridError::Render("No 2d context available".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| GridError::Render("Failed to cast to CanvasRenderingContext2d".to_string()))?;

        let width = canvas.width();
        let height = canvas.height();

        Ok(Self {
            canvas,
            ctx,
            width,
            height,
            dpr: 1.0,
            text_measure_cache: TextMeasureCache::new(TEXT_MEASURE_CACHE_CAP),
            color_cache: HashMap::new(),
            current_font: String::new(),
        })
    }

    /// Display size in CSS pixels; the backing store is set by `resize`.
    pub fn set_canvas_css_size(&self, css_w: f32, css_h: f32) {
        let style = self.canvas.style();
        let _ = style.set_property("width", &format!("{css_w}px"));
        let _ = style.set_property("height", &format!("{css_h}px"));
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Half-pixel offset so 1px strokes cover exactly one device pixel
    fn crisp(x: f32) -> f64 {
        f64::from(x).floor() + 0.5
    }

    /// Colors the parser rejects fall back to the browser's own parsing,
    /// but each distinct bad value is logged once.
    fn check_color(&mut self, color: &str) {
        if self.color_cache.contains_key(color) {
            return;
        }
        let ok = parse_color_rgba(color).is_some() || !color.starts_with('#');
        if !ok {
            tracing::warn!(color, "unparseable color");
        }
        self.color_cache.insert(color.to_string(), ok);
    }

    fn set_font(&mut self, font: &str) {
        if self.current_font != font {
            self.ctx.set_font(font);
            self.current_font.clear();
            self.current_font.push_str(font);
        }
    }

    fn measure(&mut self, text: &str) -> f64 {
        let ctx = &self.ctx;
        self.text_measure_cache.measure(&self.current_font, text, |t| {
            ctx.measure_text(t).map(|m| m.width()).unwrap_or(0.0)
        })
    }

    fn rect_path(&self, rect: &Rect) {
        self.ctx.begin_path();
        self.ctx.rect(
            f64::from(rect.x),
            f64::from(rect.y),
            f64::from(rect.width),
            f64::from(rect.height),
        );
    }

    fn round_rect_path(&self, rect: &Rect, radius: f32) -> Result<()> {
        let r = f64::from(radius.min(rect.width / 2.0).min(rect.height / 2.0).max(0.0));
        let (x, y) = (f64::from(rect.x), f64::from(rect.y));
        let (right, bottom) = (f64::from(rect.right()), f64::from(rect.bottom()));
        let js = |e| GridError::Js(format!("{e:?}"));
        self.ctx.begin_path();
        self.ctx.move_to(x + r, y);
        self.ctx.arc_to(right, y, right, bottom, r).map_err(js)?;
        self.ctx.arc_to(right, bottom, x, bottom, r).map_err(js)?;
        self.ctx.arc_to(x, bottom, x, y, r).map_err(js)?;
        self.ctx.arc_to(x, y, right, y, r).map_err(js)?;
        self.ctx.close_path();
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_text(
        &mut self,
        x: f32,
        y: f32,
        text: &str,
        color: &str,
        font: &str,
        align: TextAlign,
        max_width: Option<f32>,
    ) -> Result<()> {
        self.set_font(font);
        self.ctx.set_fill_style_str(color);
        self.ctx.set_text_baseline("middle");
        self.ctx.set_text_align(match align {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        });
        let shown = match max_width {
            Some(max) => truncate_with(text, f64::from(max), |t| self.measure(t)).into_owned(),
            None => text.to_string(),
        };
        self.ctx
            .fill_text(&shown, f64::from(x), f64::from(y))
            .map_err(|e| GridError::Js(format!("{e:?}")))
    }

    fn replay(&mut self, command: &DrawCommand) -> Result<()> {
        match command {
            DrawCommand::FillRect { rect, color } => {
                self.check_color(color);
                self.ctx.set_fill_style_str(color);
                self.ctx.fill_rect(
                    f64::from(rect.x),
                    f64::from(rect.y),
                    f64::from(rect.width),
                    f64::from(rect.height),
                );
            }
            DrawCommand::FillRoundRect { rect, radius, color } => {
                self.check_color(color);
                self.ctx.set_fill_style_str(color);
                self.round_rect_path(rect, *radius)?;
                self.ctx.fill();
            }
            DrawCommand::StrokeRect { rect, color, line_width } => {
                self.check_color(color);
                self.ctx.set_stroke_style_str(color);
                self.ctx.set_line_width(f64::from(*line_width));
                let inset = line_width / 2.0;
                self.ctx.stroke_rect(
                    f64::from(rect.x + inset),
                    f64::from(rect.y + inset),
                    f64::from((rect.width - line_width).max(0.0)),
                    f64::from((rect.height - line_width).max(0.0)),
                );
            }
            DrawCommand::Line { x1, y1, x2, y2, color, line_width } => {
                self.check_color(color);
                self.ctx.begin_path();
                self.ctx.set_stroke_style_str(color);
                self.ctx.set_line_width(f64::from(*line_width));
                self.ctx.move_to(Self::crisp(*x1), Self::crisp(*y1));
                self.ctx.line_to(Self::crisp(*x2), Self::crisp(*y2));
                self.ctx.stroke();
            }
            DrawCommand::Polyline { points, color, line_width } => {
                let mut iter = points.iter();
                let Some(&(x0, y0)) = iter.next() else {
                    return Ok(());
                };
                self.check_color(color);
                self.ctx.begin_path();
                self.ctx.set_stroke_style_str(color);
                self.ctx.set_line_width(f64::from(*line_width));
                self.ctx.move_to(f64::from(x0), f64::from(y0));
                for &(x, y) in iter {
                    self.ctx.line_to(f64::from(x), f64::from(y));
                }
                self.ctx.stroke();
            }
            DrawCommand::Circle { cx, cy, radius, color, fill } => {
                self.check_color(color);
                self.ctx.begin_path();
                self.ctx
                    .arc(f64::from(*cx), f64::from(*cy), f64::from(*radius), 0.0, TAU)
                    .map_err(|e| GridError::Js(format!("{e:?}")))?;
                if *fill {
                    self.ctx.set_fill_style_str(color);
                    self.ctx.fill();
                } else {
                    self.ctx.set_stroke_style_str(color);
                    self.ctx.set_line_width(1.0);
                    self.ctx.stroke();
                }
            }
            DrawCommand::Text { x, y, text, color, font, align, max_width } => {
                self.draw_text(*x, *y, text, color, font, *align, *max_width)?;
            }
            DrawCommand::Save => self.ctx.save(),
            DrawCommand::Clip { rect } => {
                self.rect_path(rect);
                self.ctx.clip();
            }
            DrawCommand::Restore => {
                self.ctx.restore();
                // restore() may bring back an older font
                self.current_font.clear();
            }
        }
        Ok(())
    }
}

impl RenderBackend for CanvasRenderer {
    fn init(&mut self) -> Result<()> {
        // 2D contexts are ready once created.
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32, dpr: f32) {
        self.width = width;
        self.height = height;
        self.dpr = dpr;
        self.text_measure_cache.clear();
        self.current_font.clear();

        // Backing store in device pixels.
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn render(&mut self, frame: &Frame) -> Result<()> {
        // Logical coordinates from here on
        let dpr = f64::from(self.dpr);
        self.ctx
            .set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)
            .map_err(|e| GridError::Js(format!("{e:?}")))?;
        self.ctx.clear_rect(
            0.0,
            0.0,
            f64::from(frame.width),
            f64::from(frame.height),
        );
        for command in &frame.commands {
            self.replay(command)?;
        }
        Ok(())
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

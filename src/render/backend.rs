//! Render backend trait and the display list it consumes.
//!
//! The frame builder turns grid state into a flat list of [`DrawCommand`]s
//! in screen coordinates (CSS pixels). Backends only replay the list, so
//! everything about what gets drawn where is testable without a canvas.

use serde::Serialize;

use crate::error::Result;
use crate::types::{IndexRange, Rect};

/// Horizontal anchor of a text command's `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// One drawing primitive. Text is vertically centered on `y`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DrawCommand {
    FillRect {
        rect: Rect,
        color: String,
    },
    /// Filled rectangle with rounded corners (chips, skeletons, checkboxes).
    FillRoundRect {
        rect: Rect,
        radius: f32,
        color: String,
    },
    StrokeRect {
        rect: Rect,
        color: String,
        line_width: f32,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        color: String,
        line_width: f32,
    },
    Polyline {
        points: Vec<(f32, f32)>,
        color: String,
        line_width: f32,
    },
    Circle {
        cx: f32,
        cy: f32,
        radius: f32,
        color: String,
        fill: bool,
    },
    Text {
        x: f32,
        y: f32,
        text: String,
        color: String,
        font: String,
        align: TextAlign,
        /// Backends truncate with an ellipsis past this width.
        max_width: Option<f32>,
    },
    Save,
    Clip {
        rect: Rect,
    },
    Restore,
}

/// A complete frame: the display list plus what was virtualized in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub width: f32,
    pub height: f32,
    pub commands: Vec<DrawCommand>,
    /// Display rows drawn (including overscan)
    pub visible_rows: Option<IndexRange>,
    /// Scrollable columns drawn (frozen columns are always drawn)
    pub visible_cols: Option<IndexRange>,
    pub cells_drawn: u32,
    /// Cells whose content was malformed and drew blank
    pub fallback_cells: u32,
}

impl Frame {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    /// Run `f` with drawing clipped to `rect`.
    pub fn clipped(&mut self, rect: Rect, f: impl FnOnce(&mut Frame)) {
        self.push(DrawCommand::Save);
        self.push(DrawCommand::Clip { rect });
        f(self);
        self.push(DrawCommand::Restore);
    }

    /// Texts in draw order; handy for assertions and debugging.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Trait for render backends
///
/// Implementations replay a [`Frame`] onto a concrete surface.
pub trait RenderBackend {
    /// Initialize the backend
    fn init(&mut self) -> Result<()>;

    /// Resize the render surface (physical pixels) at the given device pixel ratio
    fn resize(&mut self, width: u32, height: u32, dpr: f32);

    /// Draw a frame
    fn render(&mut self, frame: &Frame) -> Result<()>;

    fn width(&self) -> u32;

    fn height(&self) -> u32;
}

//! Canvas 2D rendering backend.
//!
//! Draws frames with the HTML Canvas 2D API via web-sys. A grid is only
//! rectangles, lines and text, which Canvas 2D handles well.

mod renderer;

pub use renderer::CanvasRenderer;

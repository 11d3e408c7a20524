//! Rendering: grid state to display list, display list to canvas.
//!
//! This module provides:
//! - The frame builder and its per-layer drawers (cells, headers, overlays)
//! - The backend trait and the display-list types backends replay
//! - Canvas 2D backend (wasm only)
//! - Color and text helpers

pub mod backend;
pub mod cells;
pub mod colors;
pub mod frame;
pub mod headers;
pub mod overlays;
pub mod selection;
pub mod text;

#[cfg(target_arch = "wasm32")]
pub mod canvas;

pub use backend::{DrawCommand, Frame, RenderBackend, TextAlign};
pub use colors::{palette, CssColor};
pub use frame::{build_frame, DragFeedback, FrameInput};
pub use overlays::Decorations;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasRenderer;

//! gridcanvas - virtualized data grid for the web
//!
//! Draws large tables onto a Canvas 2D surface via WebAssembly:
//! - Only visible rows and columns are laid out and drawn
//! - Frozen columns, grouped rows with collapse, variable row heights
//! - Cell, row and column selection with disjoint unions
//! - Overlay editing, direct toggles, header drag-reorder, resize and freeze
//! - Collaborator cursors and search highlights
//!
//! The application owns all data. The grid asks for cell content while
//! drawing and reports user intent through callbacks ([`host::GridHost`]).
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { GridView } from 'gridcanvas';
//! await init();
//! const grid = new GridView(canvas, {
//!   getCellContent: (col, row) => ({ type: 'text', data: rows[row][col] }),
//!   onCellEdited: (address, content) => save(address, content),
//! }, devicePixelRatio);
//! grid.setColumns(columns);
//! grid.setRowCount(rows.length);
//! grid.setRenderCallback(() => requestAnimationFrame(() => grid.render()));
//! grid.render();
//! ```
//!
//! The library emits `tracing` events but never installs a subscriber.
//! In the browser, call `initLogging("debug")` once to send them to the
//! console; native embedders install their own.

pub mod controller;
pub mod editor;
pub mod error;
pub mod hit_test;
pub mod host;
pub mod layout;
pub mod render;
pub mod selection;
pub mod types;

#[cfg(target_arch = "wasm32")]
pub mod viewer;

use wasm_bindgen::prelude::*;

pub use controller::GridController;
pub use error::{GridError, Result};
pub use host::{ClipboardPayload, GridHost};
#[cfg(target_arch = "wasm32")]
pub use viewer::GridView;

pub use types::*;

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

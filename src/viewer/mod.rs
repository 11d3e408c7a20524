//! `GridView` - the wasm-exported imperative handle.
//!
//! This module provides the `GridView` struct that:
//! - Owns a [`GridController`] and a Canvas 2D renderer
//! - Wires DOM pointer, wheel, keyboard and clipboard events to the controller
//! - Reports user intent to a JavaScript callbacks object
//! - Keeps the `<input>` edit overlay placed over the editing cell
//!
//! Event handlers are registered when the view is created; the host only
//! supplies data, a callbacks object and a render callback (usually one
//! that schedules `render()` with `requestAnimationFrame`).

mod events;
mod host;
mod logging;

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use js_sys::Function;
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, HtmlElement};

use crate::controller::GridController;
use crate::editor::input::InputOverlay;
use crate::editor::{EditorKind, EditorOverlay};
use crate::error::GridError;
use crate::render::{CanvasRenderer, Decorations, RenderBackend};
use crate::types::{CellAddress, CellValue, ColumnDescriptor, GridConfig, GroupPoint};

use host::{to_js, JsHost};

/// State shared between the exported handle and its DOM listeners.
pub(crate) struct SharedState {
    pub(crate) controller: GridController,
    pub(crate) host: JsHost,
    pub(crate) render_callback: Option<Function>,
    canvas: HtmlCanvasElement,
    /// Parent of the canvas; the edit input is placed inside it.
    container: Option<HtmlElement>,
    input: InputOverlay,
    input_shown: bool,
}

impl SharedState {
    /// Show, move or hide the edit input to match the controller.
    fn sync_editor(&mut self) {
        let overlay = self
            .controller
            .editing()
            .filter(|session| session.editor.opens_overlay())
            .map(|session| (session.draft.clone(), self.controller.editor_overlay()));
        match overlay {
            Some((draft, Some(overlay))) => {
                if self.input_shown {
                    self.input.reposition(&overlay);
                } else {
                    let theme = &self.controller.config().theme;
                    let font = format!("{}px {}", theme.font_size, theme.font_family);
                    self.input
                        .show(&overlay, &draft, &font, self.container.as_ref());
                    self.input_shown = true;
                }
            }
            _ => {
                if self.input_shown {
                    self.input_shown = false;
                    self.input.hide();
                    let _ = self.canvas.focus();
                }
            }
        }
    }

    /// Copy the input's text into the edit session.
    pub(crate) fn sync_draft(&mut self) {
        if !self.input_shown {
            return;
        }
        if let Some(value) = self.input.value() {
            self.controller.set_draft(&value);
        }
    }
}

/// Run `f` against the shared state, then (with the state released) update
/// the DOM, dispatch queued host callbacks and request a render if needed.
pub(crate) fn update<R>(
    state: &Rc<RefCell<SharedState>>,
    f: impl FnOnce(&mut SharedState) -> R,
) -> R {
    let (result, callbacks, queued, render) = {
        let mut guard = state.borrow_mut();
        let s = &mut *guard;
        let result = f(s);
        s.sync_editor();
        let _ = s
            .canvas
            .style()
            .set_property("cursor", s.controller.cursor());
        let render = if s.controller.needs_render() {
            s.render_callback.clone()
        } else {
            None
        };
        (result, s.host.callbacks(), s.host.take_queued(), render)
    };
    host::dispatch(&callbacks, queued);
    if let Some(callback) = render {
        if let Err(err) = callback.call0(&JsValue::NULL) {
            tracing::warn!(error = ?err, "render callback threw");
        }
    }
    result
}

fn from_js<T: DeserializeOwned>(value: JsValue, what: &str) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| GridError::InvalidConfig(format!("{what}: {e}")).into())
}

/// What the host needs to drive an editor it draws itself.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EditorState {
    address: CellAddress,
    editor: EditorKind,
    draft: String,
    overlay: Option<EditorOverlay>,
}

/// The grid handle exported to JavaScript
#[wasm_bindgen]
pub struct GridView {
    state: Rc<RefCell<SharedState>>,
    renderer: CanvasRenderer,
    #[allow(dead_code)]
    listeners: events::Listeners,
}

#[wasm_bindgen]
impl GridView {
    /// Attach a grid to `canvas`. `callbacks` is an object holding
    /// `getCellContent(col, row)` and any of the `on*` callbacks.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, callbacks: JsValue, dpr: f32) -> Result<GridView, JsValue> {
        console_error_panic_hook::set_once();

        let physical_width = canvas.width().max(1);
        let physical_height = canvas.height().max(1);
        let mut renderer = CanvasRenderer::new(canvas.clone())?;
        renderer.init()?;
        renderer.resize(physical_width, physical_height, dpr);

        let mut controller = GridController::new(Vec::new(), 0, GridConfig::default());
        controller.resize(physical_width as f32 / dpr, physical_height as f32 / dpr);

        // Focusable so keyboard events reach the grid.
        let _ = canvas.set_attribute("tabindex", "0");
        let _ = canvas.style().set_property("outline", "none");
        let container = canvas
            .parent_element()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());
        if let Some(container) = container.as_ref() {
            let style = container.style();
            if style
                .get_property_value("position")
                .unwrap_or_default()
                .is_empty()
            {
                let _ = style.set_property("position", "relative");
            }
        }

        let state = Rc::new(RefCell::new(SharedState {
            controller,
            host: JsHost::new(callbacks),
            render_callback: None,
            canvas: canvas.clone(),
            container: container.clone(),
            input: InputOverlay::new(),
            input_shown: false,
        }));
        let listeners = events::Listeners::attach(&state, &canvas, container.as_ref());
        tracing::debug!(physical_width, physical_height, dpr, "grid view created");

        Ok(GridView {
            state,
            renderer,
            listeners,
        })
    }

    /// Callback invoked whenever the grid needs a repaint.
    #[wasm_bindgen(js_name = "setRenderCallback")]
    pub fn set_render_callback(&mut self, callback: Option<Function>) {
        self.state.borrow_mut().render_callback = callback;
    }

    /// Draw the current state if anything changed since the last render.
    pub fn render(&mut self) -> Result<(), JsValue> {
        let mut guard = self.state.borrow_mut();
        let s = &mut *guard;
        if !s.controller.take_needs_render() {
            return Ok(());
        }
        let frame = s.controller.frame(&s.host);
        self.renderer.render(&frame)?;
        tracing::trace!(
            commands = frame.commands.len(),
            cells = frame.cells_drawn,
            fallbacks = frame.fallback_cells,
            "frame rendered"
        );
        s.sync_editor();
        Ok(())
    }

    /// Force the next `render()` to draw.
    pub fn invalidate(&mut self) {
        update(&self.state, |s| s.controller.invalidate());
    }

    /// New canvas size in physical pixels.
    pub fn resize(&mut self, physical_width: u32, physical_height: u32, dpr: f32) {
        let physical_width = physical_width.max(1);
        let physical_height = physical_height.max(1);
        self.renderer.resize(physical_width, physical_height, dpr);
        let width = physical_width as f32 / dpr;
        let height = physical_height as f32 / dpr;
        self.renderer.set_canvas_css_size(width, height);
        update(&self.state, |s| s.controller.resize(width, height));
    }

    // ------------------------------------------------------------------
    // Data and configuration
    // ------------------------------------------------------------------

    #[wasm_bindgen(js_name = "setConfig")]
    pub fn set_config(&mut self, config: JsValue) -> Result<(), JsValue> {
        let config: GridConfig = from_js(config, "config")?;
        update(&self.state, |s| s.controller.set_config(config));
        Ok(())
    }

    #[wasm_bindgen(js_name = "setColumns")]
    pub fn set_columns(&mut self, columns: JsValue) -> Result<(), JsValue> {
        let columns: Vec<ColumnDescriptor> = from_js(columns, "columns")?;
        update(&self.state, |s| s.controller.set_columns(columns));
        Ok(())
    }

    #[wasm_bindgen(js_name = "setRowCount")]
    pub fn set_row_count(&mut self, count: u32) {
        update(&self.state, |s| s.controller.set_record_count(count, &mut s.host));
    }

    /// Per-record heights as an object keyed by record row.
    #[wasm_bindgen(js_name = "setRowHeights")]
    pub fn set_row_heights(&mut self, heights: JsValue) -> Result<(), JsValue> {
        let raw: HashMap<String, f32> = from_js(heights, "row heights")?;
        let heights = raw
            .into_iter()
            .filter_map(|(key, height)| match key.parse::<u32>() {
                Ok(row) => Some((row, height)),
                Err(_) => {
                    tracing::warn!(key, "ignoring row height with a non-numeric key");
                    None
                }
            })
            .collect();
        update(&self.state, |s| s.controller.set_row_heights(heights));
        Ok(())
    }

    #[wasm_bindgen(js_name = "setGroupPoints")]
    pub fn set_group_points(&mut self, points: JsValue) -> Result<(), JsValue> {
        let points: Vec<GroupPoint> = from_js(points, "group points")?;
        update(&self.state, |s| s.controller.set_group_points(points, &mut s.host));
        Ok(())
    }

    #[wasm_bindgen(js_name = "setCollapsedGroups")]
    pub fn set_collapsed_groups(&mut self, ids: JsValue) -> Result<(), JsValue> {
        let ids: BTreeSet<String> = from_js(ids, "collapsed groups")?;
        update(&self.state, |s| s.controller.set_collapsed_groups(ids, &mut s.host));
        Ok(())
    }

    /// Collaborators, search hits, search cursor and column statistics.
    #[wasm_bindgen(js_name = "setDecorations")]
    pub fn set_decorations(&mut self, decorations: JsValue) -> Result<(), JsValue> {
        let decorations: Decorations = from_js(decorations, "decorations")?;
        update(&self.state, |s| s.controller.set_decorations(decorations));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Imperative API (record rows)
    // ------------------------------------------------------------------

    #[wasm_bindgen(js_name = "scrollToItem")]
    pub fn scroll_to_item(&mut self, col: u32, row: u32) -> bool {
        update(&self.state, |s| {
            s.controller
                .scroll_to_item(CellAddress::new(col, row), &mut s.host)
        })
    }

    #[wasm_bindgen(js_name = "scrollTo")]
    pub fn scroll_to(&mut self, x: f32, y: f32) -> bool {
        update(&self.state, |s| s.controller.scroll_to(x, y, &mut s.host))
    }

    #[wasm_bindgen(js_name = "scrollBy")]
    pub fn scroll_by(&mut self, dx: f32, dy: f32) -> bool {
        update(&self.state, |s| s.controller.scroll_by(dx, dy, &mut s.host))
    }

    #[wasm_bindgen(js_name = "resetState")]
    pub fn reset_state(&mut self) {
        update(&self.state, |s| s.controller.reset_state());
    }

    /// Screen rect `{x, y, width, height}` of a cell, or `null`.
    #[wasm_bindgen(js_name = "getCellBounds")]
    pub fn get_cell_bounds(&self, col: u32, row: u32) -> JsValue {
        self.state
            .borrow()
            .controller
            .get_cell_bounds(CellAddress::new(col, row))
            .map_or(JsValue::NULL, |rect| to_js(&rect))
    }

    #[wasm_bindgen(js_name = "setActiveCell")]
    pub fn set_active_cell(&mut self, col: u32, row: u32) -> bool {
        update(&self.state, |s| {
            s.controller
                .set_active_cell(CellAddress::new(col, row), &mut s.host)
        })
    }

    /// `{col, row}` under a canvas point, or `null`.
    #[wasm_bindgen(js_name = "getCellIndicesAtPosition")]
    pub fn get_cell_indices_at_position(&self, x: f32, y: f32) -> JsValue {
        self.state
            .borrow()
            .controller
            .get_cell_indices_at_position(x, y)
            .map_or(JsValue::NULL, |address| to_js(&address))
    }

    #[wasm_bindgen(js_name = "activeCell")]
    pub fn active_cell(&self) -> JsValue {
        self.state
            .borrow()
            .controller
            .active_cell()
            .map_or(JsValue::NULL, |address| to_js(&address))
    }

    pub fn selection(&self) -> JsValue {
        to_js(&self.state.borrow().controller.record_region())
    }

    #[wasm_bindgen(js_name = "menuState")]
    pub fn menu_state(&self) -> JsValue {
        to_js(self.state.borrow().controller.menus())
    }

    #[wasm_bindgen(js_name = "closeMenu")]
    pub fn close_menu(&mut self) -> bool {
        update(&self.state, |s| s.controller.close_menu())
    }

    /// The edit in progress, or `null`.
    #[wasm_bindgen(js_name = "editorState")]
    pub fn editor_state(&self) -> JsValue {
        let s = self.state.borrow();
        let Some(session) = s.controller.editing() else {
            return JsValue::NULL;
        };
        to_js(&EditorState {
            address: session.record,
            editor: session.editor,
            draft: session.draft.clone(),
            overlay: s.controller.editor_overlay(),
        })
    }

    /// Commit a value picked in a host-drawn editor.
    #[wasm_bindgen(js_name = "commitEditValue")]
    pub fn commit_edit_value(&mut self, value: JsValue) -> Result<bool, JsValue> {
        let value: CellValue = from_js(value, "cell value")?;
        Ok(update(&self.state, |s| {
            s.controller.commit_edit_value(value, &mut s.host)
        }))
    }

    #[wasm_bindgen(js_name = "cancelEdit")]
    pub fn cancel_edit(&mut self) -> bool {
        update(&self.state, |s| s.controller.cancel_edit())
    }

    #[wasm_bindgen(js_name = "contentWidth")]
    pub fn content_width(&self) -> f32 {
        self.state.borrow().controller.layout().content_width()
    }

    #[wasm_bindgen(js_name = "contentHeight")]
    pub fn content_height(&self) -> f32 {
        self.state.borrow().controller.layout().content_height()
    }
}

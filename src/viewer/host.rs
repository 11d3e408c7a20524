//! [`GridHost`] backed by a plain JavaScript object of callbacks.
//!
//! `getCellContent(col, row)` is called synchronously while drawing. Every
//! other callback is queued and dispatched once the viewer has released its
//! state, so a callback may call straight back into the `GridView`.

use std::collections::BTreeSet;

use js_sys::{Array, Function, Reflect};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::host::{ClipboardPayload, GridHost};
use crate::types::{CellAddress, CellContent, ColumnDescriptor, SelectionRegion};

pub(crate) struct JsHost {
    callbacks: JsValue,
    get_cell_content: Option<Function>,
    queued: Vec<(&'static str, Array)>,
}

impl JsHost {
    pub(crate) fn new(callbacks: JsValue) -> Self {
        let get_cell_content = function(&callbacks, "getCellContent");
        if get_cell_content.is_none() {
            tracing::warn!("host has no getCellContent; cells draw blank");
        }
        Self {
            callbacks,
            get_cell_content,
            queued: Vec::new(),
        }
    }

    pub(crate) fn callbacks(&self) -> JsValue {
        self.callbacks.clone()
    }

    /// Drain callbacks raised since the last dispatch.
    pub(crate) fn take_queued(&mut self) -> Vec<(&'static str, Array)> {
        std::mem::take(&mut self.queued)
    }

    fn queue(&mut self, name: &'static str, args: &[JsValue]) {
        self.queued.push((name, args.iter().collect()));
    }
}

/// Call each queued callback the host provides. Missing callbacks are
/// skipped; a throwing callback is logged and does not stop the rest.
pub(crate) fn dispatch(callbacks: &JsValue, queued: Vec<(&'static str, Array)>) {
    for (name, args) in queued {
        let Some(callback) = function(callbacks, name) else {
            continue;
        };
        if let Err(err) = callback.apply(&JsValue::NULL, &args) {
            tracing::warn!(callback = name, error = ?err, "host callback threw");
        }
    }
}

fn function(callbacks: &JsValue, name: &str) -> Option<Function> {
    Reflect::get(callbacks, &JsValue::from_str(name))
        .ok()?
        .dyn_into::<Function>()
        .ok()
}

pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "value could not be passed to JavaScript");
        JsValue::UNDEFINED
    })
}

fn blank() -> CellContent {
    CellContent::text(String::new())
}

impl GridHost for JsHost {
    fn cell_content(&self, address: CellAddress) -> CellContent {
        let Some(get) = self.get_cell_content.as_ref() else {
            return blank();
        };
        let value = match get.call2(
            &JsValue::NULL,
            &JsValue::from(address.col),
            &JsValue::from(address.row),
        ) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(col = address.col, row = address.row, error = ?err, "getCellContent threw");
                return blank();
            }
        };
        serde_wasm_bindgen::from_value(value).unwrap_or_else(|err| {
            tracing::warn!(col = address.col, row = address.row, error = %err, "unreadable cell content");
            blank()
        })
    }

    fn on_cell_edited(&mut self, address: CellAddress, content: CellContent) {
        self.queue("onCellEdited", &[to_js(&address), to_js(&content)]);
    }

    fn on_row_append(&mut self, index: Option<u32>) {
        self.queue("onRowAppend", &[index.map_or(JsValue::UNDEFINED, JsValue::from)]);
    }

    fn on_column_append(&mut self) {
        self.queue("onColumnAppend", &[]);
    }

    fn on_column_resize(&mut self, column: &ColumnDescriptor, new_width: f32, index: u32) {
        self.queue(
            "onColumnResize",
            &[to_js(column), JsValue::from(new_width), JsValue::from(index)],
        );
    }

    fn on_column_ordered(&mut self, drag_indices: &[u32], drop_index: u32) {
        self.queue("onColumnOrdered", &[to_js(drag_indices), JsValue::from(drop_index)]);
    }

    fn on_row_ordered(&mut self, drag_indices: &[u32], drop_index: u32) {
        self.queue("onRowOrdered", &[to_js(drag_indices), JsValue::from(drop_index)]);
    }

    fn on_selection_changed(&mut self, region: &SelectionRegion) {
        self.queue("onSelectionChanged", &[to_js(region)]);
    }

    fn on_copy(&mut self, region: &SelectionRegion, payload: &ClipboardPayload) {
        self.queue("onCopy", &[to_js(region), JsValue::from_str(&payload.text)]);
    }

    fn on_paste(&mut self, region: &SelectionRegion, payload: &ClipboardPayload) {
        self.queue("onPaste", &[to_js(region), JsValue::from_str(&payload.text)]);
    }

    fn on_delete(&mut self, region: &SelectionRegion) {
        self.queue("onDelete", &[to_js(region)]);
    }

    fn on_undo(&mut self) {
        self.queue("onUndo", &[]);
    }

    fn on_redo(&mut self) {
        self.queue("onRedo", &[]);
    }

    fn on_collapsed_group_changed(&mut self, collapsed: &BTreeSet<String>) {
        self.queue("onCollapsedGroupChanged", &[to_js(collapsed)]);
    }

    fn on_column_freeze(&mut self, frozen_count: u32) {
        self.queue("onColumnFreeze", &[JsValue::from(frozen_count)]);
    }

    fn on_column_header_click(&mut self, col: u32) {
        self.queue("onColumnHeaderClick", &[JsValue::from(col)]);
    }

    fn on_column_header_dbl_click(&mut self, col: u32) {
        self.queue("onColumnHeaderDblClick", &[JsValue::from(col)]);
    }

    fn on_cell_dbl_click(&mut self, address: CellAddress) {
        self.queue("onCellDblClick", &[to_js(&address)]);
    }

    fn on_row_expand(&mut self, row: u32) {
        self.queue("onRowExpand", &[JsValue::from(row)]);
    }

    fn on_scroll_changed(&mut self, scroll_left: f32, scroll_top: f32) {
        self.queue(
            "onScrollChanged",
            &[JsValue::from(scroll_left), JsValue::from(scroll_top)],
        );
    }
}

//! The `<input>` element that floats over the cell being edited.
//!
//! The element is created on first use and reused for every later edit.
//! Keystrokes reach it through the viewer's listeners, so this type only
//! places, fills and reads it.

use wasm_bindgen::JsCast;
use web_sys::{CssStyleDeclaration, HtmlElement, HtmlInputElement};

use super::EditorOverlay;

const BASE_STYLE: &[(&str, &str)] = &[
    ("position", "absolute"),
    ("z-index", "1000"),
    ("box-sizing", "border-box"),
    ("outline", "none"),
    ("padding", "0 8px"),
    ("background", "#fff"),
    ("display", "none"),
];

const EDITING_BORDER: &str = "2px solid #4285f4";

fn apply(style: &CssStyleDeclaration, properties: &[(&str, &str)]) {
    for (name, value) in properties {
        if style.set_property(name, value).is_err() {
            tracing::trace!(name, "style property rejected");
        }
    }
}

pub(crate) struct InputOverlay {
    element: Option<HtmlInputElement>,
}

impl InputOverlay {
    pub(crate) fn new() -> Self {
        Self { element: None }
    }

    /// Fill the input with `draft`, place it and give it focus with the
    /// caret after the last character.
    pub(crate) fn show(
        &mut self,
        overlay: &EditorOverlay,
        draft: &str,
        font: &str,
        container: Option<&HtmlElement>,
    ) {
        let Some(element) = self.element_in(container) else {
            tracing::warn!("could not create edit input");
            return;
        };
        apply(&element.style(), &[("font", font)]);
        element.set_value(draft);
        place(element, overlay);
        let _ = element.focus();
        let caret = u32::try_from(draft.encode_utf16().count()).unwrap_or(u32::MAX);
        let _ = element.set_selection_range(caret, caret);
    }

    /// Follow the cell after a scroll or resize. Value and focus are kept.
    pub(crate) fn reposition(&self, overlay: &EditorOverlay) {
        if let Some(element) = &self.element {
            place(element, overlay);
        }
    }

    pub(crate) fn hide(&mut self) {
        if let Some(element) = &self.element {
            apply(&element.style(), &[("display", "none")]);
            let _ = element.blur();
        }
    }

    pub(crate) fn value(&self) -> Option<String> {
        self.element.as_ref().map(HtmlInputElement::value)
    }

    fn element_in(&mut self, container: Option<&HtmlElement>) -> Option<&HtmlInputElement> {
        if self.element.is_none() {
            let document = web_sys::window()?.document()?;
            let element: HtmlInputElement = document.create_element("input").ok()?.dyn_into().ok()?;
            element.set_type("text");
            apply(&element.style(), BASE_STYLE);
            let parent = match container {
                Some(c) => Some(c.clone()),
                None => document.body(),
            };
            parent?.append_child(&element).ok()?;
            self.element = Some(element);
        }
        self.element.as_ref()
    }
}

/// Off-screen overlays stay laid out but stop taking pointer input.
fn place(element: &HtmlInputElement, overlay: &EditorOverlay) {
    let rect = overlay.rect;
    let (left, top) = (format!("{}px", rect.x), format!("{}px", rect.y));
    let (width, height) = (format!("{}px", rect.width), format!("{}px", rect.height));
    let (pointer, border) = if overlay.visible {
        ("auto", EDITING_BORDER)
    } else {
        ("none", "none")
    };
    apply(
        &element.style(),
        &[
            ("display", "block"),
            ("left", left.as_str()),
            ("top", top.as_str()),
            ("width", width.as_str()),
            ("height", height.as_str()),
            ("pointer-events", pointer),
            ("border", border),
        ],
    );
}

impl Drop for InputOverlay {
    fn drop(&mut self) {
        if let Some(element) = self.element.take() {
            element.remove();
        }
    }
}

//! DOM event wiring for `GridView`.
//!
//! Pointer events are converted to canvas coordinates and handed to the
//! controller. Move and release listen on the window so drags keep
//! tracking outside the canvas. Keyboard and clipboard events listen on
//! the canvas container, which also receives them from the edit input.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, ClipboardEvent, Event, EventTarget, HtmlCanvasElement, HtmlElement,
    HtmlInputElement, KeyboardEvent, MouseEvent, WheelEvent,
};

use super::{update, SharedState};
use crate::controller::keyboard::classify;
use crate::controller::{KeyAction, KeyInput, Modifiers, PointerButton, PointerInput};

/// Pixels per line when the browser reports wheel deltas in lines.
const WHEEL_LINE_HEIGHT: f64 = 32.0;

const DOM_DELTA_LINE: u32 = 1;
const DOM_DELTA_PAGE: u32 = 2;

/// Registered listeners; removed from their targets on drop.
pub(crate) struct Listeners {
    registered: Vec<(EventTarget, &'static str, Closure<dyn FnMut(Event)>)>,
}

impl Listeners {
    pub(crate) fn attach(
        state: &Rc<RefCell<SharedState>>,
        canvas: &HtmlCanvasElement,
        container: Option<&HtmlElement>,
    ) -> Self {
        let mut listeners = Listeners {
            registered: Vec::new(),
        };
        let canvas_target: EventTarget = canvas.clone().into();
        let key_target: EventTarget = container.map_or_else(
            || canvas_target.clone(),
            |container| container.clone().into(),
        );
        let window_target: EventTarget = match web_sys::window() {
            Some(window) => window.into(),
            None => canvas_target.clone(),
        };

        {
            let state = state.clone();
            let canvas = canvas.clone();
            listeners.add(&canvas_target, "mousedown", move |event| {
                let Some(event) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                let input = pointer_input(event, &canvas);
                update(&state, |s| {
                    s.sync_draft();
                    s.controller.pointer_down(input, &mut s.host);
                });
            });
        }

        {
            let state = state.clone();
            let canvas = canvas.clone();
            listeners.add(&window_target, "mousemove", move |event| {
                let Some(event) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                let input = pointer_input(event, &canvas);
                update(&state, |s| s.controller.pointer_move(input));
            });
        }

        {
            let state = state.clone();
            let canvas = canvas.clone();
            listeners.add(&window_target, "mouseup", move |event| {
                let Some(event) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                let input = pointer_input(event, &canvas);
                update(&state, |s| s.controller.pointer_up(input, &mut s.host));
            });
        }

        {
            let state = state.clone();
            listeners.add(&canvas_target, "mouseleave", move |_event| {
                update(&state, |s| s.controller.pointer_leave());
            });
        }

        {
            let state = state.clone();
            let canvas = canvas.clone();
            listeners.add(&canvas_target, "dblclick", move |event| {
                let Some(event) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                let input = pointer_input(event, &canvas);
                update(&state, |s| s.controller.double_click(input, &mut s.host));
            });
        }

        // The secondary-button press already opened the grid's own menu.
        listeners.add(&canvas_target, "contextmenu", |event| event.prevent_default());

        {
            let state = state.clone();
            let options = AddEventListenerOptions::new();
            options.set_passive(false);
            listeners.add_with_options(&canvas_target, "wheel", &options, move |event| {
                let Some(event) = event.dyn_ref::<WheelEvent>() else {
                    return;
                };
                event.prevent_default();
                let (dx, dy) = wheel_delta(event);
                update(&state, |s| s.controller.scroll_by(dx, dy, &mut s.host));
            });
        }

        {
            let state = state.clone();
            listeners.add(&key_target, "keydown", move |event| {
                let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                let input = key_input(event);
                let handled = update(&state, |s| {
                    let editing = s.controller.editing().is_some();
                    // Copy and paste run from the clipboard events below.
                    if !editing && matches!(classify(&input), KeyAction::Copy | KeyAction::Paste) {
                        return false;
                    }
                    s.sync_draft();
                    s.controller.key_down(&input, &mut s.host)
                });
                if handled {
                    event.prevent_default();
                }
            });
        }

        {
            let state = state.clone();
            listeners.add(&key_target, "copy", move |event| {
                let Some(event) = event.dyn_ref::<ClipboardEvent>() else {
                    return;
                };
                let payload = update(&state, |s| {
                    if s.controller.editing().is_some() {
                        return None;
                    }
                    s.controller.copy(&mut s.host)
                });
                let (Some(payload), Some(data)) = (payload, event.clipboard_data()) else {
                    return;
                };
                if data.set_data("text/plain", &payload.text).is_ok() {
                    event.prevent_default();
                }
            });
        }

        {
            let state = state.clone();
            listeners.add(&key_target, "paste", move |event| {
                let Some(event) = event.dyn_ref::<ClipboardEvent>() else {
                    return;
                };
                let Some(text) = event
                    .clipboard_data()
                    .and_then(|data| data.get_data("text/plain").ok())
                else {
                    return;
                };
                let handled = update(&state, |s| {
                    if s.controller.editing().is_some() {
                        return false;
                    }
                    s.controller.paste(&text, &mut s.host)
                });
                if handled {
                    event.prevent_default();
                }
            });
        }

        // Focus leaving the edit input commits the edit. While the viewer
        // itself hides the input the state is borrowed and this is skipped.
        {
            let state = state.clone();
            listeners.add(&key_target, "focusout", move |event| {
                let from_input = event
                    .target()
                    .is_some_and(|target| target.dyn_ref::<HtmlInputElement>().is_some());
                if !from_input || state.try_borrow_mut().is_err() {
                    return;
                }
                update(&state, |s| {
                    s.sync_draft();
                    s.controller.commit_edit(&mut s.host);
                });
            });
        }

        listeners
    }

    fn add(&mut self, target: &EventTarget, name: &'static str, handler: impl FnMut(Event) + 'static) {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        if target
            .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
            .is_err()
        {
            tracing::warn!(event = name, "could not register listener");
        }
        self.registered.push((target.clone(), name, closure));
    }

    fn add_with_options(
        &mut self,
        target: &EventTarget,
        name: &'static str,
        options: &AddEventListenerOptions,
        handler: impl FnMut(Event) + 'static,
    ) {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        if target
            .add_event_listener_with_callback_and_add_event_listener_options(
                name,
                closure.as_ref().unchecked_ref(),
                options,
            )
            .is_err()
        {
            tracing::warn!(event = name, "could not register listener");
        }
        self.registered.push((target.clone(), name, closure));
    }
}

impl Drop for Listeners {
    fn drop(&mut self) {
        for (target, name, closure) in &self.registered {
            let _ = target.remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn pointer_input(event: &MouseEvent, canvas: &HtmlCanvasElement) -> PointerInput {
    let rect = canvas.get_bounding_client_rect();
    let button = match event.button() {
        0 => PointerButton::Primary,
        2 => PointerButton::Secondary,
        _ => PointerButton::Other,
    };
    PointerInput {
        x: (f64::from(event.client_x()) - rect.left()) as f32,
        y: (f64::from(event.client_y()) - rect.top()) as f32,
        button,
        modifiers: Modifiers {
            shift: event.shift_key(),
            ctrl: event.ctrl_key(),
            meta: event.meta_key(),
            alt: event.alt_key(),
        },
    }
}

fn key_input(event: &KeyboardEvent) -> KeyInput {
    KeyInput {
        key: event.key(),
        shift: event.shift_key(),
        ctrl: event.ctrl_key(),
        meta: event.meta_key(),
        alt: event.alt_key(),
    }
}

/// Wheel delta in pixels. Shift turns vertical wheels horizontal.
#[allow(clippy::cast_possible_truncation)]
fn wheel_delta(event: &WheelEvent) -> (f32, f32) {
    let scale = match event.delta_mode() {
        DOM_DELTA_LINE => WHEEL_LINE_HEIGHT,
        DOM_DELTA_PAGE => WHEEL_LINE_HEIGHT * 10.0,
        _ => 1.0,
    };
    let (mut dx, mut dy) = (event.delta_x() * scale, event.delta_y() * scale);
    if event.shift_key() && dx.abs() < f64::EPSILON {
        (dx, dy) = (dy, 0.0);
    }
    (dx as f32, dy as f32)
}

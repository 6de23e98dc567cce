use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{HtmlCanvasElement, PointerEvent, WheelEvent};

use super::render::SharedApp;
use crate::error::Result;

#[derive(Clone, Copy)]
enum Drag {
    Rotate { x: f64, y: f64 },
    Pan { x: f64, y: f64 },
}

/// Feeds canvas pointer and wheel input into the orbit controls. Primary
/// drag rotates; secondary drag or shift/ctrl/meta + drag pans.
pub fn attach(canvas: &HtmlCanvasElement, app: SharedApp) -> Result<()> {
    canvas.style().set_property("touch-action", "none")?;
    let drag: Rc<Cell<Option<Drag>>> = Rc::new(Cell::new(None));

    let on_down = {
        let drag = drag.clone();
        let canvas = canvas.clone();
        Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            let (x, y) = (event.client_x() as f64, event.client_y() as f64);
            let pan = event.button() == 2 || event.shift_key() || event.ctrl_key() || event.meta_key();
            drag.set(Some(if pan { Drag::Pan { x, y } } else { Drag::Rotate { x, y } }));
            canvas.set_pointer_capture(event.pointer_id()).ok();
        })
    };

    let on_move = {
        let drag = drag.clone();
        let app = app.clone();
        Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            let Some(current) = drag.get() else {
                return;
            };
            let (x, y) = (event.client_x() as f64, event.client_y() as f64);
            let mut app = app.borrow_mut();
            let state = app.state_mut();
            let height = state.viewport.height as f32;
            match current {
                Drag::Rotate { x: px, y: py } => {
                    state.controls.rotate((x - px) as f32, (y - py) as f32, height);
                    drag.set(Some(Drag::Rotate { x, y }));
                }
                Drag::Pan { x: px, y: py } => {
                    let camera = &state.camera;
                    state.controls.pan((x - px) as f32, (y - py) as f32, height, camera);
                    drag.set(Some(Drag::Pan { x, y }));
                }
            }
        })
    };

    let on_up = {
        let drag = drag.clone();
        Closure::<dyn FnMut(PointerEvent)>::new(move |_event: PointerEvent| drag.set(None))
    };

    let on_wheel = {
        let app = app.clone();
        Closure::<dyn FnMut(WheelEvent)>::new(move |event: WheelEvent| {
            event.prevent_default();
            app.borrow_mut()
                .state_mut()
                .controls
                .dolly(event.delta_y() as f32);
        })
    };

    let on_context_menu = Closure::<dyn FnMut(web_sys::Event)>::new(|event: web_sys::Event| {
        event.prevent_default();
    });

    canvas.add_event_listener_with_callback("pointerdown", on_down.as_ref().unchecked_ref())?;
    canvas.add_event_listener_with_callback("pointermove", on_move.as_ref().unchecked_ref())?;
    canvas.add_event_listener_with_callback("pointerup", on_up.as_ref().unchecked_ref())?;
    canvas.add_event_listener_with_callback("pointercancel", on_up.as_ref().unchecked_ref())?;
    canvas.add_event_listener_with_callback("wheel", on_wheel.as_ref().unchecked_ref())?;
    canvas.add_event_listener_with_callback("contextmenu", on_context_menu.as_ref().unchecked_ref())?;

    on_down.forget();
    on_move.forget();
    on_up.forget();
    on_wheel.forget();
    on_context_menu.forget();
    Ok(())
}

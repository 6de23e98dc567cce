//! Browser fixtures for the wasm test modules.

use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, WebGl2RenderingContext as GL};

use super::render::{build_app, SharedApp};
use crate::DemoConfig;

pub fn mount_canvas() -> HtmlCanvasElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas: HtmlCanvasElement = document
        .create_element("canvas")
        .unwrap()
        .dyn_into()
        .unwrap();
    canvas.set_width(64);
    canvas.set_height(64);
    document.body().unwrap().append_child(&canvas).unwrap();
    canvas
}

pub fn webgl2(canvas: &HtmlCanvasElement) -> GL {
    canvas
        .get_context("webgl2")
        .unwrap()
        .expect("browser under test lacks WebGL2")
        .dyn_into()
        .unwrap()
}

/// A full render loop on a freshly mounted canvas.
pub fn mount_app(config: &DemoConfig) -> (SharedApp, HtmlCanvasElement) {
    let window = web_sys::window().unwrap();
    let canvas = mount_canvas();
    let app = build_app(&window, &canvas, config).unwrap();
    (app, canvas)
}

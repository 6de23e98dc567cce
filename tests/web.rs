#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

use flag_shader::geometry::RANDOM_ATTRIBUTE;
use flag_shader::scene::build_mesh;
use flag_shader::DemoConfig;

wasm_bindgen_test_configure!(run_in_browser);

fn mount_canvas() -> web_sys::HtmlCanvasElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas = document
        .create_element("canvas")
        .unwrap()
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .unwrap();
    canvas.set_class_name("webgl");
    document.body().unwrap().append_child(&canvas).unwrap();
    canvas
}

#[wasm_bindgen_test]
fn canvas_selector_finds_canvas() {
    mount_canvas();
    let document = web_sys::window().unwrap().document().unwrap();
    let found = document
        .query_selector(DemoConfig::default().canvas_selector)
        .unwrap()
        .expect("canvas.webgl present");
    assert!(found.dyn_ref::<web_sys::HtmlCanvasElement>().is_some());
    assert_eq!(found.class_name(), "webgl");
}

#[wasm_bindgen_test]
fn webgl2_context_is_available() {
    let canvas = mount_canvas();
    let ctx = canvas.get_context("webgl2").unwrap();
    assert!(ctx.is_some(), "browser under test lacks WebGL2");
}

#[wasm_bindgen_test]
fn random_attribute_from_browser_entropy() {
    let mesh = build_mesh(&DemoConfig::default(), &mut rand::thread_rng());
    let values = &mesh.geometry.attribute(RANDOM_ATTRIBUTE).unwrap().values;
    assert_eq!(values.len(), 1089);
    assert!(values.iter().all(|v| (0.0..1.0).contains(v)));
}

#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

pub mod camera;
pub mod capture;
pub mod config;
pub mod controls;
pub mod error;
pub mod geometry;
pub mod material;
pub mod panel;
pub mod render_loop;
pub mod scene;
pub mod viewport;

pub use config::DemoConfig;
pub use error::{DemoError, Result};
pub use render_loop::{RenderLoop, RenderState};

// Only compile browser glue when targeting wasm32.

#[cfg(target_arch = "wasm32")]
mod wasm {
    use wasm_bindgen::prelude::*;

    use crate::DemoConfig;

    mod clock;
    mod controls;
    mod panel;
    mod recorder;
    mod render;
    mod texture;

    #[cfg(test)]
    mod testing;

    #[cfg(test)]
    wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();

        let config = DemoConfig::default();
        console_log::init_with_level(config.log_level()).ok();

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        // Pages without the demo canvas (e.g. the wasm-bindgen-test runner)
        // load the module without starting anything.
        let Some(element) = document.query_selector(config.canvas_selector)? else {
            log::warn!("no element matches {}; demo not started", config.canvas_selector);
            return Ok(());
        };
        let canvas = element.dyn_into::<web_sys::HtmlCanvasElement>()?;

        render::start(canvas, config)?;
        Ok(())
    }
}

//! DOM rendition of the debug panel: a fixed box in the top-right corner
//! with one range slider per frequency axis and the capture buttons.

use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{Document, HtmlButtonElement, HtmlElement, HtmlInputElement};

use super::render::SharedApp;
use crate::error::{DemoError, Result};
use crate::panel::{frequency_sliders, step_decimals, PanelAction, PanelEvent, SliderSpec};
use crate::DemoConfig;

const PANEL_STYLE: &str = "position:fixed;top:0;right:15px;width:245px;padding:6px 8px;\
    background:#1f1f1f;color:#ebebeb;font:11px sans-serif;z-index:1000;";
const ROW_STYLE: &str = "display:flex;align-items:center;gap:6px;margin:4px 0;";

fn element<T: JsCast>(document: &Document, tag: &str) -> Result<T> {
    document
        .create_element(tag)?
        .dyn_into::<T>()
        .map_err(|_| DemoError::Js(format!("<{tag}> has unexpected type")))
}

/// Appends the panel to `<body>` and returns its root element.
pub fn build(document: &Document, app: SharedApp, config: &DemoConfig) -> Result<HtmlElement> {
    let body = document.body().ok_or(DemoError::MissingElement("body"))?;
    let root: HtmlElement = element(document, "div")?;
    root.set_class_name("debug-panel");
    root.style().set_css_text(PANEL_STYLE);

    for spec in frequency_sliders(config.frequency_range) {
        let initial = app.borrow().state().uniforms().frequency_axis(spec.axis);
        root.append_child(&slider(document, &app, spec, initial)?)?;
    }
    for action in PanelAction::ALL {
        root.append_child(&button(document, &app, action)?)?;
    }

    body.append_child(&root)?;
    Ok(root)
}

fn slider(document: &Document, app: &SharedApp, spec: SliderSpec, initial: f32) -> Result<HtmlElement> {
    let decimals = step_decimals(spec.range.step);

    let row: HtmlElement = element(document, "div")?;
    row.style().set_css_text(ROW_STYLE);

    let label: HtmlElement = element(document, "label")?;
    label.set_text_content(Some(spec.name));
    label.style().set_css_text("width:80px;");

    let input: HtmlInputElement = element(document, "input")?;
    input.set_type("range");
    input.set_name(spec.name);
    input.set_min(&spec.range.min.to_string());
    input.set_max(&spec.range.max.to_string());
    input.set_step(&spec.range.step.to_string());
    input.set_value(&format!("{initial:.decimals$}"));
    input.style().set_css_text("flex:1;");

    let readout: HtmlElement = element(document, "span")?;
    readout.set_text_content(Some(&format!("{initial:.decimals$}")));
    readout.style().set_css_text("width:40px;text-align:right;");

    let on_input = {
        let app = app.clone();
        let input = input.clone();
        let readout = readout.clone();
        Closure::<dyn FnMut()>::new(move || {
            let value = input.value_as_number() as f32;
            let stored = {
                let mut app = app.borrow_mut();
                if let Err(err) = app.apply(PanelEvent::Frequency { axis: spec.axis, value }) {
                    log::error!("{} update failed: {err}", spec.name);
                }
                app.state().uniforms().frequency_axis(spec.axis)
            };
            let text = format!("{stored:.decimals$}");
            input.set_value(&text);
            readout.set_text_content(Some(&text));
        })
    };
    input.add_event_listener_with_callback("input", on_input.as_ref().unchecked_ref())?;
    on_input.forget();

    row.append_child(&label)?;
    row.append_child(&input)?;
    row.append_child(&readout)?;
    Ok(row)
}

fn button(document: &Document, app: &SharedApp, action: PanelAction) -> Result<HtmlElement> {
    let button: HtmlButtonElement = element(document, "button")?;
    button.set_type("button");
    button.set_text_content(Some(action.label()));
    button.style().set_css_text("display:block;width:100%;margin:4px 0;");

    let on_click = {
        let app = app.clone();
        Closure::<dyn FnMut()>::new(move || {
            if let Err(err) = app.borrow_mut().apply(PanelEvent::Action(action)) {
                log::error!("{} failed: {err}", action.label());
            }
        })
    };
    button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
    on_click.forget();

    Ok(button.into())
}

#[cfg(test)]
mod tests {
    use wasm_bindgen_test::*;
    use web_sys::{Event, MediaRecorder};

    use super::*;
    use crate::material::Axis;
    use crate::wasm::testing::mount_app;

    fn mount_panel() -> (SharedApp, HtmlElement) {
        let config = DemoConfig::default();
        let (app, _canvas) = mount_app(&config);
        let document = web_sys::window().unwrap().document().unwrap();
        let root = build(&document, app.clone(), &config).unwrap();
        (app, root)
    }

    fn slider_named(root: &HtmlElement, name: &str) -> HtmlInputElement {
        root.query_selector(&format!("input[type=range][name={name}]"))
            .unwrap()
            .unwrap_or_else(|| panic!("no slider named {name}"))
            .dyn_into()
            .unwrap()
    }

    fn readout(input: &HtmlInputElement) -> Option<String> {
        input.next_element_sibling().and_then(|el| el.text_content())
    }

    fn buttons(root: &HtmlElement) -> Vec<HtmlElement> {
        let nodes = root.query_selector_all("button").unwrap();
        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .map(|node| node.dyn_into().unwrap())
            .collect()
    }

    #[wasm_bindgen_test]
    fn panel_has_frequency_sliders_and_capture_buttons() {
        let (_app, root) = mount_panel();
        assert_eq!(root.query_selector_all("input[type=range]").unwrap().length(), 2);

        for (name, initial) in [("frequencyX", 10.0), ("frequencyY", 5.0)] {
            let input = slider_named(&root, name);
            assert_eq!(input.min(), "0");
            assert_eq!(input.max(), "20");
            assert_eq!(input.step(), "0.01");
            assert_eq!(input.value_as_number(), initial);
            assert_eq!(readout(&input), Some(format!("{initial:.2}")));
        }

        let labels: Vec<String> = buttons(&root)
            .iter()
            .filter_map(|b| b.text_content())
            .collect();
        assert_eq!(labels, ["Start Capture", "Stop Capture"]);
    }

    #[wasm_bindgen_test]
    fn out_of_range_input_settles_on_max() {
        let (app, root) = mount_panel();
        let input = slider_named(&root, "frequencyX");
        input.set_value("99");
        input.dispatch_event(&Event::new("input").unwrap()).unwrap();

        assert_eq!(readout(&input).as_deref(), Some("20.00"));
        assert_eq!(input.value_as_number(), 20.0);
        assert_eq!(app.borrow().state().uniforms().frequency_axis(Axis::X), 20.0);
        assert_eq!(app.borrow().state().uniforms().frequency_axis(Axis::Y), 5.0);
    }

    #[wasm_bindgen_test]
    fn slider_input_snaps_to_step() {
        let (app, root) = mount_panel();
        let input = slider_named(&root, "frequencyY");
        input.set_value("3.14");
        input.dispatch_event(&Event::new("input").unwrap()).unwrap();

        assert_eq!(readout(&input).as_deref(), Some("3.14"));
        let stored = app.borrow().state().uniforms().frequency_axis(Axis::Y);
        assert!((stored - 3.14).abs() < 1e-4, "{stored}");
    }

    #[wasm_bindgen_test]
    fn capture_buttons_drive_the_recorder() {
        if !MediaRecorder::is_type_supported(DemoConfig::default().capture.mime_type) {
            return;
        }
        let (app, root) = mount_panel();
        let [start, stop] = <[HtmlElement; 2]>::try_from(buttons(&root)).unwrap();

        start.click();
        assert!(app.borrow().recorder().is_capturing());
        for _ in 0..3 {
            assert!(app.borrow_mut().tick().unwrap().captured);
        }
        start.click();
        assert!(app.borrow().recorder().is_capturing());

        stop.click();
        assert!(!app.borrow().recorder().is_capturing());
        assert_eq!(app.borrow().recorder().sink().last_stamp().map(|s| s.index), Some(2));
    }
}

use thiserror::Error;

/// Everything that can go wrong while setting up or driving the demo.
#[derive(Debug, Error)]
pub enum DemoError {
    #[error("element not found: {0}")]
    MissingElement(&'static str),

    #[error("rendering context unavailable: {0}")]
    Context(String),

    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompile { stage: &'static str, log: String },

    #[error("program failed to link: {0}")]
    ProgramLink(String),

    #[error("failed to allocate {0}")]
    GlResource(&'static str),

    #[error("capture failed: {0}")]
    Capture(String),

    #[error("javascript error: {0}")]
    Js(String),
}

pub type Result<T, E = DemoError> = std::result::Result<T, E>;

impl From<wasm_bindgen::JsValue> for DemoError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        let text = value
            .as_string()
            .unwrap_or_else(|| format!("{value:?}"));
        DemoError::Js(text)
    }
}

impl From<DemoError> for wasm_bindgen::JsValue {
    fn from(err: DemoError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}

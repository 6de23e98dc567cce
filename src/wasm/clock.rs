use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{Performance, Window};

use crate::error::{DemoError, Result};
use crate::render_loop::{Clock, FrameScheduler};

/// `performance.now()` clock that starts on the first reading.
pub struct PerformanceClock {
    performance: Performance,
    started_at: Option<f64>,
}

impl PerformanceClock {
    pub fn new(window: &Window) -> Result<Self> {
        let performance = window
            .performance()
            .ok_or(DemoError::MissingElement("window.performance"))?;
        Ok(Self {
            performance,
            started_at: None,
        })
    }
}

impl Clock for PerformanceClock {
    fn elapsed_seconds(&mut self) -> f64 {
        let now = self.performance.now();
        let start = *self.started_at.get_or_insert(now);
        (now - start) / 1000.0
    }

    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }
}

/// Shared slot for the frame callback. The callback captures a scheduler
/// pointing at its own slot so it can re-arm itself.
pub type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

pub struct AnimationFrameScheduler {
    window: Window,
    callback: FrameCallback,
}

impl AnimationFrameScheduler {
    pub fn new(window: Window, callback: FrameCallback) -> Self {
        Self { window, callback }
    }
}

impl FrameScheduler for AnimationFrameScheduler {
    fn request_frame(&mut self) -> Result<()> {
        let slot = self.callback.borrow();
        let callback = slot
            .as_ref()
            .ok_or_else(|| DemoError::Js("frame callback not installed".into()))?;
        self.window
            .request_animation_frame(callback.as_ref().unchecked_ref())?;
        Ok(())
    }
}

//! Window size tracking and the camera/renderer state derived from it.

use crate::camera::PerspectiveCamera;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// CSS pixels.
    pub width: f64,
    pub height: f64,
    /// Device pixel ratio after capping.
    pub pixel_ratio: f64,
}

/// What the renderer needs to size its output: the CSS box and the backing
/// drawing buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub css_width: u32,
    pub css_height: u32,
    pub buffer_width: u32,
    pub buffer_height: u32,
}

pub fn capped_pixel_ratio(device_pixel_ratio: f64, max: f64) -> f64 {
    if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio.min(max)
    } else {
        1.0
    }
}

impl Viewport {
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64, max_pixel_ratio: f64) -> Self {
        Self {
            width,
            height,
            pixel_ratio: capped_pixel_ratio(device_pixel_ratio, max_pixel_ratio),
        }
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            (self.width / self.height) as f32
        } else {
            1.0
        }
    }

    pub fn surface_size(&self) -> SurfaceSize {
        let css_width = self.width.max(0.0) as u32;
        let css_height = self.height.max(0.0) as u32;
        SurfaceSize {
            css_width,
            css_height,
            buffer_width: (css_width as f64 * self.pixel_ratio).floor() as u32,
            buffer_height: (css_height as f64 * self.pixel_ratio).floor() as u32,
        }
    }

    /// Takes the window's current dimensions, re-derives the camera aspect and
    /// projection, and returns the output size the renderer must adopt.
    /// Repeating the same event yields the same state.
    pub fn resize(
        &mut self,
        width: f64,
        height: f64,
        device_pixel_ratio: f64,
        max_pixel_ratio: f64,
        camera: &mut PerspectiveCamera,
    ) -> SurfaceSize {
        *self = Viewport::new(width, height, device_pixel_ratio, max_pixel_ratio);
        camera.aspect = self.aspect();
        camera.update_projection_matrix();
        self.surface_size()
    }
}

//! Fixed settings for the demo. Everything tunable at compile time lives here
//! so the scene builder, camera, panel and recorder read from one place.

use glam::{Vec2, Vec3};

use crate::material::Color;

#[derive(Debug, Clone, PartialEq)]
pub struct PlaneConfig {
    pub width: f32,
    pub height: f32,
    pub width_segments: u32,
    pub height_segments: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlsConfig {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
}

/// Slider range shared by both frequency axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaptureConfig {
    /// Container name, also used as the download file extension.
    pub format: &'static str,
    pub mime_type: &'static str,
    pub framerate: u32,
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DemoConfig {
    pub plane: PlaneConfig,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    /// Multiplier from elapsed seconds to the `uTime` uniform.
    pub time_scale: f32,
    pub frequency: Vec2,
    pub frequency_range: SliderRange,
    pub color: Color,
    pub max_pixel_ratio: f64,
    pub canvas_selector: &'static str,
    pub texture_path: &'static str,
    pub capture: CaptureConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            plane: PlaneConfig {
                width: 1.0,
                height: 1.0,
                width_segments: 32,
                height_segments: 32,
            },
            camera: CameraConfig {
                fov: 75.0,
                near: 0.1,
                far: 100.0,
                position: Vec3::new(0.25, -0.25, 1.0),
                target: Vec3::ZERO,
            },
            controls: ControlsConfig {
                enable_damping: true,
                damping_factor: 0.05,
                rotate_speed: 1.0,
                zoom_speed: 1.0,
                pan_speed: 1.0,
            },
            time_scale: 3.0,
            frequency: Vec2::new(10.0, 5.0),
            frequency_range: SliderRange {
                min: 0.0,
                max: 20.0,
                step: 0.01,
            },
            color: Color::from_hex(0xffa500),
            max_pixel_ratio: 2.0,
            canvas_selector: "canvas.webgl",
            texture_path: "/textures/flag-french.jpg",
            capture: CaptureConfig {
                format: "webm",
                mime_type: "video/webm",
                framerate: 60,
                verbose: true,
            },
        }
    }
}

impl DemoConfig {
    /// Level handed to the console logger. Verbose capture in debug builds
    /// also reports every captured frame.
    pub fn log_level(&self) -> log::Level {
        if self.capture.verbose && cfg!(debug_assertions) {
            log::Level::Debug
        } else {
            log::Level::Info
        }
    }
}

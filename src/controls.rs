//! Orbit camera controls: drag to rotate around a target, wheel to dolly,
//! secondary drag to pan. With damping enabled, input accumulates into
//! pending deltas that `update` applies a fraction of every frame.

use std::f32::consts::PI;

use glam::Vec3;

use crate::camera::PerspectiveCamera;
use crate::config::ControlsConfig;

const EPS: f32 = 1e-6;

/// Spherical coordinates with +Y as the pole.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Spherical {
    radius: f32,
    /// Polar angle from +Y.
    phi: f32,
    /// Azimuth around +Y, measured from +Z.
    theta: f32,
}

impl Spherical {
    fn from_offset(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self::default();
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi_r = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_r * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_r * self.theta.cos(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    delta: Spherical,
    pan_offset: Vec3,
    scale: f32,
}

impl OrbitControls {
    pub fn new(config: &ControlsConfig, camera: &PerspectiveCamera) -> Self {
        Self {
            target: camera.target(),
            enable_damping: config.enable_damping,
            damping_factor: config.damping_factor,
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            pan_speed: config.pan_speed,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            delta: Spherical::default(),
            pan_offset: Vec3::ZERO,
            scale: 1.0,
        }
    }

    /// Pointer drag in CSS pixels. A drag across the full viewport height
    /// turns the camera one full revolution.
    pub fn rotate(&mut self, dx: f32, dy: f32, client_height: f32) {
        if client_height <= 0.0 {
            return;
        }
        self.delta.theta -= 2.0 * PI * dx / client_height * self.rotate_speed;
        self.delta.phi -= 2.0 * PI * dy / client_height * self.rotate_speed;
    }

    /// Wheel input. Negative `delta_y` moves toward the target.
    pub fn dolly(&mut self, delta_y: f32) {
        let step = 0.95f32.powf(self.zoom_speed);
        if delta_y < 0.0 {
            self.scale *= step;
        } else if delta_y > 0.0 {
            self.scale /= step;
        }
    }

    /// Screen-space pan so the point under the cursor tracks the pointer.
    pub fn pan(&mut self, dx: f32, dy: f32, client_height: f32, camera: &PerspectiveCamera) {
        if client_height <= 0.0 {
            return;
        }
        let offset = camera.position - self.target;
        let target_distance = offset.length() * (camera.fov.to_radians() / 2.0).tan();

        let forward = (-offset).normalize_or_zero();
        let right = forward.cross(camera.up).normalize_or_zero();
        let up = right.cross(forward);

        let left_amount = 2.0 * dx * target_distance / client_height * self.pan_speed;
        let up_amount = 2.0 * dy * target_distance / client_height * self.pan_speed;
        self.pan_offset += right * -left_amount + up * up_amount;
    }

    /// Applies pending input to `camera`. Returns true if the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let before = camera.position;
        let mut spherical = Spherical::from_offset(camera.position - self.target);

        let (rotate_gain, pan_gain) = if self.enable_damping {
            (self.damping_factor, self.damping_factor)
        } else {
            (1.0, 1.0)
        };
        spherical.theta += self.delta.theta * rotate_gain;
        spherical.phi += self.delta.phi * rotate_gain;
        spherical.phi = spherical
            .phi
            .clamp(self.min_polar_angle, self.max_polar_angle)
            .clamp(EPS, PI - EPS);

        self.target += self.pan_offset * pan_gain;

        spherical.radius =
            (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        camera.position = self.target + spherical.to_offset();
        camera.look_at(self.target);

        if self.enable_damping {
            let decay = 1.0 - self.damping_factor;
            self.delta.theta *= decay;
            self.delta.phi *= decay;
            self.pan_offset *= decay;
        } else {
            self.delta = Spherical::default();
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        before.distance_squared(camera.position) > EPS
    }
}

//! Shader material and its uniforms.

use glam::{Vec2, Vec3};

use crate::config::{DemoConfig, SliderRange};

pub const VERTEX_SHADER: &str = include_str!("shaders/vertex.glsl");
pub const FRAGMENT_SHADER: &str = include_str!("shaders/fragment.glsl");

/// Linear RGB triple in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color(pub Vec3);

impl Color {
    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xff) as f32 / 255.0;
        let g = ((hex >> 8) & 0xff) as f32 / 255.0;
        let b = (hex & 0xff) as f32 / 255.0;
        Color(Vec3::new(r, g, b))
    }

    pub fn to_array(self) -> [f32; 3] {
        self.0.to_array()
    }
}

/// Which faces are rasterised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Front,
    Back,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Image bound to `uTexture`. The pixels themselves live on the GPU side.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureRef {
    pub path: String,
    pub unit: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialUniforms {
    frequency: Vec2,
    pub time: f32,
    pub color: Color,
    pub texture: TextureRef,
    range: SliderRange,
}

impl MaterialUniforms {
    pub fn new(config: &DemoConfig) -> Self {
        let range = config.frequency_range;
        Self {
            frequency: Vec2::new(
                quantize(config.frequency.x, range),
                quantize(config.frequency.y, range),
            ),
            time: 0.0,
            color: config.color,
            texture: TextureRef {
                path: config.texture_path.to_string(),
                unit: 0,
            },
            range,
        }
    }

    pub fn frequency(&self) -> Vec2 {
        self.frequency
    }

    pub fn frequency_axis(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.frequency.x,
            Axis::Y => self.frequency.y,
        }
    }

    pub fn frequency_range(&self) -> SliderRange {
        self.range
    }

    /// Writes one frequency component. Out-of-range values are clamped and
    /// snapped to the slider step; NaN is rejected and leaves the uniform as
    /// it was. Returns the value now stored.
    pub fn set_frequency(&mut self, axis: Axis, value: f32) -> f32 {
        let slot = match axis {
            Axis::X => &mut self.frequency.x,
            Axis::Y => &mut self.frequency.y,
        };
        if !value.is_nan() {
            *slot = quantize(value, self.range);
        }
        *slot
    }
}

fn quantize(value: f32, range: SliderRange) -> f32 {
    let clamped = value.clamp(range.min, range.max);
    if range.step <= 0.0 {
        return clamped;
    }
    let steps = ((clamped - range.min) / range.step).round();
    (range.min + steps * range.step).clamp(range.min, range.max)
}

/// Shader-driven material: GLSL sources plus live uniforms.
#[derive(Debug, Clone)]
pub struct ShaderMaterial {
    pub vertex_shader: &'static str,
    pub fragment_shader: &'static str,
    pub side: Side,
    pub uniforms: MaterialUniforms,
}

impl ShaderMaterial {
    pub fn new(config: &DemoConfig) -> Self {
        Self {
            vertex_shader: VERTEX_SHADER,
            fragment_shader: FRAGMENT_SHADER,
            side: Side::Double,
            uniforms: MaterialUniforms::new(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniforms() -> MaterialUniforms {
        MaterialUniforms::new(&DemoConfig::default())
    }

    #[test]
    fn defaults() {
        let u = uniforms();
        assert_eq!(u.frequency(), Vec2::new(10.0, 5.0));
        assert_eq!(u.time, 0.0);
        assert_eq!(u.texture.path, "/textures/flag-french.jpg");
        let [r, g, b] = u.color.to_array();
        assert_eq!(r, 1.0);
        assert!((g - 165.0 / 255.0).abs() < 1e-6);
        assert_eq!(b, 0.0);
    }

    #[test]
    fn frequency_is_clamped() {
        let mut u = uniforms();
        assert_eq!(u.set_frequency(Axis::X, 25.0), 20.0);
        assert_eq!(u.set_frequency(Axis::Y, -3.0), 0.0);
        assert_eq!(u.frequency(), Vec2::new(20.0, 0.0));
    }

    #[test]
    fn frequency_snaps_to_step() {
        let mut u = uniforms();
        let v = u.set_frequency(Axis::X, 3.14159);
        assert!((v - 3.14).abs() < 1e-4, "{v}");
        assert_eq!(u.frequency().y, 5.0);
    }

    #[test]
    fn nan_is_rejected() {
        let mut u = uniforms();
        assert_eq!(u.set_frequency(Axis::Y, f32::NAN), 5.0);
        assert_eq!(u.frequency().y, 5.0);
    }

    #[test]
    fn material_is_double_sided() {
        let m = ShaderMaterial::new(&DemoConfig::default());
        assert_eq!(m.side, Side::Double);
        for name in ["uFrequency", "uTime", "uColor", "uTexture"] {
            assert!(
                m.vertex_shader.contains(name) || m.fragment_shader.contains(name),
                "{name} not declared"
            );
        }
        assert!(m.vertex_shader.contains("aRandom"));
    }
}

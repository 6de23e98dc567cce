//! Plane geometry and per-vertex attributes.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use rand::Rng;

/// Name of the per-vertex random attribute consumed by the vertex shader.
pub const RANDOM_ATTRIBUTE: &str = "aRandom";

/// A flat, indexed plane in the XY plane facing +Z, subdivided into a grid.
#[derive(Debug, Clone)]
pub struct PlaneGeometry {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
    attributes: Vec<FloatAttribute>,
}

/// A named scalar attribute with one value per vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatAttribute {
    pub name: &'static str,
    pub values: Vec<f32>,
}

/// Interleaved layout uploaded to the GPU. Only what the shader reads is
/// packed; normals stay on the CPU side.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub random: f32,
}

impl Vertex {
    pub const STRIDE: i32 = std::mem::size_of::<Vertex>() as i32;
    pub const POSITION_OFFSET: i32 = 0;
    pub const UV_OFFSET: i32 = 12;
    pub const RANDOM_OFFSET: i32 = 20;
}

impl PlaneGeometry {
    /// Builds a `width` x `height` plane centred on the origin. Rows run from
    /// the top edge down, so uv (0, 1) sits at the top-left corner.
    pub fn new(width: f32, height: f32, width_segments: u32, height_segments: u32) -> Self {
        let grid_x = width_segments.max(1);
        let grid_y = height_segments.max(1);
        let grid_x1 = grid_x + 1;
        let grid_y1 = grid_y + 1;

        let half_w = width / 2.0;
        let half_h = height / 2.0;
        let seg_w = width / grid_x as f32;
        let seg_h = height / grid_y as f32;

        let count = (grid_x1 * grid_y1) as usize;
        let mut positions = Vec::with_capacity(count);
        let mut normals = Vec::with_capacity(count);
        let mut uvs = Vec::with_capacity(count);

        for iy in 0..grid_y1 {
            let y = iy as f32 * seg_h - half_h;
            for ix in 0..grid_x1 {
                let x = ix as f32 * seg_w - half_w;
                positions.push(Vec3::new(x, -y, 0.0));
                normals.push(Vec3::Z);
                uvs.push(Vec2::new(
                    ix as f32 / grid_x as f32,
                    1.0 - iy as f32 / grid_y as f32,
                ));
            }
        }

        let mut indices = Vec::with_capacity((grid_x * grid_y * 6) as usize);
        for iy in 0..grid_y {
            for ix in 0..grid_x {
                let a = ix + grid_x1 * iy;
                let b = ix + grid_x1 * (iy + 1);
                let c = (ix + 1) + grid_x1 * (iy + 1);
                let d = (ix + 1) + grid_x1 * iy;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        Self {
            positions,
            normals,
            uvs,
            indices,
            attributes: Vec::new(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Attaches (or replaces) a named attribute. Returns `false` and leaves
    /// the geometry untouched when the value count does not match.
    pub fn set_attribute(&mut self, name: &'static str, values: Vec<f32>) -> bool {
        if values.len() != self.vertex_count() {
            return false;
        }
        self.attributes.retain(|a| a.name != name);
        self.attributes.push(FloatAttribute { name, values });
        true
    }

    pub fn attribute(&self, name: &str) -> Option<&FloatAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Fills `aRandom` with one independent uniform sample in [0, 1) per vertex.
    pub fn fill_random_attribute<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let values = (0..self.vertex_count()).map(|_| rng.gen::<f32>()).collect();
        self.set_attribute(RANDOM_ATTRIBUTE, values);
    }

    /// Packs every vertex for upload. Vertices without a random value get 0.
    pub fn interleaved(&self) -> Vec<Vertex> {
        let randoms = self.attribute(RANDOM_ATTRIBUTE).map(|a| a.values.as_slice());
        (0..self.vertex_count())
            .map(|i| Vertex {
                position: self.positions[i].to_array(),
                uv: self.uvs[i].to_array(),
                random: randoms.map_or(0.0, |r| r[i]),
            })
            .collect()
    }
}

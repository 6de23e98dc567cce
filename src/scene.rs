//! Builds the single mesh drawn by the demo.

use glam::Mat4;
use rand::Rng;

use crate::config::DemoConfig;
use crate::geometry::PlaneGeometry;
use crate::material::ShaderMaterial;

#[derive(Debug, Clone)]
pub struct Mesh {
    pub geometry: PlaneGeometry,
    pub material: ShaderMaterial,
    pub model_matrix: Mat4,
}

/// Plane + random attribute + shader material. Only the random attribute
/// depends on `rng`; everything else comes straight from `config`.
pub fn build_mesh<R: Rng + ?Sized>(config: &DemoConfig, rng: &mut R) -> Mesh {
    let plane = &config.plane;
    let mut geometry = PlaneGeometry::new(
        plane.width,
        plane.height,
        plane.width_segments,
        plane.height_segments,
    );
    geometry.fill_random_attribute(rng);

    log::info!(
        "built plane: {} vertices, {} triangles",
        geometry.vertex_count(),
        geometry.indices.len() / 3
    );

    Mesh {
        geometry,
        material: ShaderMaterial::new(config),
        model_matrix: Mat4::IDENTITY,
    }
}

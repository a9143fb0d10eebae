//! Procedural ground meshes for the examples.
use anyhow::Result;
use detail_scatter::prelude::*;
use glam::{Vec2, Vec3};

/// Height and blend-alpha functions sampled on a regular XZ grid.
pub trait Heightfield {
    fn height(&self, x: f32, z: f32) -> f32;

    /// Group blend alpha at a grid vertex.
    fn alpha(&self, _x: f32, _z: f32) -> f32 {
        1.0
    }
}

/// Triangulates `field` over a centered `extent`, winding every triangle upward.
pub fn heightfield(
    field: &impl Heightfield,
    extent: Vec2,
    subdivisions: u32,
) -> Result<GroundMesh> {
    let n = subdivisions.max(1);
    let cell = extent / n as f32;
    let min = -extent * 0.5;
    let vertex = |ix: u32, iz: u32| {
        let x = min.x + ix as f32 * cell.x;
        let z = min.y + iz as f32 * cell.y;
        (Vec3::new(x, field.height(x, z), z), field.alpha(x, z))
    };

    let quads = (n * n) as usize;
    let mut positions = Vec::with_capacity(quads * 6);
    let mut alphas = Vec::with_capacity(quads * 6);
    for iz in 0..n {
        for ix in 0..n {
            let p00 = vertex(ix, iz);
            let p10 = vertex(ix + 1, iz);
            let p01 = vertex(ix, iz + 1);
            let p11 = vertex(ix + 1, iz + 1);
            for (p, a) in [p00, p01, p10, p10, p01, p11] {
                positions.push(p);
                alphas.push(a);
            }
        }
    }

    Ok(GroundMesh::from_vec3(positions)?.with_alphas(alphas)?)
}

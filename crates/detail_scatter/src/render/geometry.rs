//! Procedural prop geometry.
//!
//! Sprites are a single quad in the local XY plane facing +Z. Shapes are three copies of
//! that quad spun 120° apart about the local Y axis; the `Tri` variant additionally tilts
//! each quad about X and pushes it out along Z before spinning. Models get a low-poly
//! stand-in sphere.
//!
//! Meshes are non-indexed: six vertices per quad, in the same order for every quad, so
//! UVs can be rewritten in place without touching positions.
use std::f32::consts::{PI, TAU};

use glam::{Mat4, Vec2, Vec3};

use crate::detail::{
    DetailProp, PivotRect, PropKind, ShapeProp, ShapeVariant, SpriteBound, SpriteProp,
};

pub const VERTICES_PER_QUAD: usize = 6;

/// Triangle-list mesh with positions and texture coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropMesh {
    positions: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
}

impl PropMesh {
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn uvs(&self) -> &[[f32; 2]] {
        &self.uvs
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Rewrites the UVs of every quad from `bound`, leaving positions untouched.
    pub fn rewrite_uvs(&mut self, bound: &SpriteBound, fallback_width: f32) {
        let rect = sprite_uvs(bound, fallback_width);
        for quad in self.uvs.chunks_exact_mut(VERTICES_PER_QUAD) {
            quad.copy_from_slice(&rect.quad_uvs());
        }
    }

    fn push_quad(&mut self, extent: QuadExtent, rect: UvRect, transform: Mat4) {
        for corner in extent.corners() {
            let p = transform.transform_point3(Vec3::new(corner.x, corner.y, 0.0));
            self.positions.push(p.to_array());
        }
        self.uvs.extend_from_slice(&rect.quad_uvs());
    }

    /// Axis-aligned bounds of all vertices, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.positions.iter().map(|p| Vec3::from_array(*p));
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }
}

/// Normalized texture rectangle; `min` is the top-left corner in image space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UvRect {
    pub min: Vec2,
    pub max: Vec2,
}

impl UvRect {
    fn quad_uvs(&self) -> [[f32; 2]; VERTICES_PER_QUAD] {
        let (a, b) = (self.min, self.max);
        [
            [a.x, a.y],
            [a.x, b.y],
            [b.x, b.y],
            [a.x, a.y],
            [b.x, b.y],
            [b.x, a.y],
        ]
    }
}

/// Local-space rectangle of a sprite quad: `top_left` and `bottom_right` corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadExtent {
    pub top_left: Vec2,
    pub bottom_right: Vec2,
}

impl QuadExtent {
    fn corners(&self) -> [Vec2; VERTICES_PER_QUAD] {
        let (a, b) = (self.top_left, self.bottom_right);
        [
            a,
            Vec2::new(a.x, b.y),
            b,
            a,
            b,
            Vec2::new(b.x, a.y),
        ]
    }
}

/// UV crop of a sprite, inset half a texel on each edge.
///
/// `fallback_width` is used when the bound does not carry its own image width. A
/// non-positive width yields an empty rectangle.
pub fn sprite_uvs(bound: &SpriteBound, fallback_width: f32) -> UvRect {
    let width = if bound.image_width > 0.0 {
        bound.image_width
    } else {
        fallback_width
    };
    if width <= 0.0 {
        return UvRect::default();
    }
    UvRect {
        min: Vec2::new((bound.x + 0.5) / width, (bound.y + 0.5) / width),
        max: Vec2::new(
            (bound.x + bound.w - 0.5) / width,
            (bound.y + bound.h - 0.5) / width,
        ),
    }
}

/// Quad rectangle for a sprite size, offset so the pivot sits at the local origin.
pub fn sprite_extent(size: &PivotRect) -> QuadExtent {
    let ox = size.w * size.x;
    let oy = size.h * size.y;
    QuadExtent {
        top_left: Vec2::new(-ox, size.h - oy),
        bottom_right: Vec2::new(size.w - ox, -oy),
    }
}

pub fn sprite_mesh(sprite: &SpriteProp, fallback_width: f32) -> PropMesh {
    let mut mesh = PropMesh::default();
    mesh.push_quad(
        sprite_extent(&sprite.size),
        sprite_uvs(&sprite.bound, fallback_width),
        Mat4::IDENTITY,
    );
    mesh
}

pub fn shape_mesh(shape: &ShapeProp, fallback_width: f32) -> PropMesh {
    let extent = sprite_extent(&shape.sprite.size);
    let rect = sprite_uvs(&shape.sprite.bound, fallback_width);

    let local = match shape.shape.variant {
        ShapeVariant::Tri => {
            Mat4::from_translation(Vec3::new(
                0.0,
                0.0,
                shape.shape.radius * shape.sprite.size.w,
            )) * Mat4::from_rotation_x(shape.shape.angle.to_radians())
        }
        ShapeVariant::Cross => Mat4::IDENTITY,
    };

    let mut mesh = PropMesh::default();
    for k in 0..3 {
        let spin = Mat4::from_rotation_y(k as f32 * TAU / 3.0);
        mesh.push_quad(extent, rect, spin * local);
    }
    mesh
}

/// Low-poly UV sphere used in place of model geometry.
pub fn placeholder_sphere(radius: f32, segments: u32) -> PropMesh {
    let lon = segments.max(3);
    let lat = segments.max(2);
    let vertex = |i: u32, j: u32| -> ([f32; 3], [f32; 2]) {
        let theta = i as f32 / lat as f32 * PI;
        let phi = j as f32 / lon as f32 * TAU;
        let p = Vec3::new(
            -radius * phi.cos() * theta.sin(),
            radius * theta.cos(),
            radius * phi.sin() * theta.sin(),
        );
        (p.to_array(), [j as f32 / lon as f32, 1.0 - i as f32 / lat as f32])
    };

    let mut mesh = PropMesh::default();
    for i in 0..lat {
        for j in 0..lon {
            let a = vertex(i, j);
            let b = vertex(i + 1, j);
            let c = vertex(i + 1, j + 1);
            let d = vertex(i, j + 1);
            for (p, uv) in [a, b, d, b, c, d] {
                mesh.positions.push(p);
                mesh.uvs.push(uv);
            }
        }
    }
    mesh
}

/// Builds the shared mesh for one prop definition.
pub fn build_prop_mesh(
    prop: &DetailProp,
    fallback_width: f32,
    placeholder_radius: f32,
    placeholder_segments: u32,
) -> PropMesh {
    match &prop.kind {
        PropKind::Sprite(sprite) => sprite_mesh(sprite, fallback_width),
        PropKind::Shape(shape) => shape_mesh(shape, fallback_width),
        PropKind::Model(_) => placeholder_sphere(placeholder_radius, placeholder_segments),
    }
}

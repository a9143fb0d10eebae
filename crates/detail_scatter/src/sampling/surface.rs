//! Area-weighted sampling over a triangulated ground surface.
//!
//! Each triangle receives `area × density × density_scale` samples (truncated by
//! default). Sample points are drawn as a `(u, v)` pair over the parallelogram spanned
//! by the triangle's edges and folded back into the triangle when `u + v > 1`.
use glam::{Vec2, Vec3};
use tracing::warn;

use crate::error::{Error, Result};
use crate::sampling::SampleSource;

/// Converts editor density values to instances per square world unit.
pub const DEFAULT_DENSITY_SCALE: f64 = 1.0e-6;

/// Alpha reported for samples on meshes without a per-vertex alpha channel.
pub const DEFAULT_ALPHA: f32 = 1.0;

/// How a fractional expected sample count becomes a loop count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SampleRounding {
    /// Drop the fractional part. An expected count of 2.9 always yields 2.
    #[default]
    Truncate,
    /// Round the fractional part up with matching probability. Consumes one extra
    /// draw per triangle.
    Stochastic,
}

/// Non-indexed triangle list: every three consecutive positions form one triangle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroundMesh {
    positions: Vec<Vec3>,
    alphas: Option<Vec<f32>>,
}

impl GroundMesh {
    /// Builds a mesh from any `mint`-compatible positions.
    pub fn from_positions<P, I>(positions: I) -> Result<Self>
    where
        P: Into<mint::Vector3<f32>>,
        I: IntoIterator<Item = P>,
    {
        let positions = positions
            .into_iter()
            .map(|p| Vec3::from(p.into()))
            .collect();
        Self::from_vec3(positions)
    }

    pub fn from_vec3(positions: Vec<Vec3>) -> Result<Self> {
        if positions.len() % 3 != 0 {
            return Err(Error::InvalidMesh(format!(
                "vertex count {} is not a multiple of 3",
                positions.len()
            )));
        }
        Ok(Self {
            positions,
            alphas: None,
        })
    }

    /// Attaches a per-vertex alpha channel used for group blending.
    pub fn with_alphas(mut self, alphas: Vec<f32>) -> Result<Self> {
        if alphas.len() != self.positions.len() {
            return Err(Error::InvalidMesh(format!(
                "alpha count {} does not match vertex count {}",
                alphas.len(),
                self.positions.len()
            )));
        }
        self.alphas = Some(alphas);
        Ok(self)
    }

    /// A flat ground patch in the XZ plane centered at the origin, split into
    /// `subdivisions × subdivisions` cells of two upward-facing triangles each.
    pub fn plane(extent: Vec2, subdivisions: u32) -> Self {
        let n = subdivisions.max(1);
        let cell = extent / n as f32;
        let min = -extent * 0.5;
        let mut positions = Vec::with_capacity((n * n * 6) as usize);
        for iz in 0..n {
            for ix in 0..n {
                let x0 = min.x + ix as f32 * cell.x;
                let z0 = min.y + iz as f32 * cell.y;
                let x1 = x0 + cell.x;
                let z1 = z0 + cell.y;
                let p00 = Vec3::new(x0, 0.0, z0);
                let p10 = Vec3::new(x1, 0.0, z0);
                let p01 = Vec3::new(x0, 0.0, z1);
                let p11 = Vec3::new(x1, 0.0, z1);
                positions.extend_from_slice(&[p00, p01, p10, p10, p01, p11]);
            }
        }
        Self {
            positions,
            alphas: None,
        }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn alphas(&self) -> Option<&[f32]> {
        self.alphas.as_deref()
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn triangle(&self, index: usize) -> Option<Triangle> {
        let base = index.checked_mul(3)?;
        let p = self.positions.get(base..base + 3)?;
        let alphas = self
            .alphas
            .as_ref()
            .and_then(|a| a.get(base..base + 3))
            .map(|a| [a[0], a[1], a[2]]);
        Some(Triangle {
            a: p[0],
            b: p[1],
            c: p[2],
            alphas,
        })
    }

    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.triangle_count()).filter_map(move |i| self.triangle(i))
    }

    /// Total surface area of all triangles.
    pub fn area(&self) -> f32 {
        self.triangles().map(|t| t.area()).sum()
    }
}

/// One ground triangle with optional per-corner alpha.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
    pub alphas: Option<[f32; 3]>,
}

impl Triangle {
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self {
            a,
            b,
            c,
            alphas: None,
        }
    }

    /// Edge vectors from the first vertex.
    #[inline]
    pub fn edges(&self) -> (Vec3, Vec3) {
        (self.b - self.a, self.c - self.a)
    }

    pub fn area(&self) -> f32 {
        let (e1, e2) = self.edges();
        0.5 * e1.cross(e2).length()
    }

    /// Unit normal oriented towards world up. Zero for degenerate triangles.
    pub fn up_normal(&self) -> Vec3 {
        let (e1, e2) = self.edges();
        let n = e1.cross(e2).normalize_or_zero();
        if n.y < 0.0 {
            -n
        } else {
            n
        }
    }

    /// Angle between the surface normal and world up, in degrees.
    pub fn slope_degrees(&self) -> f32 {
        let n = self.up_normal();
        if n == Vec3::ZERO {
            return 0.0;
        }
        n.y.clamp(-1.0, 1.0).acos().to_degrees()
    }

    #[inline]
    pub fn point_at(&self, u: f32, v: f32) -> Vec3 {
        let (e1, e2) = self.edges();
        self.a + e1 * u + e2 * v
    }

    #[inline]
    pub fn alpha_at(&self, u: f32, v: f32) -> f32 {
        match self.alphas {
            Some([a0, a1, a2]) => a0 + (a1 - a0) * u + (a2 - a0) * v,
            None => DEFAULT_ALPHA,
        }
    }

    /// Draws one uniformly distributed point on the triangle. Consumes two draws.
    pub fn draw_sample<S: SampleSource + ?Sized>(
        &self,
        index: usize,
        rng: &mut S,
    ) -> SurfaceSample {
        let mut u = rng.next_sample();
        let mut v = rng.next_sample();
        if u + v > 1.0 {
            u = 1.0 - u;
            v = 1.0 - v;
        }
        SurfaceSample {
            triangle: index,
            u,
            v,
            position: self.point_at(u, v),
            normal: self.up_normal(),
            alpha: self.alpha_at(u, v),
        }
    }
}

/// A point on the ground surface with the barycentric coordinates it was drawn at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceSample {
    pub triangle: usize,
    pub u: f32,
    pub v: f32,
    pub position: Vec3,
    pub normal: Vec3,
    pub alpha: f32,
}

/// Number of samples to take on a triangle of the given area.
///
/// [`SampleRounding::Stochastic`] consumes one draw; [`SampleRounding::Truncate`] none.
pub fn sample_count<S: SampleSource + ?Sized>(
    area: f32,
    density: f32,
    density_scale: f64,
    rounding: SampleRounding,
    rng: &mut S,
) -> usize {
    let expected = area as f64 * density as f64 * density_scale;
    if !expected.is_finite() || expected <= 0.0 {
        if rounding == SampleRounding::Stochastic {
            rng.skip();
        }
        if !expected.is_finite() {
            warn!("Non-finite expected sample count ({expected}); taking no samples.");
        }
        return 0;
    }
    let whole = expected.trunc();
    match rounding {
        SampleRounding::Truncate => whole as usize,
        SampleRounding::Stochastic => {
            let frac = expected - whole;
            let extra = (rng.next_sample() as f64) < frac;
            whole as usize + usize::from(extra)
        }
    }
}

/// Samples every triangle of `mesh` at `density`, returning the points in triangle order.
pub fn sample_surface<S: SampleSource + ?Sized>(
    mesh: &GroundMesh,
    density: f32,
    density_scale: f64,
    rounding: SampleRounding,
    rng: &mut S,
) -> Vec<SurfaceSample> {
    let mut out = Vec::new();
    for (index, tri) in mesh.triangles().enumerate() {
        let count = sample_count(tri.area(), density, density_scale, rounding, rng);
        out.reserve(count);
        for _ in 0..count {
            out.push(tri.draw_sample(index, rng));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::sampling::SampleStream;

    fn right_triangle() -> GroundMesh {
        GroundMesh::from_vec3(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 10.0),
        ])
        .unwrap()
    }

    /// Barycentric weights of `p` relative to `tri`, computed independently of `u, v`.
    fn barycentric(tri: &Triangle, p: Vec3) -> (f32, f32, f32) {
        let (e1, e2) = tri.edges();
        let d = p - tri.a;
        let d11 = e1.dot(e1);
        let d12 = e1.dot(e2);
        let d22 = e2.dot(e2);
        let dp1 = d.dot(e1);
        let dp2 = d.dot(e2);
        let denom = d11 * d22 - d12 * d12;
        let v = (d22 * dp1 - d12 * dp2) / denom;
        let w = (d11 * dp2 - d12 * dp1) / denom;
        (1.0 - v - w, v, w)
    }

    #[test]
    fn rejects_partial_triangles() {
        let err = GroundMesh::from_vec3(vec![Vec3::ZERO; 4]).unwrap_err();
        assert!(matches!(err, Error::InvalidMesh(_)));
    }

    #[test]
    fn rejects_mismatched_alpha_channel() {
        let err = right_triangle().with_alphas(vec![1.0; 2]).unwrap_err();
        assert!(matches!(err, Error::InvalidMesh(_)));
    }

    #[test]
    fn from_positions_accepts_mint_vectors() {
        let mesh = GroundMesh::from_positions([
            mint::Vector3 { x: 0.0, y: 0.0, z: 0.0 },
            mint::Vector3 { x: 1.0, y: 0.0, z: 0.0 },
            mint::Vector3 { x: 0.0, y: 0.0, z: 1.0 },
        ])
        .unwrap();
        assert_eq!(mesh.triangle_count(), 1);
    }

    fn truncated(mesh: &GroundMesh, density: f32, stream: &mut SampleStream) -> Vec<SurfaceSample> {
        sample_surface(mesh, density, DEFAULT_DENSITY_SCALE, SampleRounding::Truncate, stream)
    }

    #[test]
    fn area_and_upward_normal() {
        let tri = right_triangle().triangle(0).unwrap();
        assert_eq!(tri.area(), 50.0);
        assert_eq!(tri.up_normal(), Vec3::Y);
        assert_eq!(tri.slope_degrees(), 0.0);
    }

    #[test]
    fn plane_covers_extent_and_faces_up() {
        let mesh = GroundMesh::plane(Vec2::new(128.0, 64.0), 4);
        assert_eq!(mesh.triangle_count(), 32);
        assert!((mesh.area() - 128.0 * 64.0).abs() < 1e-2);
        for tri in mesh.triangles() {
            let (e1, e2) = tri.edges();
            assert!(e1.cross(e2).y > 0.0);
        }
    }

    #[test]
    fn truncates_fractional_counts() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut count = |area, density| {
            sample_count(area, density, DEFAULT_DENSITY_SCALE, SampleRounding::Truncate, &mut rng)
        };
        assert_eq!(count(29.0, 100_000.0), 2);
        assert_eq!(count(50.0, 20_000.0), 1);
    }

    #[test]
    fn zero_density_and_zero_area_take_no_samples() {
        let mut stream = SampleStream::default();
        let mesh = right_triangle();
        assert!(truncated(&mesh, 0.0, &mut stream).is_empty());
        assert_eq!(stream.draws(), 0);

        let flat = GroundMesh::from_vec3(vec![Vec3::ZERO, Vec3::X, Vec3::X * 2.0]).unwrap();
        assert!(truncated(&flat, 1.0e9, &mut stream).is_empty());
    }

    #[test]
    fn samples_stay_inside_their_triangle() {
        let mesh = GroundMesh::from_vec3(vec![
            Vec3::new(-3.0, 1.0, 2.0),
            Vec3::new(7.0, 4.0, -1.0),
            Vec3::new(2.0, -2.0, 9.0),
        ])
        .unwrap();
        let tri = mesh.triangle(0).unwrap();
        let mut stream = SampleStream::new(11, 0);
        let samples = truncated(&mesh, 20_000_000.0, &mut stream);
        assert!(samples.len() > 100);
        for s in samples {
            assert!(s.u >= 0.0 && s.v >= 0.0 && s.u + s.v <= 1.0);
            let (w0, w1, w2) = barycentric(&tri, s.position);
            for w in [w0, w1, w2] {
                assert!((-1e-3..=1.0 + 1e-3).contains(&w), "weight {w} out of range");
            }
        }
    }

    #[test]
    fn sample_count_is_proportional_to_area() {
        let small = right_triangle();
        let large = GroundMesh::from_vec3(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(20.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 20.0),
        ])
        .unwrap();
        let mut stream = SampleStream::default();
        let a = truncated(&small, 200_000.0, &mut stream).len();
        let b = truncated(&large, 200_000.0, &mut stream).len();
        assert_eq!(a, 10);
        assert_eq!(b, 40);
    }

    #[test]
    fn stochastic_rounding_converges_to_expected_count() {
        // Expected 50 * 25_000 * 1e-6 = 1.25 samples per pass.
        let mesh = right_triangle();
        let mut stream = SampleStream::new(3, 0);
        let trials = 4000;
        let mut total = 0usize;
        for _ in 0..trials {
            let rounding = SampleRounding::Stochastic;
            total +=
                sample_surface(&mesh, 25_000.0, DEFAULT_DENSITY_SCALE, rounding, &mut stream).len();
        }
        let mean = total as f64 / trials as f64;
        assert!((mean - 1.25).abs() < 0.05, "mean was {mean}");
    }

    #[test]
    fn alpha_is_interpolated_when_present() {
        let mesh = right_triangle().with_alphas(vec![0.0, 1.0, 0.5]).unwrap();
        let tri = mesh.triangle(0).unwrap();
        assert_eq!(tri.alpha_at(0.0, 0.0), 0.0);
        assert_eq!(tri.alpha_at(1.0, 0.0), 1.0);
        assert_eq!(tri.alpha_at(0.0, 1.0), 0.5);
        assert_eq!(right_triangle().triangle(0).unwrap().alpha_at(0.3, 0.3), DEFAULT_ALPHA);
    }
}

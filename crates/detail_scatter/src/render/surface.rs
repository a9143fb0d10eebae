//! The render surface: owns the sample stream and the batch set of one ground mesh.
//!
//! [`ScatterSurface::regenerate`] discards everything and rebuilds from scratch,
//! [`ScatterSurface::update_frame`] refreshes instance transforms every tick, and
//! [`ScatterSurface::update_geometry_only`] re-derives texture coordinates after a detail
//! edit without moving any instance.
use tracing::{debug, info, warn};

use crate::detail::Detail;
use crate::error::Result;
use crate::render::batch::{build_batches, InstanceBatch};
use crate::render::frame::CameraPose;
use crate::render::geometry::{placeholder_sphere, PropMesh};
use crate::sampling::{GroundMesh, SampleStream};
use crate::scatter::events::{ClearReason, EventSink, ScatterEvent, ScatterEventKind};
use crate::scatter::runner::{
    generate_placements_with_events, Placement, ScatterConfig, ScatterStats,
};

/// Texture bound to the ground material. Only its size matters here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetailMaterial {
    pub width: f32,
    pub height: f32,
}

impl DetailMaterial {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Scattered detail for one ground mesh.
#[derive(Debug, Clone)]
pub struct ScatterSurface {
    config: ScatterConfig,
    stream: SampleStream,
    batches: Vec<InstanceBatch>,
    models: Vec<Placement>,
    stats: ScatterStats,
    material_width: f32,
    placeholder: PropMesh,
}

impl ScatterSurface {
    pub fn try_new(config: ScatterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn new(config: ScatterConfig) -> Self {
        debug_assert!(
            config.density_scale.is_finite() && config.density_scale >= 0.0,
            "density_scale must be finite and >= 0"
        );
        debug_assert!(
            config.placeholder_radius > 0.0,
            "placeholder_radius must be > 0"
        );

        Self {
            stream: SampleStream::new(config.seed, config.start_index),
            placeholder: placeholder_sphere(
                config.placeholder_radius,
                config.placeholder_segments,
            ),
            config,
            batches: Vec::new(),
            models: Vec::new(),
            stats: ScatterStats::default(),
            material_width: 0.0,
        }
    }

    pub fn config(&self) -> &ScatterConfig {
        &self.config
    }

    pub fn batches(&self) -> &[InstanceBatch] {
        &self.batches
    }

    /// Placements of model props, which are not batched.
    pub fn model_placements(&self) -> &[Placement] {
        &self.models
    }

    /// Counters of the last regeneration.
    pub fn stats(&self) -> ScatterStats {
        self.stats
    }

    /// Stand-in mesh shared by all model placements.
    pub fn model_placeholder(&self) -> &PropMesh {
        &self.placeholder
    }

    /// Drops all batches and model placements.
    pub fn clear(&mut self) {
        self.batches.clear();
        self.models.clear();
        self.stats = ScatterStats::default();
    }

    /// Rebuilds all batches for `detail` on `mesh`.
    ///
    /// Any missing input leaves the surface empty. The sample stream is rewound first, so
    /// identical inputs always reproduce identical batches.
    pub fn regenerate(
        &mut self,
        detail: Option<&Detail>,
        mesh: Option<&GroundMesh>,
        material: Option<&DetailMaterial>,
    ) -> ScatterStats {
        self.regenerate_with_events(detail, mesh, material, &mut ())
    }

    pub fn regenerate_with_events(
        &mut self,
        detail: Option<&Detail>,
        mesh: Option<&GroundMesh>,
        material: Option<&DetailMaterial>,
        sink: &mut dyn EventSink,
    ) -> ScatterStats {
        self.clear();

        let (detail, mesh, material) = match (detail, mesh, material) {
            (None, _, _) => {
                debug!("No active detail; surface cleared.");
                return self.cleared(ClearReason::NoDetail, sink);
            }
            (Some(d), None, _) => {
                warn!("Detail '{}': no ground mesh set; surface cleared.", d.detail_type);
                return self.cleared(ClearReason::NoMesh, sink);
            }
            (Some(d), Some(_), None) => {
                warn!(
                    "Detail '{}': no ground material set; surface cleared.",
                    d.detail_type
                );
                return self.cleared(ClearReason::NoMaterial, sink);
            }
            (Some(d), Some(m), Some(t)) => (d, m, t),
        };

        self.stream.reset();
        self.material_width = material.width;

        let placements =
            generate_placements_with_events(detail, mesh, &self.config, &mut self.stream, sink);
        self.batches = build_batches(detail, &placements.sprites, material.width, sink);
        self.models = placements.models;
        self.stats = placements.stats;

        info!(
            "Detail '{}': {} batches, {} model placements, {} draws.",
            detail.detail_type,
            self.batches.len(),
            self.models.len(),
            self.stream.draws()
        );
        self.stats
    }

    fn cleared(&mut self, reason: ClearReason, sink: &mut dyn EventSink) -> ScatterStats {
        if sink.wants(ScatterEventKind::Cleared) {
            sink.send(ScatterEvent::Cleared { reason });
        }
        self.stats
    }

    /// Recomputes every instance transform for the current camera and time.
    pub fn update_frame(&mut self, camera: &CameraPose, elapsed: f32) {
        let frequency = self.config.sway_frequency;
        for batch in &mut self.batches {
            batch.update_transforms(camera, elapsed, frequency);
        }
    }

    /// Rewrites texture coordinates of existing batches from `detail`'s sprite bounds.
    ///
    /// Placement, slot assignment, and positions are left as they are.
    pub fn update_geometry_only(&mut self, detail: &Detail) {
        for batch in &mut self.batches {
            let Some(sprite) = detail.prop(batch.prop()).and_then(|p| p.sprite_params()) else {
                debug!(
                    "Batch {:?} has no sprite prop in '{}'.",
                    batch.prop(),
                    detail.detail_type
                );
                continue;
            };
            let bound = sprite.bound;
            batch.mesh_mut().rewrite_uvs(&bound, self.material_width);
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::detail::{
        DetailGroup, DetailProp, Orientation, PivotRect, PropRef, SpriteBound, SpriteProp,
    };
    use crate::error::Error;
    use crate::scatter::events::VecSink;

    fn sprite() -> SpriteProp {
        SpriteProp::new(
            SpriteBound::new(0.0, 0.0, 32.0, 64.0, 0.0),
            PivotRect::new(0.5, 0.0, 8.0, 16.0),
        )
    }

    fn triangle() -> GroundMesh {
        GroundMesh::from_vec3(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 10.0),
        ])
        .unwrap()
    }

    fn grass(density: f32, sprite: SpriteProp) -> Detail {
        Detail::new("grass", density).with_group(
            DetailGroup::new("g", 1.0).with_prop(DetailProp::sprite("blade", 1.0, sprite)),
        )
    }

    fn material() -> DetailMaterial {
        DetailMaterial::new(256.0, 256.0)
    }

    #[test]
    fn try_new_rejects_invalid_config() {
        let err = ScatterSurface::try_new(ScatterConfig::default().with_density_scale(f64::NAN))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn single_triangle_yields_one_instance_inside_it() {
        // 50 * 20_000 * 1e-6 = 1 sample.
        let detail = grass(20_000.0, sprite());
        let mesh = triangle();
        let mut surface = ScatterSurface::new(ScatterConfig::default());
        let stats = surface.regenerate(Some(&detail), Some(&mesh), Some(&material()));

        assert_eq!(stats.samples_evaluated, 1);
        assert_eq!(surface.batches().len(), 1);
        let batch = &surface.batches()[0];
        assert_eq!(batch.instance_count(), 1);
        assert_eq!(batch.prop(), PropRef::new(0, 0));

        let p = batch.placements()[0].position;
        assert_eq!(p.y, 0.0);
        assert!(p.x >= 0.0 && p.z >= 0.0 && p.x + p.z <= 10.0 + 1e-4, "{p:?}");
        let t = batch.transforms()[0];
        assert_eq!(t.w_axis.truncate(), p);
    }

    #[test]
    fn zero_density_builds_no_batches() {
        let detail = grass(0.0, sprite());
        let mesh = GroundMesh::plane(glam::Vec2::splat(64.0), 2);
        let mut surface = ScatterSurface::new(ScatterConfig::default());
        let stats = surface.regenerate(Some(&detail), Some(&mesh), Some(&material()));
        assert!(surface.batches().is_empty());
        assert_eq!(stats.placements(), 0);
    }

    #[test]
    fn regeneration_is_deterministic() {
        let detail = grass(200_000.0, sprite().with_random_scale(0.5));
        let mesh = GroundMesh::plane(glam::Vec2::splat(20.0), 2);
        let mut surface = ScatterSurface::new(ScatterConfig::new(42));

        surface.regenerate(Some(&detail), Some(&mesh), Some(&material()));
        let first = surface.batches()[0].transforms().to_vec();
        surface.regenerate(Some(&detail), Some(&mesh), Some(&material()));
        assert_eq!(surface.batches()[0].transforms(), first.as_slice());

        let mut other = ScatterSurface::new(ScatterConfig::new(42));
        other.regenerate(Some(&detail), Some(&mesh), Some(&material()));
        assert_eq!(other.batches()[0].transforms(), first.as_slice());
    }

    #[test]
    fn missing_inputs_clear_the_surface() {
        let detail = grass(200_000.0, sprite());
        let mesh = triangle();
        let mut surface = ScatterSurface::new(ScatterConfig::default());
        surface.regenerate(Some(&detail), Some(&mesh), Some(&material()));
        assert!(!surface.batches().is_empty());

        let cases = [
            (None, Some(&mesh), Some(material()), ClearReason::NoDetail),
            (Some(&detail), None, Some(material()), ClearReason::NoMesh),
            (Some(&detail), Some(&mesh), None, ClearReason::NoMaterial),
        ];
        for (d, m, t, reason) in cases {
            surface.regenerate(Some(&detail), Some(&mesh), Some(&material()));
            let mut sink = VecSink::only(&[ScatterEventKind::Cleared]);
            let stats = surface.regenerate_with_events(d, m, t.as_ref(), &mut sink);
            assert!(surface.batches().is_empty());
            assert!(surface.model_placements().is_empty());
            assert_eq!(stats, ScatterStats::default());
            assert!(matches!(
                sink.as_slice(),
                [ScatterEvent::Cleared { reason: r }] if *r == reason
            ));
        }
    }

    #[test]
    fn model_props_are_not_batched() {
        let detail = Detail::new("rocks", 200_000.0).with_group(
            DetailGroup::new("g", 1.0).with_prop(DetailProp::model("rock", 1.0, "rock.mdl")),
        );
        let config = ScatterConfig::default().with_placeholder(2.0, 6);
        let mut surface = ScatterSurface::new(config);
        surface.regenerate(Some(&detail), Some(&triangle()), Some(&material()));
        assert!(surface.batches().is_empty());
        assert_eq!(surface.model_placements().len(), 10);
        assert_eq!(surface.model_placeholder().vertex_count(), 6 * 6 * 6);
    }

    #[test]
    fn batch_events_are_reported() {
        let detail = grass(200_000.0, sprite());
        let mut surface = ScatterSurface::new(ScatterConfig::default());
        let mut sink = VecSink::only(&[ScatterEventKind::BatchBuilt]);
        let mesh = triangle();
        surface.regenerate_with_events(Some(&detail), Some(&mesh), Some(&material()), &mut sink);
        match sink.as_slice() {
            [ScatterEvent::BatchBuilt {
                instance_count,
                vertex_count,
                ..
            }] => {
                assert_eq!(*instance_count, 10);
                assert_eq!(*vertex_count, 6);
            }
            other => panic!("unexpected events {other:?}"),
        }
    }

    #[test]
    fn geometry_update_rewrites_uvs_only_and_is_idempotent() {
        let mut detail = grass(200_000.0, sprite());
        let mesh = triangle();
        let mut surface = ScatterSurface::new(ScatterConfig::default());
        surface.regenerate(Some(&detail), Some(&mesh), Some(&material()));
        let before_uvs = surface.batches()[0].mesh().uvs().to_vec();
        let positions = surface.batches()[0].mesh().positions().to_vec();
        let transforms = surface.batches()[0].transforms().to_vec();

        detail.groups[0].props[0] = DetailProp::sprite(
            "blade",
            1.0,
            SpriteProp {
                bound: SpriteBound::new(64.0, 0.0, 32.0, 64.0, 0.0),
                ..sprite()
            },
        );
        surface.update_geometry_only(&detail);
        let once = surface.batches()[0].mesh().uvs().to_vec();
        surface.update_geometry_only(&detail);

        let batch = &surface.batches()[0];
        assert_ne!(once, before_uvs);
        assert_eq!(batch.mesh().uvs(), once.as_slice());
        assert_eq!(batch.mesh().positions(), positions.as_slice());
        assert_eq!(batch.transforms(), transforms.as_slice());
        assert_eq!(once[0], [64.5 / 256.0, 0.5 / 256.0]);
    }

    #[test]
    fn frame_update_on_empty_surface_is_a_no_op() {
        let mut surface = ScatterSurface::new(ScatterConfig::default());
        surface.update_frame(&CameraPose::default(), 1.0);
        assert!(surface.batches().is_empty());
    }

    #[test]
    fn frame_update_turns_billboards_toward_camera() {
        let detail = grass(200_000.0, sprite().with_orientation(Orientation::ZAxis));
        let mut surface = ScatterSurface::new(ScatterConfig::default());
        surface.regenerate(Some(&detail), Some(&triangle()), Some(&material()));

        let camera = CameraPose::look_at(Vec3::new(50.0, 5.0, -30.0), Vec3::ZERO);
        surface.update_frame(&camera, 2.5);

        let batch = &surface.batches()[0];
        for (placement, m) in batch.placements().iter().zip(batch.transforms()) {
            let to_camera = camera.position - placement.position;
            let expected = Vec3::new(to_camera.x, 0.0, to_camera.z).normalize();
            let facing = m.transform_vector3(Vec3::Z).normalize();
            assert!((facing - expected).length() < 1e-4);
        }
    }

    #[test]
    fn surface_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<ScatterSurface>();
    }
}

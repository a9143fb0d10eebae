//! Placement generation over a ground mesh.
//!
//! For every surface sample the generator selects a group and a prop, draws a facing
//! angle and a scale factor, and buckets the resulting [`Placement`] as sprite-like or
//! model. Every sample consumes exactly [`DRAWS_PER_SAMPLE`] draws, so the stream cursor
//! after a pass depends only on the number of samples taken.
use std::f32::consts::TAU;

use glam::{Mat4, Quat, Vec3};
use tracing::{debug, info, warn};

use crate::detail::{Detail, PropKindTag, PropRef};
use crate::error::{Error, Result};
use crate::sampling::surface::{sample_count, DEFAULT_DENSITY_SCALE};
use crate::sampling::{GroundMesh, SampleRounding, SampleSource};
use crate::scatter::events::{DropReason, EventSink, ScatterEvent, ScatterEventKind};
use crate::scatter::selection::{select_group, select_prop};
use crate::scatter::DRAWS_PER_SAMPLE;

/// A placed instance of a prop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Prop this placement instantiates.
    pub prop: PropRef,
    /// World position on the ground surface.
    pub position: Vec3,
    /// Rotation about the placement's up axis, in radians within `[0, 2π)`.
    pub facing_angle: f32,
    /// Uniform scale factor.
    pub scale: f32,
    /// Up axis of the placement: world up for upright props, the surface normal otherwise.
    pub normal: Vec3,
    /// Alpha sample used for group selection.
    pub alpha: f32,
}

impl Placement {
    /// Static orientation: tilt to `normal`, then yaw by `facing_angle`.
    pub fn base_rotation(&self) -> Quat {
        let yaw = Quat::from_rotation_y(self.facing_angle);
        let up = self.normal.normalize_or_zero();
        if up == Vec3::ZERO || up == Vec3::Y {
            yaw
        } else {
            Quat::from_rotation_arc(Vec3::Y, up) * yaw
        }
    }

    /// Transform written into an instance slot when a batch is first built.
    pub fn initial_transform(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.base_rotation(), self.position)
    }
}

/// Configuration for scattering passes and the render surface.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterConfig {
    /// Seed of the sample stream.
    pub seed: u64,
    /// Cursor position the sample stream rewinds to before each pass.
    pub start_index: u64,
    /// Multiplier turning detail density into instances per square world unit.
    pub density_scale: f64,
    /// Rounding of fractional per-triangle sample counts.
    pub rounding: SampleRounding,
    /// Angular frequency of sway oscillation, in radians per second.
    pub sway_frequency: f32,
    /// Radius of the stand-in sphere used for model placements.
    pub placeholder_radius: f32,
    /// Longitude/latitude segment count of the stand-in sphere.
    pub placeholder_segments: u32,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            seed: crate::sampling::stream::DEFAULT_SEED,
            start_index: 0,
            density_scale: DEFAULT_DENSITY_SCALE,
            rounding: SampleRounding::Truncate,
            sway_frequency: 0.5,
            placeholder_radius: 4.0,
            placeholder_segments: 8,
        }
    }
}

impl ScatterConfig {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// Sets the stream start index.
    pub fn with_start_index(mut self, start_index: u64) -> Self {
        self.start_index = start_index;
        self
    }

    /// Sets the density scale.
    pub fn with_density_scale(mut self, density_scale: f64) -> Self {
        self.density_scale = density_scale;
        self
    }

    /// Sets the sample count rounding mode.
    pub fn with_rounding(mut self, rounding: SampleRounding) -> Self {
        self.rounding = rounding;
        self
    }

    /// Sets the sway frequency.
    pub fn with_sway_frequency(mut self, sway_frequency: f32) -> Self {
        self.sway_frequency = sway_frequency;
        self
    }

    /// Sets the stand-in sphere used for model placements.
    pub fn with_placeholder(mut self, radius: f32, segments: u32) -> Self {
        self.placeholder_radius = radius;
        self.placeholder_segments = segments;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if !self.density_scale.is_finite() || self.density_scale < 0.0 {
            return Err(Error::InvalidConfig(
                "density_scale must be finite and >= 0".into(),
            ));
        }
        if !self.sway_frequency.is_finite() {
            return Err(Error::InvalidConfig("sway_frequency must be finite".into()));
        }
        if self.placeholder_radius.is_nan() || self.placeholder_radius <= 0.0 {
            return Err(Error::InvalidConfig(
                "placeholder_radius must be > 0".into(),
            ));
        }
        if self.placeholder_segments < 3 {
            return Err(Error::InvalidConfig(
                "placeholder_segments must be >= 3".into(),
            ));
        }

        Ok(())
    }
}

/// Counters for one scattering pass.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScatterStats {
    /// Triangles visited.
    pub triangles: usize,
    /// Surface samples drawn.
    pub samples_evaluated: usize,
    /// Samples dropped because no group or prop was selected.
    pub samples_dropped: usize,
    /// Samples rejected by the selected prop's slope range.
    pub samples_rejected_by_slope: usize,
    /// Placements bucketed for instanced sprite rendering.
    pub sprite_placements: usize,
    /// Placements bucketed as models.
    pub model_placements: usize,
}

impl ScatterStats {
    pub fn placements(&self) -> usize {
        self.sprite_placements + self.model_placements
    }
}

/// Output of a scattering pass, bucketed by render path.
#[derive(Debug, Clone, Default)]
pub struct PlacementSet {
    pub sprites: Vec<Placement>,
    pub models: Vec<Placement>,
    pub stats: ScatterStats,
}

impl PlacementSet {
    pub fn len(&self) -> usize {
        self.sprites.len() + self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty() && self.models.is_empty()
    }
}

/// Scatters `detail` over `mesh`, drawing from `rng`.
pub fn generate_placements<S: SampleSource + ?Sized>(
    detail: &Detail,
    mesh: &GroundMesh,
    config: &ScatterConfig,
    rng: &mut S,
    sink: Option<&mut dyn EventSink>,
) -> PlacementSet {
    if let Some(s) = sink {
        generate_placements_with_events(detail, mesh, config, rng, s)
    } else {
        generate_placements_with_events(detail, mesh, config, rng, &mut ())
    }
}

pub fn generate_placements_with_events<S: SampleSource + ?Sized>(
    detail: &Detail,
    mesh: &GroundMesh,
    config: &ScatterConfig,
    rng: &mut S,
    sink: &mut dyn EventSink,
) -> PlacementSet {
    if sink.wants(ScatterEventKind::PassStarted) {
        sink.send(ScatterEvent::PassStarted {
            detail_type: detail.detail_type.clone(),
            density: detail.density,
            triangle_count: mesh.triangle_count(),
        });
    }

    if detail.groups.is_empty() {
        warn!(
            "Detail '{}' has no groups; every sample will be dropped.",
            detail.detail_type
        );
        if sink.wants(ScatterEventKind::Warning) {
            sink.send(ScatterEvent::Warning {
                context: format!("detail:{}", detail.detail_type),
                message: "Detail has no groups".into(),
            });
        }
    }

    let mut out = PlacementSet::default();

    for (index, tri) in mesh.triangles().enumerate() {
        out.stats.triangles += 1;
        let area = tri.area();
        let count = sample_count(
            area,
            detail.density,
            config.density_scale,
            config.rounding,
            rng,
        );
        if sink.wants(ScatterEventKind::TriangleSampled) {
            sink.send(ScatterEvent::TriangleSampled {
                triangle: index,
                area,
                sample_count: count,
            });
        }
        if count == 0 {
            continue;
        }

        let slope = tri.slope_degrees();
        for _ in 0..count {
            out.stats.samples_evaluated += 1;
            let sample = tri.draw_sample(index, rng);

            let Some((group_index, group)) = select_group(detail, sample.alpha, rng) else {
                skip_draws(rng, DRAWS_PER_SAMPLE - 3);
                drop_sample(&mut out, sink, index, sample.position, DropReason::NoGroup);
                continue;
            };
            let Some((prop_index, prop)) = select_prop(group, rng) else {
                skip_draws(rng, DRAWS_PER_SAMPLE - 4);
                drop_sample(&mut out, sink, index, sample.position, DropReason::NoProp);
                continue;
            };

            let facing_angle = rng.next_sample() * TAU;
            let scale = match prop.random_scale() {
                Some(random_scale) => 1.0 + (rng.next_sample() - 0.5) * random_scale,
                None => {
                    rng.skip();
                    1.0
                }
            };

            if !prop.accepts_slope(slope) {
                out.stats.samples_rejected_by_slope += 1;
                if sink.wants(ScatterEventKind::SampleDropped) {
                    sink.send(ScatterEvent::SampleDropped {
                        triangle: index,
                        position: sample.position,
                        reason: DropReason::SlopeOutOfRange,
                    });
                }
                continue;
            }

            let placement = Placement {
                prop: PropRef::new(group_index, prop_index),
                position: sample.position,
                facing_angle,
                scale,
                normal: if prop.upright { Vec3::Y } else { sample.normal },
                alpha: sample.alpha,
            };

            let kind = prop.tag();
            if sink.wants(ScatterEventKind::PlacementMade) {
                sink.send(ScatterEvent::PlacementMade { placement, kind });
            }
            if kind == PropKindTag::Model {
                out.models.push(placement);
            } else {
                out.sprites.push(placement);
            }
        }
    }

    out.stats.sprite_placements = out.sprites.len();
    out.stats.model_placements = out.models.len();

    info!(
        "Detail '{}': {} triangles, {} samples, {} sprite and {} model placements.",
        detail.detail_type,
        out.stats.triangles,
        out.stats.samples_evaluated,
        out.stats.sprite_placements,
        out.stats.model_placements,
    );
    debug!(
        "Detail '{}': {} samples dropped, {} rejected by slope.",
        detail.detail_type, out.stats.samples_dropped, out.stats.samples_rejected_by_slope,
    );

    if sink.wants(ScatterEventKind::PassFinished) {
        sink.send(ScatterEvent::PassFinished { stats: out.stats });
    }

    out
}

#[inline]
fn skip_draws<S: SampleSource + ?Sized>(rng: &mut S, n: u64) {
    for _ in 0..n {
        rng.skip();
    }
}

fn drop_sample(
    out: &mut PlacementSet,
    sink: &mut dyn EventSink,
    triangle: usize,
    position: Vec3,
    reason: DropReason,
) {
    out.stats.samples_dropped += 1;
    if sink.wants(ScatterEventKind::SampleDropped) {
        sink.send(ScatterEvent::SampleDropped {
            triangle,
            position,
            reason,
        });
    }
}

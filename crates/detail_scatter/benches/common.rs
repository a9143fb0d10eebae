#![allow(dead_code)]

use std::time::Duration;

use criterion::{Criterion, Throughput};
use detail_scatter::prelude::*;
use glam::Vec2;

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(3);

pub const DENSITIES: [f32; 4] = [50_000.0, 200_000.0, 800_000.0, 3_200_000.0];

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

pub fn ground(extent: f32, subdivisions: u32) -> GroundMesh {
    GroundMesh::plane(Vec2::splat(extent), subdivisions)
}

/// Three sprite-like props with mixed billboarding plus a model, across two groups.
pub fn meadow(density: f32) -> Detail {
    let bound = |x: f32| SpriteBound::new(x, 0.0, 64.0, 64.0, 256.0);
    let size = PivotRect::new(0.5, 0.0, 12.0, 12.0);
    Detail::new("meadow", density)
        .with_group(
            DetailGroup::new("grass", 0.0)
                .with_prop(DetailProp::sprite(
                    "blade",
                    0.6,
                    SpriteProp::new(bound(0.0), size)
                        .with_orientation(Orientation::ZAxis)
                        .with_sway(0.15),
                ))
                .with_prop(DetailProp::shape(
                    "tuft",
                    1.0,
                    SpriteProp::new(bound(64.0), size).with_random_scale(0.4),
                    ShapeParams::tri(30.0, 0.25),
                )),
        )
        .with_group(
            DetailGroup::new("flowers", 1.0)
                .with_prop(DetailProp::sprite(
                    "daisy",
                    0.9,
                    SpriteProp::new(bound(128.0), size).with_orientation(Orientation::AllAxes),
                ))
                .with_prop(DetailProp::model("stone", 1.0, "models/stone.mdl")),
        )
}

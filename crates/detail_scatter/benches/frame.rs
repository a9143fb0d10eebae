mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use detail_scatter::prelude::*;
use glam::Vec3;

fn frame_update_benches(c: &mut Criterion) {
    let mesh = common::ground(256.0, 32);
    let material = DetailMaterial::new(256.0, 256.0);

    let mut group = c.benchmark_group("frame/update_frame");
    for &density in &common::DENSITIES {
        let detail = common::meadow(density);
        let mut surface = ScatterSurface::new(ScatterConfig::default());
        surface.regenerate(Some(&detail), Some(&mesh), Some(&material));
        let instances: usize = surface.batches().iter().map(|b| b.instance_count()).sum();
        group.throughput(common::elements_throughput(instances));

        let mut elapsed = 0.0f32;
        group.bench_function(BenchmarkId::from_parameter(density), |b| {
            b.iter(|| {
                elapsed += 1.0 / 60.0;
                let eye = Vec3::new(elapsed.cos() * 200.0, 40.0, elapsed.sin() * 200.0);
                let camera = CameraPose::look_at(eye, Vec3::ZERO);
                surface.update_frame(&camera, elapsed);
                black_box(surface.batches().len());
            });
        });
    }
    group.finish();
}

fn geometry_update_benches(c: &mut Criterion) {
    let mesh = common::ground(256.0, 32);
    let material = DetailMaterial::new(256.0, 256.0);
    let detail = common::meadow(800_000.0);
    let mut surface = ScatterSurface::new(ScatterConfig::default());
    surface.regenerate(Some(&detail), Some(&mesh), Some(&material));

    c.bench_function("frame/update_geometry_only", |b| {
        b.iter(|| {
            surface.update_geometry_only(black_box(&detail));
        });
    });
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = frame_update_benches, geometry_update_benches
}
criterion_main!(benches);

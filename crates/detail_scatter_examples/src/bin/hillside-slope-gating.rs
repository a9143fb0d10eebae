use anyhow::Result;
use detail_scatter::prelude::*;
use detail_scatter_examples::{
    heightfield, init_tracing, render_surface_to_png, Heightfield, PropStyle, PropStyles,
    RenderConfig,
};
use glam::{Vec2, Vec3};

/// Rolling hills; alpha rises with altitude so the upper slopes blend into scree.
struct Hills;

impl Heightfield for Hills {
    fn height(&self, x: f32, z: f32) -> f32 {
        18.0 * (x * 0.045).sin() * (z * 0.03).cos() + 6.0 * (x * 0.11 + z * 0.07).sin()
    }

    fn alpha(&self, x: f32, z: f32) -> f32 {
        ((self.height(x, z) + 24.0) / 48.0).clamp(0.0, 1.0)
    }
}

fn main() -> Result<()> {
    init_tracing();
    let extent = Vec2::splat(160.0);
    let mesh = heightfield(&Hills, extent, 40)?;
    let material = DetailMaterial::new(256.0, 256.0);
    let mut detail = hillside();

    let mut surface = ScatterSurface::try_new(ScatterConfig::new(7))?;
    let mut sink = VecSink::only(&[ScatterEventKind::SampleDropped]);
    let stats =
        surface.regenerate_with_events(Some(&detail), Some(&mesh), Some(&material), &mut sink);

    let (mut no_prop, mut slope) = (0usize, 0usize);
    for event in sink.as_slice() {
        if let ScatterEvent::SampleDropped { reason, .. } = event {
            match reason {
                DropReason::SlopeOutOfRange => slope += 1,
                _ => no_prop += 1,
            }
        }
    }
    println!(
        "{} samples: {} placed, {} without a prop, {} outside their slope range",
        stats.samples_evaluated,
        stats.placements(),
        no_prop,
        slope
    );

    let camera = CameraPose::look_at(Vec3::new(0.0, 120.0, 150.0), Vec3::ZERO);
    surface.update_frame(&camera, 0.0);

    // Move the grass onto a different atlas cell; instances stay where they are.
    let grass = detail.groups[0].props.get_mut(0).map(|p| &mut p.kind);
    if let Some(PropKind::Sprite(sprite)) = grass {
        sprite.bound = SpriteBound::new(128.0, 0.0, 128.0, 128.0, 0.0);
    }
    surface.update_geometry_only(&detail);

    let styles = PropStyles::default()
        .with("grass", PropStyle::new([110, 170, 70], 1))
        .with("fern", PropStyle::new([40, 110, 60], 2))
        .with("scree", PropStyle::new([150, 140, 130], 1))
        .with("boulder", PropStyle::new([90, 80, 75], 3));
    let rc = RenderConfig::new((800, 800), extent)
        .with_background([228, 222, 205])
        .with_wireframe([214, 206, 188]);
    render_surface_to_png(
        &surface,
        &detail,
        Some(&mesh),
        &rc,
        &styles,
        "hillside-slope-gating.png",
    )
}

fn hillside() -> Detail {
    let cell = |x: f32, y: f32| SpriteBound::new(x, y, 128.0, 128.0, 0.0);
    let small = PivotRect::new(0.5, 0.0, 3.0, 4.0);
    let large = PivotRect::new(0.5, 0.0, 5.0, 6.0);
    Detail::new("hillside", 30_000.0)
        .with_group(
            DetailGroup::new("meadow", 0.0)
                .with_prop(
                    DetailProp::sprite(
                        "grass",
                        0.8,
                        SpriteProp::new(cell(0.0, 0.0), small)
                            .with_orientation(Orientation::ZAxis)
                            .with_sway(0.1),
                    )
                    .with_angle_range(0.0, 25.0),
                )
                .with_prop(
                    DetailProp::shape(
                        "fern",
                        1.0,
                        SpriteProp::new(cell(0.0, 128.0), large).with_random_scale(0.4),
                        ShapeParams::tri(35.0, 0.15),
                    )
                    .with_upright(false)
                    .with_angle_range(10.0, 40.0),
                ),
        )
        .with_group(
            DetailGroup::new("scree", 0.8)
                .with_prop(
                    DetailProp::sprite(
                        "scree",
                        0.9,
                        SpriteProp::new(cell(128.0, 128.0), small).with_random_scale(0.6),
                    )
                    .with_upright(false),
                )
                .with_prop(
                    DetailProp::model("boulder", 1.0, "models/boulder.mdl")
                        .with_angle_range(20.0, 90.0),
                ),
        )
}

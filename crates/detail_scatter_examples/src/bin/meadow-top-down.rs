use anyhow::Result;
use detail_scatter::prelude::*;
use detail_scatter_examples::{
    init_tracing, render_surface_to_png, PropStyle, PropStyles, RenderConfig,
};
use glam::{Vec2, Vec3};

fn main() -> Result<()> {
    init_tracing();
    let extent = Vec2::splat(128.0);
    let mesh = GroundMesh::plane(extent, 4);
    let material = DetailMaterial::new(512.0, 512.0);

    let mut set = DetailSet::new(vec![meadow()]);
    set.set_active(Some(0));

    let config = ScatterConfig::new(0x00D3_7A11).with_sway_frequency(0.8);
    let mut surface = ScatterSurface::try_new(config)?;
    let stats = surface.regenerate(set.active(), Some(&mesh), Some(&material));
    println!(
        "{} samples over {} triangles: {} sprite and {} model placements ({} dropped)",
        stats.samples_evaluated,
        stats.triangles,
        stats.sprite_placements,
        stats.model_placements,
        stats.samples_dropped,
    );

    // Two seconds in, camera circling at a low angle.
    let camera = CameraPose::look_at(Vec3::new(90.0, 25.0, 60.0), Vec3::ZERO);
    surface.update_frame(&camera, 2.0);

    for batch in surface.batches() {
        println!(
            "batch {:?}: {} instances, {} vertices",
            batch.prop(),
            batch.instance_count(),
            batch.mesh().vertex_count()
        );
    }

    let styles = PropStyles::default()
        .with("blade", PropStyle::new([96, 160, 64], 1))
        .with("tuft", PropStyle::new([60, 120, 40], 2))
        .with("daisy", PropStyle::new([240, 240, 250], 2))
        .with("stone", PropStyle::new([120, 110, 100], 3));
    let rc = RenderConfig::new((768, 768), extent).with_wireframe([210, 204, 190]);
    let Some(detail) = set.active() else {
        return Ok(());
    };
    render_surface_to_png(&surface, detail, Some(&mesh), &rc, &styles, "meadow-top-down.png")
}

fn meadow() -> Detail {
    let atlas = |x: f32| SpriteBound::new(x, 0.0, 128.0, 128.0, 0.0);
    let size = PivotRect::new(0.5, 0.0, 6.0, 6.0);
    Detail::new("meadow", 40_000.0)
        .with_group(
            DetailGroup::new("grass", 0.0)
                .with_prop(DetailProp::sprite(
                    "blade",
                    0.7,
                    SpriteProp::new(atlas(0.0), size)
                        .with_orientation(Orientation::ZAxis)
                        .with_random_scale(0.3)
                        .with_sway(0.12),
                ))
                .with_prop(DetailProp::shape(
                    "tuft",
                    1.0,
                    SpriteProp::new(atlas(128.0), size).with_random_scale(0.5),
                    ShapeParams::tri(25.0, 0.2),
                )),
        )
        // Flat ground has alpha 1.0 everywhere, a quarter of the way to the flowers.
        .with_group(
            DetailGroup::new("flowers", 4.0)
                .with_prop(DetailProp::sprite(
                    "daisy",
                    0.85,
                    SpriteProp::new(atlas(256.0), size).with_orientation(Orientation::AllAxes),
                ))
                .with_prop(DetailProp::model("stone", 1.0, "models/stone.mdl")),
        )
}

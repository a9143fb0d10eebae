//! Top-down PNG rendering of a scattered surface.
use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use detail_scatter::prelude::*;
use glam::{Vec2, Vec3};
use image::{Rgb, RgbImage};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Installs a formatting subscriber; `RUST_LOG` overrides the default `info` level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Output image size and the world XZ rectangle it covers.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub image_size: (u32, u32),
    pub domain_min: Vec2,
    pub domain_max: Vec2,
    pub background: [u8; 3],
    pub wireframe: Option<[u8; 3]>,
}

impl RenderConfig {
    /// Image covering a domain of `domain_extent` centered at the origin.
    pub fn new(image_size: (u32, u32), domain_extent: Vec2) -> Self {
        Self {
            image_size,
            domain_min: -domain_extent * 0.5,
            domain_max: domain_extent * 0.5,
            background: [236, 232, 220],
            wireframe: None,
        }
    }

    pub fn with_background(mut self, rgb: [u8; 3]) -> Self {
        self.background = rgb;
        self
    }

    pub fn with_wireframe(mut self, rgb: [u8; 3]) -> Self {
        self.wireframe = Some(rgb);
        self
    }

    fn to_pixel(&self, world: Vec3) -> Vec2 {
        let size = Vec2::new(self.image_size.0 as f32, self.image_size.1 as f32);
        let span = self.domain_max - self.domain_min;
        (Vec2::new(world.x, world.z) - self.domain_min) / span * size
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PropStyle {
    pub color: [u8; 3],
    pub radius: u32,
}

impl PropStyle {
    pub fn new(color: [u8; 3], radius: u32) -> Self {
        Self { color, radius }
    }
}

/// Styles keyed by prop name, with a fallback for props without one.
#[derive(Debug, Clone)]
pub struct PropStyles {
    by_name: HashMap<String, PropStyle>,
    fallback: PropStyle,
}

impl Default for PropStyles {
    fn default() -> Self {
        Self {
            by_name: HashMap::new(),
            fallback: PropStyle::new([90, 90, 90], 2),
        }
    }
}

impl PropStyles {
    pub fn with(mut self, name: impl Into<String>, style: PropStyle) -> Self {
        self.by_name.insert(name.into(), style);
        self
    }

    fn get(&self, detail: &Detail, prop: PropRef) -> PropStyle {
        detail
            .prop(prop)
            .and_then(|p| self.by_name.get(&p.name))
            .copied()
            .unwrap_or(self.fallback)
    }
}

/// Renders batch instances as discs with a facing tick and model placements as squares.
pub fn render_surface_to_png(
    surface: &ScatterSurface,
    detail: &Detail,
    mesh: Option<&GroundMesh>,
    config: &RenderConfig,
    styles: &PropStyles,
    path: impl AsRef<Path>,
) -> Result<()> {
    let (w, h) = config.image_size;
    let mut img = RgbImage::from_pixel(w, h, Rgb(config.background));

    if let (Some(mesh), Some(rgb)) = (mesh, config.wireframe) {
        for tri in mesh.triangles() {
            let [a, b, c] = [tri.a, tri.b, tri.c].map(|p| config.to_pixel(p));
            draw_line(&mut img, a, b, rgb);
            draw_line(&mut img, b, c, rgb);
            draw_line(&mut img, c, a, rgb);
        }
    }

    let mut instances = 0usize;
    for batch in surface.batches() {
        let style = styles.get(detail, batch.prop());
        for m in batch.transforms() {
            let origin = m.w_axis.truncate();
            let facing = m.transform_vector3(Vec3::Z).normalize_or_zero();
            let center = config.to_pixel(origin);
            let tip = config.to_pixel(origin + facing * 2.0);
            fill_disc(&mut img, center, style.radius as f32, style.color);
            draw_line(&mut img, center, tip, darken(style.color));
            instances += 1;
        }
    }

    for placement in surface.model_placements() {
        let style = styles.get(detail, placement.prop);
        let center = config.to_pixel(placement.position);
        fill_square(&mut img, center, style.radius as f32, style.color);
    }

    let path = path.as_ref();
    img.save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(
        "Wrote {} ({} instances, {} models).",
        path.display(),
        instances,
        surface.model_placements().len()
    );
    Ok(())
}

fn darken(rgb: [u8; 3]) -> [u8; 3] {
    rgb.map(|c| c / 2)
}

fn put(img: &mut RgbImage, x: i64, y: i64, rgb: [u8; 3]) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, Rgb(rgb));
    }
}

fn fill_disc(img: &mut RgbImage, c: Vec2, r: f32, rgb: [u8; 3]) {
    let r = r.max(0.5);
    let (x0, x1) = ((c.x - r).floor() as i64, (c.x + r).ceil() as i64);
    let (y0, y1) = ((c.y - r).floor() as i64, (c.y + r).ceil() as i64);
    for y in y0..=y1 {
        for x in x0..=x1 {
            let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - c;
            if d.length_squared() <= r * r {
                put(img, x, y, rgb);
            }
        }
    }
}

fn fill_square(img: &mut RgbImage, c: Vec2, half: f32, rgb: [u8; 3]) {
    let (x0, x1) = ((c.x - half).floor() as i64, (c.x + half).ceil() as i64);
    let (y0, y1) = ((c.y - half).floor() as i64, (c.y + half).ceil() as i64);
    for y in y0..=y1 {
        for x in x0..=x1 {
            put(img, x, y, rgb);
        }
    }
}

fn draw_line(img: &mut RgbImage, a: Vec2, b: Vec2, rgb: [u8; 3]) {
    let steps = (b - a).abs().max_element().ceil().max(1.0) as usize;
    for i in 0..=steps {
        let p = a.lerp(b, i as f32 / steps as f32);
        put(img, p.x.floor() as i64, p.y.floor() as i64, rgb);
    }
}

#![forbid(unsafe_code)]

mod rendering;
mod terrain;

pub use rendering::{init_tracing, render_surface_to_png, PropStyle, PropStyles, RenderConfig};
pub use terrain::{heightfield, Heightfield};

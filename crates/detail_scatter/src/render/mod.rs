//! Render-side data for scattered detail.
//!
//! - [geometry]: procedural prop meshes (sprite quads, three-quad shapes, model stand-ins).
//! - [batch]: one instanced batch per prop, slots filled from placements.
//! - [frame]: per-frame billboarding, scale, and sway of instance transforms.
//! - [surface]: [`ScatterSurface`], which owns the stream and batches for one ground mesh.
pub mod batch;
pub mod frame;
pub mod geometry;
pub mod surface;

pub use batch::InstanceBatch;
pub use frame::CameraPose;
pub use geometry::PropMesh;
pub use surface::{DetailMaterial, ScatterSurface};

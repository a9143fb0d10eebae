#![forbid(unsafe_code)]
//! detail_scatter: deterministic ground-detail scattering over triangle meshes.
//!
//! Modules:
//! - detail: detail sets, groups, and props (sprite, shape, model)
//! - sampling: the seeded sample stream and area-proportional surface sampling
//! - scatter: group/prop selection and placement generation, events
//! - render: prop geometry, instance batches, per-frame transforms, the render surface
//!
//! For a runnable walkthrough, see the `detail_scatter_examples` crate.
pub mod detail;
pub mod error;
pub mod render;
pub mod sampling;
pub mod scatter;

/// Convenient re-exports for common types. Import with `use detail_scatter::prelude::*;`.
pub mod prelude {
    pub use crate::detail::{
        Detail, DetailGroup, DetailProp, DetailSet, ModelProp, Orientation, PivotRect, PropKind,
        PropKindTag, PropRef, ShapeParams, ShapeProp, ShapeVariant, SpriteBound, SpriteProp,
    };
    pub use crate::error::{Error, Result};
    pub use crate::render::{CameraPose, DetailMaterial, InstanceBatch, PropMesh, ScatterSurface};
    pub use crate::sampling::{
        sample_surface, GroundMesh, SampleRounding, SampleSource, SampleStream, SurfaceSample,
        Triangle,
    };
    pub use crate::scatter::events::{
        ClearReason, DropReason, EventSink, FnSink, ScatterEvent, ScatterEventKind, VecSink,
    };
    pub use crate::scatter::runner::{
        generate_placements, generate_placements_with_events, Placement, PlacementSet,
        ScatterConfig, ScatterStats,
    };
    pub use crate::scatter::selection::{select_group, select_prop};
    pub use crate::scatter::DRAWS_PER_SAMPLE;
}

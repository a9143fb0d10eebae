//! Event types and sinks for observing scattering passes and surface rebuilds.
//!
//! This module defines [`ScatterEvent`] and a set of sinks to emit, collect, or forward
//! events while running [`crate::scatter::runner::generate_placements_with_events`] or
//! [`crate::render::surface::ScatterSurface::regenerate_with_events`].
use glam::Vec3;

use crate::detail::{PropKindTag, PropRef};
use crate::scatter::runner::{Placement, ScatterStats};

/// Describes events emitted while scattering and building batches.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum ScatterEvent {
    /// Emitted when a scattering pass starts.
    PassStarted {
        /// Type name of the detail being scattered.
        detail_type: String,
        /// Detail density before scaling.
        density: f32,
        /// Number of ground triangles that will be visited.
        triangle_count: usize,
    },

    /// Emitted after a triangle's sample count was decided.
    TriangleSampled {
        /// Triangle index in the ground mesh.
        triangle: usize,
        /// Triangle area in square world units.
        area: f32,
        /// Samples that will be drawn on this triangle.
        sample_count: usize,
    },

    /// Emitted when a placement is made.
    PlacementMade {
        placement: Placement,
        /// Kind of the placed prop.
        kind: PropKindTag,
    },

    /// Emitted when a sample produced no placement.
    SampleDropped {
        triangle: usize,
        position: Vec3,
        reason: DropReason,
    },

    /// Emitted when a scattering pass finishes.
    PassFinished { stats: ScatterStats },

    /// Emitted for every instance batch created during a rebuild.
    BatchBuilt {
        prop: PropRef,
        /// Number of instance slots in the batch.
        instance_count: usize,
        /// Vertices in the synthesized prop mesh.
        vertex_count: usize,
    },

    /// Emitted when a rebuild leaves the surface empty instead of scattering.
    Cleared { reason: ClearReason },

    /// Non-fatal warning generated during scattering.
    Warning {
        /// Context string (e.g. detail type, prop reference).
        context: String,
        /// Human-readable message.
        message: String,
    },
}

impl ScatterEvent {
    pub fn kind(&self) -> ScatterEventKind {
        match self {
            ScatterEvent::PassStarted { .. } => ScatterEventKind::PassStarted,
            ScatterEvent::TriangleSampled { .. } => ScatterEventKind::TriangleSampled,
            ScatterEvent::PlacementMade { .. } => ScatterEventKind::PlacementMade,
            ScatterEvent::SampleDropped { .. } => ScatterEventKind::SampleDropped,
            ScatterEvent::PassFinished { .. } => ScatterEventKind::PassFinished,
            ScatterEvent::BatchBuilt { .. } => ScatterEventKind::BatchBuilt,
            ScatterEvent::Cleared { .. } => ScatterEventKind::Cleared,
            ScatterEvent::Warning { .. } => ScatterEventKind::Warning,
        }
    }
}

/// Discriminant of [`ScatterEvent`], used by sinks to opt out of expensive events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScatterEventKind {
    PassStarted,
    TriangleSampled,
    PlacementMade,
    SampleDropped,
    PassFinished,
    BatchBuilt,
    Cleared,
    Warning,
}

/// Why a surface sample did not become a placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The detail has no groups.
    NoGroup,
    /// No prop's cumulative amount exceeded the draw.
    NoProp,
    /// The surface slope lies outside the prop's angle range.
    SlopeOutOfRange,
}

/// Why a rebuild cleared the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearReason {
    NoDetail,
    NoMesh,
    NoMaterial,
}

/// A generic event sink that accepts [`ScatterEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: ScatterEvent);

    /// Whether events of `kind` should be built and sent at all.
    fn wants(&self, _kind: ScatterEventKind) -> bool {
        true
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: ScatterEvent) {}

    #[inline]
    fn wants(&self, _kind: ScatterEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(ScatterEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(ScatterEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(ScatterEvent),
{
    #[inline]
    fn send(&mut self, event: ScatterEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects events in a `Vec`, optionally restricted to some kinds.
#[derive(Default)]
pub struct VecSink {
    events: Vec<ScatterEvent>,
    only: Option<Vec<ScatterEventKind>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects only events of the listed kinds.
    pub fn only(kinds: &[ScatterEventKind]) -> Self {
        Self {
            events: Vec::new(),
            only: Some(kinds.to_vec()),
        }
    }

    pub fn into_inner(self) -> Vec<ScatterEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[ScatterEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: ScatterEvent) {
        if self.wants(event.kind()) {
            self.events.push(event);
        }
    }

    fn wants(&self, kind: ScatterEventKind) -> bool {
        self.only.as_ref().is_none_or(|kinds| kinds.contains(&kind))
    }
}

//! Instanced batches: one shared prop mesh plus one transform slot per placement.
use std::collections::BTreeMap;

use glam::Mat4;
use tracing::{debug, warn};

use crate::detail::{Detail, Orientation, PropRef};
use crate::render::geometry::{build_prop_mesh, PropMesh};
use crate::scatter::events::{EventSink, ScatterEvent, ScatterEventKind};
use crate::scatter::runner::Placement;

/// All instances of one sprite or shape prop.
#[derive(Debug, Clone)]
pub struct InstanceBatch {
    prop: PropRef,
    orientation: Orientation,
    sway: f32,
    mesh: PropMesh,
    placements: Vec<Placement>,
    transforms: Vec<Mat4>,
}

impl InstanceBatch {
    pub fn prop(&self) -> PropRef {
        self.prop
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn sway(&self) -> f32 {
        self.sway
    }

    pub fn mesh(&self) -> &PropMesh {
        &self.mesh
    }

    pub fn mesh_mut(&mut self) -> &mut PropMesh {
        &mut self.mesh
    }

    /// Placement occupying each slot, in slot order.
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Current world transform of each slot.
    pub fn transforms(&self) -> &[Mat4] {
        &self.transforms
    }

    pub fn instance_count(&self) -> usize {
        self.placements.len()
    }

    pub(crate) fn slots_mut(&mut self) -> impl Iterator<Item = (usize, &Placement, &mut Mat4)> {
        self.placements
            .iter()
            .zip(self.transforms.iter_mut())
            .enumerate()
            .map(|(slot, (placement, transform))| (slot, placement, transform))
    }
}

/// Groups sprite-like placements by prop and builds one batch per prop.
///
/// Batches come out in prop traversal order and slots keep the order in which
/// placements were generated. Props without placements get no batch.
pub fn build_batches(
    detail: &Detail,
    placements: &[Placement],
    fallback_width: f32,
    sink: &mut dyn EventSink,
) -> Vec<InstanceBatch> {
    let mut counts: BTreeMap<PropRef, usize> = BTreeMap::new();
    for p in placements {
        *counts.entry(p.prop).or_default() += 1;
    }

    let mut batches: BTreeMap<PropRef, InstanceBatch> = BTreeMap::new();
    for (&prop_ref, &count) in &counts {
        let Some(prop) = detail.prop(prop_ref) else {
            warn!(
                "Detail '{}' has no prop at {:?}; skipping {} placements.",
                detail.detail_type, prop_ref, count
            );
            continue;
        };
        let Some(sprite) = prop.sprite_params() else {
            warn!(
                "Prop '{}' is a model; skipping {} sprite placements.",
                prop.name, count
            );
            continue;
        };

        // Placeholder parameters are unused for sprite-like props.
        let mesh = build_prop_mesh(prop, fallback_width, 0.0, 0);
        batches.insert(
            prop_ref,
            InstanceBatch {
                prop: prop_ref,
                orientation: sprite.orientation,
                sway: sprite.sway,
                mesh,
                placements: Vec::with_capacity(count),
                transforms: Vec::with_capacity(count),
            },
        );
    }

    for p in placements {
        if let Some(batch) = batches.get_mut(&p.prop) {
            batch.placements.push(*p);
            batch.transforms.push(p.initial_transform());
        }
    }

    let batches: Vec<InstanceBatch> = batches.into_values().collect();
    for batch in &batches {
        debug!(
            "Built batch {:?}: {} instances, {} vertices.",
            batch.prop,
            batch.instance_count(),
            batch.mesh.vertex_count()
        );
        if sink.wants(ScatterEventKind::BatchBuilt) {
            sink.send(ScatterEvent::BatchBuilt {
                prop: batch.prop,
                instance_count: batch.instance_count(),
                vertex_count: batch.mesh.vertex_count(),
            });
        }
    }
    batches
}
